//! App-shell configuration

use crate::error::{Result, ShellError};
use url::Url;

/// Static assets precached on install
pub const DEFAULT_APP_SHELL: &[&str] = &[
    "./",
    "./index.html",
    "./style.css",
    "./app.js",
    "./manifest.json",
    "./icons/icon-192.png",
    "./icons/icon-512.png",
];

/// Cache identity and manifest
///
/// Bumping `cache_name` makes the next activation drop every older cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub cache_name: String,
    pub version: String,
    /// Scope the app is served from, e.g. `https://player.example/app/`
    pub origin: Url,
    pub app_shell: Vec<String>,
}

impl ShellConfig {
    /// Default cache identity and manifest served from `origin`
    pub fn new(origin: Url) -> Self {
        Self {
            cache_name: "cadence-shell-v2".to_string(),
            version: "2.0.0".to_string(),
            origin,
            app_shell: DEFAULT_APP_SHELL.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// Parse the origin, then as [`ShellConfig::new`]
    pub fn for_origin(origin: &str) -> Result<Self> {
        let url = Url::parse(origin).map_err(|err| ShellError::invalid_url(origin, err))?;
        Ok(Self::new(url))
    }

    #[must_use]
    pub fn with_cache_name(
        mut self,
        cache_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.cache_name = cache_name.into();
        self.version = version.into();
        self
    }

    /// Manifest entries resolved against the origin
    pub fn app_shell_urls(&self) -> Result<Vec<Url>> {
        self.app_shell
            .iter()
            .map(|path| {
                self.origin
                    .join(path)
                    .map_err(|err| ShellError::invalid_url(path.as_str(), err))
            })
            .collect()
    }
}
