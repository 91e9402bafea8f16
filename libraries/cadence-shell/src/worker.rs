//! App-shell worker: lifecycle, fetch strategies and offline fallbacks

use crate::cache::{CacheStorage, ResponseCache};
use crate::config::ShellConfig;
use crate::error::{Result, ShellError};
use crate::message::{CacheStatus, ShellMessage, ShellReply};
use crate::request::{classify, Destination, Fetcher, Request, Response, Route};
use tracing::{debug, error, info, warn};

/// Page served to navigations when neither network nor cache can answer
pub const OFFLINE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Offline - Cadence</title>
    <style>
        body { font-family: sans-serif; text-align: center; padding: 50px; }
        .offline-message { color: #666; margin-top: 20px; }
    </style>
</head>
<body>
    <h1>You are offline</h1>
    <p class="offline-message">Check your internet connection.</p>
</body>
</html>
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, manifest not cached yet
    Installing,
    /// Manifest cached, waiting to take over
    Installed,
    /// Serving fetches
    Active,
}

/// Offline cache for the player's static shell
#[derive(Debug)]
pub struct ShellWorker {
    config: ShellConfig,
    storage: CacheStorage,
    state: LifecycleState,
}

impl ShellWorker {
    pub fn new(config: ShellConfig) -> Self {
        Self::with_storage(config, CacheStorage::new())
    }

    /// Worker sharing caches left behind by an earlier version
    pub fn with_storage(config: ShellConfig, storage: CacheStorage) -> Self {
        Self {
            config,
            storage,
            state: LifecycleState::Installing,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Hand the caches over, e.g. to the next worker version
    pub fn into_storage(self) -> CacheStorage {
        self.storage
    }

    /// Precache every manifest entry
    ///
    /// All or nothing: when any entry fails, nothing is written and the
    /// worker stays in `Installing`.
    pub fn install(&mut self, fetcher: &mut dyn Fetcher) -> Result<()> {
        info!(version = %self.config.version, "Installing app shell");

        let mut staged = self
            .storage
            .get(&self.config.cache_name)
            .cloned()
            .unwrap_or_default();
        for url in self.config.app_shell_urls()? {
            let request = Request {
                url,
                method: "GET".to_string(),
                destination: Destination::Other,
            };
            let response = fetcher.fetch(&request).map_err(|err| {
                error!(url = %request.url, "Install failed: {}", err);
                ShellError::Install(format!("{}: {}", request.url, err))
            })?;
            if !response.is_ok() {
                error!(url = %request.url, status = response.status, "Install failed");
                return Err(ShellError::Install(format!(
                    "{} returned {}",
                    request.url, response.status
                )));
            }
            staged.put(request.cache_key(), response);
        }

        self.storage.insert(self.config.cache_name.clone(), staged);
        self.state = LifecycleState::Installed;
        info!(
            cache = %self.config.cache_name,
            items = self.config.app_shell.len(),
            "App shell cached"
        );
        Ok(())
    }

    /// Take over and drop every cache of other versions
    ///
    /// Returns the names of the removed caches.
    pub fn activate(&mut self) -> Vec<String> {
        if self.state == LifecycleState::Installing {
            warn!("Activate called before install completed");
        }
        info!(version = %self.config.version, "Activating app shell");

        let stale: Vec<String> = self
            .storage
            .names()
            .into_iter()
            .filter(|name| *name != self.config.cache_name)
            .collect();
        for name in &stale {
            info!(cache = %name, "Removing old cache");
            self.storage.delete(name);
        }

        self.state = LifecycleState::Active;
        stale
    }

    /// Answer a request, or `None` when it is not intercepted
    ///
    /// Only an active worker intercepts.
    pub fn handle_fetch(
        &mut self,
        request: &Request,
        fetcher: &mut dyn Fetcher,
    ) -> Option<Response> {
        if self.state != LifecycleState::Active {
            return None;
        }

        let served = match classify(request, &self.config.origin) {
            Route::Bypass => return None,
            Route::CacheFirst => self.cache_first(request, fetcher),
            Route::NetworkFirst => self.network_first(request, fetcher),
        };

        Some(served.unwrap_or_else(|err| {
            error!(url = %request.url, "Fetch failed: {}", err);
            fallback_response(request)
        }))
    }

    pub fn handle_message(&mut self, message: ShellMessage) -> ShellReply {
        match message {
            ShellMessage::SkipWaiting => {
                if self.state == LifecycleState::Installed {
                    self.activate();
                }
                ShellReply::Ack
            }
            ShellMessage::GetVersion => ShellReply::Version {
                version: self.config.version.clone(),
            },
            ShellMessage::CacheStatus => ShellReply::Status(self.cache_status()),
        }
    }

    pub fn cache_status(&self) -> CacheStatus {
        CacheStatus {
            cache_name: self.config.cache_name.clone(),
            version: self.config.version.clone(),
            cached_items: self
                .storage
                .get(&self.config.cache_name)
                .map_or(0, ResponseCache::len),
            app_shell_items: self.config.app_shell.len(),
        }
    }

    fn cache_first(&mut self, request: &Request, fetcher: &mut dyn Fetcher) -> Result<Response> {
        if let Some(cached) = self.cached(request) {
            debug!(url = %request.url, "Cache hit");
            return Ok(cached);
        }

        debug!(url = %request.url, "Cache miss, fetching");
        let response = fetcher.fetch(request)?;
        self.store_if_ok(request, &response);
        Ok(response)
    }

    fn network_first(&mut self, request: &Request, fetcher: &mut dyn Fetcher) -> Result<Response> {
        match fetcher.fetch(request) {
            Ok(response) => {
                self.store_if_ok(request, &response);
                Ok(response)
            }
            Err(err) => {
                debug!(url = %request.url, "Network failed, checking cache");
                self.cached(request).ok_or(err)
            }
        }
    }

    fn cached(&self, request: &Request) -> Option<Response> {
        self.storage
            .get(&self.config.cache_name)
            .and_then(|cache| cache.get(request.cache_key()))
            .cloned()
    }

    fn store_if_ok(&mut self, request: &Request, response: &Response) {
        if response.is_ok() {
            self.storage
                .open(&self.config.cache_name)
                .put(request.cache_key(), response.clone());
        }
    }
}

fn fallback_response(request: &Request) -> Response {
    if request.destination == Destination::Document {
        Response::ok("text/html; charset=utf-8", OFFLINE_HTML)
    } else {
        Response::new(503, "text/plain; charset=utf-8", "Resource unavailable")
            .with_status_text("Service Unavailable")
    }
}
