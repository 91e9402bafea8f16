//! Requests, responses and routing

use crate::error::{Result, ShellError};
use url::Url;

/// Paths treated as shell assets regardless of extension
const STATIC_PATHS: &[&str] = &["/", "/index.html", "/manifest.json"];

/// Extensions of shell assets
const STATIC_EXTENSIONS: &[&str] = &[
    ".html", ".css", ".js", ".png", ".jpg", ".jpeg", ".svg", ".ico", ".json",
];

/// What the requester will do with the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// Top-level navigation
    Document,
    Script,
    Style,
    Image,
    Audio,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: Url,
    pub method: String,
    pub destination: Destination,
}

impl Request {
    pub fn new(method: impl Into<String>, url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|err| ShellError::invalid_url(url, err))?;
        Ok(Self {
            url: parsed,
            method: method.into(),
            destination: Destination::Other,
        })
    }

    pub fn get(url: &str) -> Result<Self> {
        Self::new("GET", url)
    }

    /// Navigation request for a page
    pub fn document(url: &str) -> Result<Self> {
        Ok(Self::get(url)?.with_destination(Destination::Document))
    }

    #[must_use]
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Key the response is cached under
    pub fn cache_key(&self) -> &str {
        self.url.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: String::new(),
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// 200 response
    pub fn ok(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, content_type, body).with_status_text("OK")
    }

    #[must_use]
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    /// 2xx status
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// How a request is served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Shell asset: cache, then network
    CacheFirst,
    /// Anything else: network, then cache
    NetworkFirst,
    /// Not intercepted at all
    Bypass,
}

/// Pick the strategy for a request
///
/// Object URLs (`blob:`), `data:` URLs, non-GET requests and other origins
/// always bypass the shell.
pub fn classify(request: &Request, origin: &Url) -> Route {
    let scheme = request.url.scheme();
    if scheme == "blob" || scheme == "data" {
        return Route::Bypass;
    }
    if !request.method.eq_ignore_ascii_case("GET") {
        return Route::Bypass;
    }
    if request.url.origin() != origin.origin() {
        return Route::Bypass;
    }

    if is_static_path(request.url.path()) {
        Route::CacheFirst
    } else {
        Route::NetworkFirst
    }
}

fn is_static_path(path: &str) -> bool {
    STATIC_PATHS.contains(&path) || STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Network access used by the shell
pub trait Fetcher {
    /// Perform the request; `Err` only when no response arrived at all
    fn fetch(&mut self, request: &Request) -> Result<Response>;
}
