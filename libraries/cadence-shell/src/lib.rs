//! Cadence Shell
//!
//! Offline caching for the web player's static app shell. Shell assets are
//! served cache-first, everything else network-first with a cache fallback.
//! Object URLs and `data:` URLs created for local audio are never touched.
//!
//! # Example
//!
//! ```rust
//! use cadence_shell::{Fetcher, Request, Response, ShellConfig, ShellError, ShellWorker};
//!
//! struct Offline;
//!
//! impl Fetcher for Offline {
//!     fn fetch(&mut self, _request: &Request) -> Result<Response, ShellError> {
//!         Err(ShellError::network("offline"))
//!     }
//! }
//!
//! let config = ShellConfig::for_origin("https://player.example/").unwrap();
//! let mut worker = ShellWorker::new(config);
//! assert!(worker.install(&mut Offline).is_err());
//! ```

#![forbid(unsafe_code)]

mod cache;
mod config;
mod error;
mod message;
mod request;
mod worker;

pub use cache::{CacheStorage, ResponseCache};
pub use config::{ShellConfig, DEFAULT_APP_SHELL};
pub use error::{Result, ShellError};
pub use message::{CacheStatus, ShellMessage, ShellReply};
pub use request::{classify, Destination, Fetcher, Request, Response, Route};
pub use worker::{LifecycleState, ShellWorker, OFFLINE_HTML};
