//! Cadence CLI
//!
//! Headless host for the player core: configuration, persistence wiring and
//! a media element that needs no audio device.

pub mod config;
pub mod error;
pub mod format;
pub mod media;
pub mod session;

pub use config::CadenceConfig;
pub use error::{CliError, Result};
pub use media::HeadlessMedia;
pub use session::Session;
