//! Control messages from the page

use serde::{Deserialize, Serialize};

/// Message posted by a client page
///
/// Wire form: `{"action": "SKIP_WAITING"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShellMessage {
    SkipWaiting,
    GetVersion,
    CacheStatus,
}

/// Snapshot of the current cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub cache_name: String,
    pub version: String,
    pub cached_items: usize,
    pub app_shell_items: usize,
}

/// Reply to a [`ShellMessage`]
///
/// Untagged, so variants are matched in declaration order: `Status` must
/// come before `Version`, whose single field it also carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShellReply {
    Status(CacheStatus),
    /// Sent back for `GetVersion`
    Version { version: String },
    /// `SkipWaiting` has no payload
    Ack,
}
