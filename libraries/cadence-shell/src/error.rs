/// App-shell errors
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// The network request could not be completed
    #[error("Network error: {0}")]
    Network(String),

    /// A request or manifest URL could not be parsed
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Precaching the app shell failed
    #[error("Install failed: {0}")]
    Install(String),
}

impl ShellError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
