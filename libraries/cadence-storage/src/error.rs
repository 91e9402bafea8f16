/// Storage-specific errors
use cadence_core::CadenceError;
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend rejected a read or write (quota, permissions, ...)
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Imported document could not be parsed
    #[error("Malformed playlist document: {0}")]
    MalformedImport(String),

    /// Serialization/deserialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<StorageError> for CadenceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MalformedImport(msg) => CadenceError::MalformedImport(msg),
            StorageError::NotFound { entity, id } if entity == "playlist" => {
                CadenceError::PlaylistNotFound(id)
            }
            other => CadenceError::storage(other.to_string()),
        }
    }
}
