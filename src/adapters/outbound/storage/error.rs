use crate::domain::errors::StorageError;
use std::io;
use thiserror::Error as ThisError;

/// Infrastructure errors raised inside the storage adapters
#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Convert an error raised while opening a session
    pub fn into_authentication(self) -> StorageError {
        StorageError::Authentication {
            message: self.to_string(),
        }
    }
}

/// Convert infrastructure StoreError to domain StorageError
impl From<StoreError> for StorageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ObjectStore(object_err) => object_err.into(),
            StoreError::Http(http_err) => StorageError::Transport {
                status: http_err.status().map(|s| s.as_u16()),
                message: http_err.to_string(),
            },
            StoreError::Io(io_err) => io_err.into(),
            StoreError::Status { status, message } => StorageError::Transport {
                status: Some(status),
                message,
            },
            StoreError::Serialization(serde_err) => StorageError::Transport {
                status: None,
                message: format!("Malformed response: {}", serde_err),
            },
            StoreError::InvalidResponse(message) => StorageError::Transport {
                status: None,
                message,
            },
        }
    }
}

/// Convert object_store errors to domain storage errors
///
/// Not-found conditions are answered by the adapters themselves, where the
/// bucket is known; anything reaching this conversion is a live-call failure.
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotSupported { .. } => StorageError::InternalError {
                message: err.to_string(),
            },
            _ => StorageError::Transport {
                status: None,
                message: format!("Object store operation failed: {}", err),
            },
        }
    }
}

/// Convert standard io::Error to domain errors
impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io {
            path: None,
            message: err.to_string(),
        }
    }
}
