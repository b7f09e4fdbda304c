use std::path::PathBuf;

use crate::domain::value_objects::{BucketName, ObjectKey};

/// Errors that can occur during storage operations
///
/// Absence of a bucket or object is normally reported as an empty result by the
/// accessor layer. The `*NotFound` variants only surface from operations that
/// cannot express absence, such as creating a folder in a missing bucket or
/// opening a read channel on a deleted object.
#[derive(Debug, Clone)]
pub enum StorageError {
    /// Bucket not found
    BucketNotFound { bucket: BucketName },

    /// Object not found
    ObjectNotFound { bucket: BucketName, key: ObjectKey },

    /// Bucket already exists (raised by the backend, the service create is idempotent)
    BucketAlreadyExists { bucket: BucketName },

    /// Bucket still holds objects and cannot be deleted
    BucketNotEmpty { bucket: BucketName },

    /// Download destination is not an existing directory
    InvalidDestination { path: PathBuf, reason: String },

    /// Credential could not be loaded or exchanged for a session
    Authentication { message: String },

    /// The remote service rejected or failed a live call
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Local filesystem failure
    Io {
        path: Option<PathBuf>,
        message: String,
    },

    /// Validation error
    ValidationError { message: String },

    /// Generic storage error
    InternalError { message: String },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::BucketNotFound { bucket } => {
                write!(f, "Bucket not found: {}", bucket)
            }
            StorageError::ObjectNotFound { bucket, key } => {
                write!(f, "Object not found: {}/{}", bucket, key)
            }
            StorageError::BucketAlreadyExists { bucket } => {
                write!(f, "Bucket already exists: {}", bucket)
            }
            StorageError::BucketNotEmpty { bucket } => {
                write!(f, "Bucket is not empty: {}", bucket)
            }
            StorageError::InvalidDestination { path, reason } => {
                write!(
                    f,
                    "Invalid download destination '{}': {}",
                    path.display(),
                    reason
                )
            }
            StorageError::Authentication { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            StorageError::Transport {
                status: Some(status),
                message,
            } => {
                write!(f, "Remote storage error ({}): {}", status, message)
            }
            StorageError::Transport {
                status: None,
                message,
            } => {
                write!(f, "Remote storage error: {}", message)
            }
            StorageError::Io {
                path: Some(path),
                message,
            } => {
                write!(f, "IO error on '{}': {}", path.display(), message)
            }
            StorageError::Io {
                path: None,
                message,
            } => {
                write!(f, "IO error: {}", message)
            }
            StorageError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            StorageError::InternalError { message } => {
                write!(f, "Internal storage error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<crate::domain::errors::ValidationError> for StorageError {
    fn from(err: crate::domain::errors::ValidationError) -> Self {
        StorageError::ValidationError {
            message: err.to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
