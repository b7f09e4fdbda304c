use chrono::{DateTime, Utc};

use crate::domain::value_objects::{BlobId, BucketName, ObjectKey};

/// Remote metadata of an existing object
///
/// Content is not carried here; it is streamed through the backend's read
/// channel when the blob is downloaded or read.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub size: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub generation: Option<String>,
    pub updated: Option<DateTime<Utc>>,
}

impl Blob {
    pub fn id(&self) -> BlobId {
        BlobId::new(self.bucket.clone(), self.key.clone())
    }

    /// Full key of the object
    pub fn name(&self) -> &str {
        self.key.as_str()
    }

    pub fn is_folder(&self) -> bool {
        self.key.is_folder()
    }
}
