use crate::domain::{
    errors::ValidationError,
    value_objects::{BucketName, ObjectKey},
};

/// Identifies an object: the bucket holding it plus its key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobId {
    pub bucket: BucketName,
    pub key: ObjectKey,
}

impl BlobId {
    pub fn new(bucket: BucketName, key: ObjectKey) -> Self {
        Self { bucket, key }
    }

    /// Build the id of `file` inside an optional `folder` of `bucket`
    pub fn compose(
        bucket: &BucketName,
        folder: Option<&str>,
        file: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(bucket.clone(), ObjectKey::compose(folder, file)?))
    }
}

impl std::fmt::Display for BlobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}
