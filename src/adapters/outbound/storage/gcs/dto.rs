use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    adapters::outbound::storage::error::StoreError,
    domain::{
        models::{Blob, Bucket},
        value_objects::{BucketName, ObjectKey},
    },
};

/// Bucket resource of the JSON API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketResource {
    pub name: String,
    pub location: Option<String>,
    pub time_created: Option<DateTime<Utc>>,
}

impl BucketResource {
    pub fn into_bucket(self) -> Result<Bucket, StoreError> {
        let name = BucketName::new(self.name)
            .map_err(|e| StoreError::InvalidResponse(format!("Invalid bucket name: {}", e)))?;

        Ok(Bucket {
            name,
            location: self.location,
            created: self.time_created,
        })
    }
}

/// Object resource of the JSON API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectResource {
    pub name: String,
    pub bucket: String,
    /// Decimal string, as the API encodes 64-bit integers
    pub size: Option<String>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub generation: Option<String>,
    pub updated: Option<DateTime<Utc>>,
}

impl ObjectResource {
    pub fn into_blob(self) -> Result<Blob, StoreError> {
        let bucket = BucketName::new(self.bucket)
            .map_err(|e| StoreError::InvalidResponse(format!("Invalid bucket name: {}", e)))?;
        let key = ObjectKey::new(self.name)
            .map_err(|e| StoreError::InvalidResponse(format!("Invalid object name: {}", e)))?;
        let size = match self.size.as_deref() {
            Some(size) => size
                .parse::<u64>()
                .map_err(|e| StoreError::InvalidResponse(format!("Invalid object size: {}", e)))?,
            None => 0,
        };

        Ok(Blob {
            bucket,
            key,
            size,
            content_type: self.content_type,
            etag: self.etag,
            generation: self.generation,
            updated: self.updated,
        })
    }
}

/// One page of a `list` call
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Request body of `buckets.insert`
#[derive(Debug, serde::Serialize)]
pub struct InsertBucketRequest<'a> {
    pub name: &'a str,
}
