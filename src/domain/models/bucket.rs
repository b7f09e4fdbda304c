use chrono::{DateTime, Utc};

use crate::domain::value_objects::BucketName;

/// Snapshot of a bucket's remote state, fetched per call and never cached
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub name: BucketName,
    pub location: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl Bucket {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}
