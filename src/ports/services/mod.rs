mod cloud_storage_service;

pub use cloud_storage_service::{BlobStream, BucketStream, CloudStorageService};
