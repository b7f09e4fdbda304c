pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use services::{BlobStream, BucketStream, CloudStorageService};
pub use storage::{Authenticator, ByteStream, StaticAuthenticator, StorageBackend};
