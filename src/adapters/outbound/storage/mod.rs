// Infrastructure error types
pub mod error;

// Provider-specific implementations
pub mod gcs;
pub mod memory;

// Re-export key types
pub use error::StoreError;
pub use gcs::{GcsAuthenticator, GcsConfig, GcsStorageBackend};
pub use memory::InMemoryStorageBackend;
