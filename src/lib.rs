pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - value objects, models and errors
pub use domain::{
    // Models
    Blob,
    // Value objects
    BlobId,
    Bucket,
    BucketName,
    ContentSource,
    DomainValidationError,
    FILE_SEPARATOR,
    Lookup,
    ObjectKey,
    Page,
    // Errors
    StorageError,
    StorageResult,
};

// Port types - interfaces for external systems
pub use ports::{
    // Storage ports
    Authenticator,
    BlobStream,
    BucketStream,
    ByteStream,
    // Service ports
    CloudStorageService,
    StaticAuthenticator,
    StorageBackend,
};

// Service implementations
pub use services::{CloudStorageServiceImpl, DEFAULT_PAGE_SIZE, SessionManager};

// Application factory and configuration
pub use app::{
    AppBuilder, AppConfig, AppError, BackendKind, ConfigProvider, create_app_from_config,
    create_app_from_env, create_in_memory_app,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{
    GcsAuthenticator, GcsConfig, GcsStorageBackend, InMemoryStorageBackend,
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        AppBuilder, Blob, BucketName, CloudStorageService, CloudStorageServiceImpl,
        ContentSource, Lookup, ObjectKey, StorageError, StorageResult, create_app_from_config,
        create_in_memory_app,
    };
}
