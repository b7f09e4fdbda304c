use async_trait::async_trait;
use std::sync::Arc;

use crate::{domain::errors::StorageResult, ports::storage::StorageBackend};

/// Port for exchanging configuration for an authenticated backend session
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Load credentials and open a session
    ///
    /// Called at most once per successful session; failures surface as
    /// `StorageError::Authentication`.
    async fn authenticate(&self) -> StorageResult<Arc<dyn StorageBackend>>;
}

/// Authenticator handing out an already constructed backend
///
/// Used for in-process stores and for tests that inject a backend directly.
pub struct StaticAuthenticator {
    backend: Arc<dyn StorageBackend>,
}

impl StaticAuthenticator {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self) -> StorageResult<Arc<dyn StorageBackend>> {
        Ok(self.backend.clone())
    }
}
