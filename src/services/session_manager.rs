use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::{
    domain::errors::StorageResult,
    ports::storage::{Authenticator, StorageBackend},
};

/// Lazily established, process-shared storage session
///
/// The first caller authenticates; concurrent callers wait for that attempt
/// and then share its session. A failed attempt is not remembered, so the
/// next call tries again.
pub struct SessionManager {
    authenticator: Arc<dyn Authenticator>,
    session: OnceCell<Arc<dyn StorageBackend>>,
}

impl SessionManager {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            authenticator,
            session: OnceCell::new(),
        }
    }

    /// The shared session, authenticating on first use
    pub async fn session(&self) -> StorageResult<Arc<dyn StorageBackend>> {
        let session = self
            .session
            .get_or_try_init(|| async {
                debug!("establishing storage session");
                self.authenticator.authenticate().await.inspect_err(|e| {
                    warn!(error = %e, "storage session could not be established");
                })
            })
            .await?;

        Ok(session.clone())
    }

    pub fn is_established(&self) -> bool {
        self.session.initialized()
    }
}
