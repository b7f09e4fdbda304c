use async_trait::async_trait;
use object_store::{
    CredentialProvider, RetryConfig,
    gcp::{GcpCredentialProvider, GoogleCloudStorageBuilder},
};
use reqwest::Client;
use std::{path::Path, sync::Arc};
use tracing::info;

use super::{GcsConfig, client::GcsStorageBackend};
use crate::{
    adapters::outbound::storage::error::StoreError,
    domain::errors::{StorageError, StorageResult},
    ports::storage::{Authenticator, StorageBackend},
};

/// Failed calls are reported, never repeated
fn no_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 0,
        ..Default::default()
    }
}

/// Credential provider for a service-account key file
///
/// The provider signs its own bearer tokens and renews them before they
/// expire, so a long-lived session keeps working.
fn service_account_credentials(
    config: &GcsConfig,
    key_path: &Path,
) -> Result<GcpCredentialProvider, StoreError> {
    // Credentials are project-wide; the builder only insists on some bucket
    let store = GoogleCloudStorageBuilder::new()
        .with_service_account_path(key_path.to_string_lossy())
        .with_bucket_name(&config.project_id)
        .with_retry(no_retry())
        .build()?;

    Ok(Arc::clone(store.credentials()))
}

/// Opens Google Cloud Storage sessions from a [`GcsConfig`]
pub struct GcsAuthenticator {
    config: GcsConfig,
}

impl GcsAuthenticator {
    pub fn new(config: GcsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Authenticator for GcsAuthenticator {
    async fn authenticate(&self) -> StorageResult<Arc<dyn StorageBackend>> {
        let http = Client::builder()
            .build()
            .map_err(|e| StoreError::from(e).into_authentication())?;

        let credentials = match (&self.config.credential_path, &self.config.endpoint) {
            (Some(path), _) => {
                let provider = service_account_credentials(&self.config, path)
                    .map_err(StoreError::into_authentication)?;
                // An unusable key fails the session, not the first call
                provider
                    .get_credential()
                    .await
                    .map_err(|e| StoreError::from(e).into_authentication())?;
                Some(provider)
            }
            // Emulators accept unauthenticated requests
            (None, Some(_)) => None,
            (None, None) => {
                return Err(StorageError::Authentication {
                    message: "A service-account key is required for Google Cloud Storage"
                        .to_string(),
                });
            }
        };

        info!(
            project = %self.config.project_id,
            endpoint = %self.config.endpoint(),
            authenticated = credentials.is_some(),
            "opened storage session"
        );

        Ok(Arc::new(GcsStorageBackend::new(
            http,
            &self.config,
            credentials,
        )))
    }
}
