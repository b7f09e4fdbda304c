//! Google Cloud Storage backend over the JSON API
//!
//! Sessions are opened by [`GcsAuthenticator`]. Bearer tokens come from the
//! `object_store` GCP credential provider built from the service-account key.

pub mod auth;
pub mod client;
mod dto;

pub use auth::GcsAuthenticator;
pub use client::GcsStorageBackend;

use std::path::PathBuf;

/// Public Google Cloud Storage endpoint
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Connection parameters for a Google Cloud Storage session
#[derive(Debug, Clone)]
pub struct GcsConfig {
    pub project_id: String,
    /// Service-account key file; may be omitted only for an emulator endpoint
    pub credential_path: Option<PathBuf>,
    /// Base URL overriding [`DEFAULT_ENDPOINT`], e.g. a local fake-gcs-server
    pub endpoint: Option<String>,
}

impl GcsConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            credential_path: None,
            endpoint: None,
        }
    }

    pub fn with_credential_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_path = Some(path.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Base URL without a trailing slash
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/')
    }
}
