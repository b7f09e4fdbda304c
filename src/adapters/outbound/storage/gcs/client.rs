use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use object_store::{CredentialProvider, gcp::GcpCredentialProvider};
use reqwest::{
    Body, Client, RequestBuilder, Response, StatusCode,
    header::{CONTENT_LENGTH, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use tokio_util::io::ReaderStream;
use tracing::debug;
use urlencoding::encode;

use super::{
    GcsConfig,
    dto::{BucketResource, InsertBucketRequest, ListResponse, ObjectResource},
};
use crate::{
    adapters::outbound::storage::error::StoreError,
    domain::{
        errors::{StorageError, StorageResult},
        models::{Blob, Bucket, ContentSource, Page, TRANSFER_CHUNK_SIZE},
        value_objects::{BlobId, BucketName},
    },
    ports::storage::{ByteStream, StorageBackend},
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Authenticated session against the Google Cloud Storage JSON API
///
/// Object names are sent verbatim, including folder markers such as `docs/`
/// and names with empty segments. `object_store` paths cannot carry those,
/// so only the credentials come from it.
pub struct GcsStorageBackend {
    http: Client,
    api_base: String,
    upload_base: String,
    project_id: String,
    credentials: Option<GcpCredentialProvider>,
}

impl GcsStorageBackend {
    pub fn new(
        http: Client,
        config: &GcsConfig,
        credentials: Option<GcpCredentialProvider>,
    ) -> Self {
        let endpoint = config.endpoint();
        Self {
            http,
            api_base: format!("{}/storage/v1", endpoint),
            upload_base: format!("{}/upload/storage/v1", endpoint),
            project_id: config.project_id.clone(),
            credentials,
        }
    }

    fn buckets_url(&self) -> String {
        format!("{}/b", self.api_base)
    }

    fn bucket_url(&self, bucket: &BucketName) -> String {
        format!("{}/b/{}", self.api_base, encode(bucket.as_str()))
    }

    fn objects_url(&self, bucket: &BucketName) -> String {
        format!("{}/o", self.bucket_url(bucket))
    }

    fn object_url(&self, id: &BlobId) -> String {
        format!("{}/{}", self.objects_url(&id.bucket), encode(id.key.as_str()))
    }

    fn upload_url(&self, bucket: &BucketName) -> String {
        format!("{}/b/{}/o", self.upload_base, encode(bucket.as_str()))
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, StoreError> {
        match &self.credentials {
            Some(provider) => {
                let credential = provider.get_credential().await?;
                Ok(request.bearer_auth(&credential.bearer))
            }
            None => Ok(request),
        }
    }

    /// Send a request; `None` on 404, an error on any other failure status
    async fn send(&self, request: RequestBuilder) -> Result<Option<Response>, StoreError> {
        let response = self.authorize(request).await?.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Some(response))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, StoreError> {
        match self.send(request).await? {
            Some(response) => Ok(Some(response.json::<T>().await?)),
            None => Ok(None),
        }
    }

    fn list_query(page_token: Option<&str>, page_size: usize) -> Vec<(&'static str, String)> {
        let mut query = vec![("maxResults", page_size.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        query
    }
}

fn is_status(err: &StoreError, expected: StatusCode) -> bool {
    matches!(err, StoreError::Status { status, .. } if *status == expected.as_u16())
}

#[async_trait]
impl StorageBackend for GcsStorageBackend {
    async fn get_bucket(&self, bucket: &BucketName) -> StorageResult<Option<Bucket>> {
        let resource: Option<BucketResource> =
            self.fetch_json(self.http.get(self.bucket_url(bucket))).await?;

        Ok(resource.map(BucketResource::into_bucket).transpose()?)
    }

    async fn create_bucket(&self, bucket: &BucketName) -> StorageResult<Bucket> {
        let request = self
            .http
            .post(self.buckets_url())
            .query(&[("project", self.project_id.as_str())])
            .json(&InsertBucketRequest {
                name: bucket.as_str(),
            });

        let resource: BucketResource = match self.fetch_json(request).await {
            Ok(Some(resource)) => resource,
            Ok(None) => {
                return Err(StorageError::Transport {
                    status: Some(StatusCode::NOT_FOUND.as_u16()),
                    message: format!("Project '{}' not found", self.project_id),
                });
            }
            Err(err) if is_status(&err, StatusCode::CONFLICT) => {
                return Err(StorageError::BucketAlreadyExists {
                    bucket: bucket.clone(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        debug!(bucket = %bucket, project = %self.project_id, "created bucket");
        Ok(resource.into_bucket()?)
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<bool> {
        match self.send(self.http.delete(self.bucket_url(bucket))).await {
            Ok(response) => Ok(response.is_some()),
            Err(err) if is_status(&err, StatusCode::CONFLICT) => Err(StorageError::BucketNotEmpty {
                bucket: bucket.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_buckets(
        &self,
        page_token: Option<&str>,
        page_size: usize,
    ) -> StorageResult<Page<Bucket>> {
        let request = self
            .http
            .get(self.buckets_url())
            .query(&[("project", self.project_id.as_str())])
            .query(&Self::list_query(page_token, page_size));

        let Some(list) = self.fetch_json::<ListResponse<BucketResource>>(request).await? else {
            return Ok(Page::empty());
        };

        let items = list
            .items
            .into_iter()
            .map(BucketResource::into_bucket)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, list.next_page_token))
    }

    async fn get_object(&self, id: &BlobId) -> StorageResult<Option<Blob>> {
        let resource: Option<ObjectResource> =
            self.fetch_json(self.http.get(self.object_url(id))).await?;

        Ok(resource.map(ObjectResource::into_blob).transpose()?)
    }

    async fn put_object(
        &self,
        id: &BlobId,
        content: ContentSource,
        content_type: Option<&str>,
    ) -> StorageResult<Blob> {
        let mut request = self
            .http
            .post(self.upload_url(&id.bucket))
            .query(&[("uploadType", "media"), ("name", id.key.as_str())])
            .header(CONTENT_TYPE, content_type.unwrap_or(DEFAULT_CONTENT_TYPE));

        request = match content {
            ContentSource::Bytes(bytes) => request.body(Body::from(bytes)),
            other => {
                let (reader, len) = other.into_reader().await?;
                if let Some(len) = len {
                    request = request.header(CONTENT_LENGTH, len);
                }
                request.body(Body::wrap_stream(ReaderStream::with_capacity(
                    reader,
                    TRANSFER_CHUNK_SIZE,
                )))
            }
        };

        let resource: ObjectResource = self.fetch_json(request).await?.ok_or_else(|| {
            StorageError::BucketNotFound {
                bucket: id.bucket.clone(),
            }
        })?;

        debug!(blob = %id, size = ?resource.size, "uploaded object");
        Ok(resource.into_blob()?)
    }

    async fn delete_object(&self, id: &BlobId) -> StorageResult<bool> {
        let response = self.send(self.http.delete(self.object_url(id))).await?;
        Ok(response.is_some())
    }

    async fn list_objects(
        &self,
        bucket: &BucketName,
        page_token: Option<&str>,
        page_size: usize,
    ) -> StorageResult<Option<Page<Blob>>> {
        let request = self
            .http
            .get(self.objects_url(bucket))
            .query(&Self::list_query(page_token, page_size));

        let Some(list) = self.fetch_json::<ListResponse<ObjectResource>>(request).await? else {
            return Ok(None);
        };

        let items = list
            .items
            .into_iter()
            .map(ObjectResource::into_blob)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Page::new(items, list.next_page_token)))
    }

    async fn open_read(&self, id: &BlobId) -> StorageResult<ByteStream> {
        let request = self
            .http
            .get(self.object_url(id))
            .query(&[("alt", "media")]);

        let response = self
            .send(request)
            .await?
            .ok_or_else(|| StorageError::ObjectNotFound {
                bucket: id.bucket.clone(),
                key: id.key.clone(),
            })?;

        Ok(response
            .bytes_stream()
            .map_err(|e| StorageError::from(StoreError::from(e)))
            .boxed())
    }
}
