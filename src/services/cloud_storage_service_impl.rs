use async_trait::async_trait;
use bytes::Bytes;
use futures::{
    StreamExt, TryStreamExt,
    future::try_join_all,
    stream::{self, BoxStream},
};
use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{Blob, Bucket, ContentSource, Lookup, Page},
        value_objects::{BlobId, BucketName, ObjectKey},
    },
    ports::services::{BlobStream, BucketStream, CloudStorageService},
    services::{SessionManager, transfer},
};

/// Objects or buckets requested per listing call unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Bucket and blob accessor over a shared storage session
#[derive(Clone)]
pub struct CloudStorageServiceImpl {
    sessions: Arc<SessionManager>,
    page_size: usize,
}

impl CloudStorageServiceImpl {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            sessions,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the listing page size; zero is treated as one
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }
}

enum Cursor {
    First,
    Token(String),
    Done,
}

/// Turn a page fetcher into a lazy stream of items, one request per page
///
/// Stops after the first page that carries no continuation token.
fn paginate<T, F, Fut>(fetch: F) -> BoxStream<'static, StorageResult<T>>
where
    T: Send + 'static,
    F: Fn(Option<String>) -> Fut + Send + 'static,
    Fut: Future<Output = StorageResult<Page<T>>> + Send + 'static,
{
    stream::try_unfold(Cursor::First, move |cursor| {
        let request = match cursor {
            Cursor::First => Some(fetch(None)),
            Cursor::Token(token) => Some(fetch(Some(token))),
            Cursor::Done => None,
        };

        async move {
            let Some(request) = request else {
                return Ok(None);
            };

            let page = request.await?;
            let next = match page.next_page_token {
                Some(token) => Cursor::Token(token),
                None => Cursor::Done,
            };

            Ok::<_, StorageError>(Some((stream::iter(page.items.into_iter().map(Ok)), next)))
        }
    })
    .try_flatten()
    .boxed()
}

#[async_trait]
impl CloudStorageService for CloudStorageServiceImpl {
    async fn get_bucket(&self, bucket: &BucketName) -> StorageResult<Option<Bucket>> {
        let session = self.sessions.session().await?;
        debug!(bucket = %bucket, "get bucket");
        session.get_bucket(bucket).await
    }

    async fn create_bucket(&self, bucket: &BucketName) -> StorageResult<Bucket> {
        let session = self.sessions.session().await?;

        if let Some(existing) = session.get_bucket(bucket).await? {
            debug!(bucket = %bucket, "bucket already present");
            return Ok(existing);
        }

        match session.create_bucket(bucket).await {
            Ok(created) => {
                info!(bucket = %bucket, "created bucket");
                Ok(created)
            }
            // Created concurrently between the lookup and the insert
            Err(StorageError::BucketAlreadyExists { .. }) => session
                .get_bucket(bucket)
                .await?
                .ok_or_else(|| StorageError::BucketNotFound {
                    bucket: bucket.clone(),
                }),
            Err(e) => Err(e),
        }
    }

    async fn bucket_exists(&self, bucket: &BucketName) -> StorageResult<bool> {
        Ok(self.get_bucket(bucket).await?.is_some())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<bool> {
        let session = self.sessions.session().await?;
        let deleted = session.delete_bucket(bucket).await?;

        if deleted {
            info!(bucket = %bucket, "deleted bucket");
        }
        Ok(deleted)
    }

    fn list_buckets(&self) -> BucketStream {
        let sessions = self.sessions.clone();
        let page_size = self.page_size;

        paginate(move |token| {
            let sessions = sessions.clone();
            async move {
                let session = sessions.session().await?;
                debug!(page_token = ?token, "list buckets page");
                session.list_buckets(token.as_deref(), page_size).await
            }
        })
    }

    async fn list_buckets_page(&self, page_token: Option<&str>) -> StorageResult<Page<Bucket>> {
        let session = self.sessions.session().await?;
        session.list_buckets(page_token, self.page_size).await
    }

    async fn create_folder(&self, bucket: &BucketName, name: &str) -> StorageResult<Blob> {
        let id = BlobId::new(bucket.clone(), ObjectKey::folder(name)?);
        let session = self.sessions.session().await?;

        debug!(blob = %id, "create folder");
        session.put_object(&id, ContentSource::empty(), None).await
    }

    async fn add_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        content: ContentSource,
        content_type: Option<&str>,
    ) -> StorageResult<Option<Blob>> {
        let session = self.sessions.session().await?;

        if session.get_bucket(bucket).await?.is_none() {
            debug!(bucket = %bucket, key = %key, "add file skipped, bucket missing");
            return Ok(None);
        }

        let id = BlobId::new(bucket.clone(), key.clone());
        debug!(blob = %id, source = ?content, content_type = ?content_type, "add file");
        let blob = session.put_object(&id, content, content_type).await?;

        Ok(Some(blob))
    }

    async fn add_file_in_folder(
        &self,
        bucket: &BucketName,
        folder: &str,
        file: &str,
        content: ContentSource,
        content_type: Option<&str>,
    ) -> StorageResult<Option<Blob>> {
        let key = ObjectKey::compose(Some(folder), file)?;
        self.add_file(bucket, &key, content, content_type).await
    }

    async fn lookup_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<Lookup<Blob>> {
        let session = self.sessions.session().await?;

        if session.get_bucket(bucket).await?.is_none() {
            return Ok(Lookup::BucketNotFound);
        }

        let id = BlobId::new(bucket.clone(), key.clone());
        debug!(blob = %id, "get file");
        Ok(match session.get_object(&id).await? {
            Some(blob) => Lookup::Found(blob),
            None => Lookup::ObjectNotFound,
        })
    }

    async fn get_file(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<Option<Blob>> {
        Ok(self.lookup_file(bucket, key).await?.found())
    }

    async fn get_file_in_folder(
        &self,
        bucket: &BucketName,
        folder: &str,
        file: &str,
    ) -> StorageResult<Option<Blob>> {
        let key = ObjectKey::compose(Some(folder), file)?;
        self.get_file(bucket, &key).await
    }

    async fn get_files(
        &self,
        bucket: &BucketName,
        keys: &[ObjectKey],
    ) -> StorageResult<Vec<Option<Blob>>> {
        let session = self.sessions.session().await?;

        if session.get_bucket(bucket).await?.is_none() {
            return Ok(vec![None; keys.len()]);
        }

        debug!(bucket = %bucket, count = keys.len(), "get files");
        try_join_all(keys.iter().map(|key| {
            let session = session.clone();
            let id = BlobId::new(bucket.clone(), key.clone());
            async move { session.get_object(&id).await }
        }))
        .await
    }

    async fn delete_file(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<bool> {
        let Lookup::Found(blob) = self.lookup_file(bucket, key).await? else {
            return Ok(false);
        };

        let session = self.sessions.session().await?;
        let deleted = session.delete_object(&blob.id()).await?;

        debug!(blob = %blob.id(), deleted, "delete file");
        Ok(deleted)
    }

    fn list_files(&self, bucket: &BucketName) -> BlobStream {
        let sessions = self.sessions.clone();
        let bucket = bucket.clone();
        let page_size = self.page_size;

        paginate(move |token| {
            let sessions = sessions.clone();
            let bucket = bucket.clone();
            async move {
                let session = sessions.session().await?;
                debug!(bucket = %bucket, page_token = ?token, "list files page");
                let page = session
                    .list_objects(&bucket, token.as_deref(), page_size)
                    .await?;
                Ok::<_, StorageError>(page.unwrap_or_default())
            }
        })
    }

    async fn list_files_page(
        &self,
        bucket: &BucketName,
        page_token: Option<&str>,
    ) -> StorageResult<Page<Blob>> {
        let session = self.sessions.session().await?;
        let page = session
            .list_objects(bucket, page_token, self.page_size)
            .await?;
        Ok(page.unwrap_or_default())
    }

    async fn read_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<Option<Bytes>> {
        let Some(blob) = self.get_file(bucket, key).await? else {
            return Ok(None);
        };

        let session = self.sessions.session().await?;
        let stream = match session.open_read(&blob.id()).await {
            Ok(stream) => stream,
            // Deleted between the lookup and the read
            Err(StorageError::ObjectNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(Some(transfer::read_to_bytes(stream).await?))
    }

    async fn download(&self, blob: &Blob, destination: &Path) -> StorageResult<PathBuf> {
        transfer::ensure_directory(destination).await?;
        let target = transfer::local_path_for(destination, &blob.key)?;

        if blob.is_folder() {
            tokio::fs::create_dir_all(&target)
                .await
                .map_err(|e| StorageError::Io {
                    path: Some(target.clone()),
                    message: e.to_string(),
                })?;
            return Ok(target);
        }

        let session = self.sessions.session().await?;
        let stream = session.open_read(&blob.id()).await?;
        let written = transfer::download_to(stream, &target).await?;

        debug!(blob = %blob.id(), target = %target.display(), bytes = written, "downloaded");
        Ok(target)
    }

    async fn get_as_local_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        destination: &Path,
    ) -> StorageResult<Option<PathBuf>> {
        transfer::ensure_directory(destination).await?;

        match self.get_file(bucket, key).await? {
            Some(blob) => Ok(Some(self.download(&blob, destination).await?)),
            None => Ok(None),
        }
    }
}
