use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::{
    errors::StorageResult,
    models::{Blob, Bucket, ContentSource, Page},
    value_objects::{BlobId, BucketName},
};

/// Byte stream of an object's content, as opened by [`StorageBackend::open_read`]
pub type ByteStream = BoxStream<'static, StorageResult<Bytes>>;

/// Port for an authenticated session against a remote object store
///
/// This is the whole capability the storage facade needs from a provider
/// (Google Cloud Storage, a local emulator, an in-process store). Absence is
/// reported as `None`/`false`; every other failure is an error.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Fetch the current state of a bucket
    async fn get_bucket(&self, bucket: &BucketName) -> StorageResult<Option<Bucket>>;

    /// Create a bucket with default settings
    ///
    /// Fails with `BucketAlreadyExists` when the name is taken.
    async fn create_bucket(&self, bucket: &BucketName) -> StorageResult<Bucket>;

    /// Delete a bucket, returning `false` when it does not exist
    async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<bool>;

    /// Fetch one page of the buckets visible to the session's project
    async fn list_buckets(
        &self,
        page_token: Option<&str>,
        page_size: usize,
    ) -> StorageResult<Page<Bucket>>;

    /// Fetch the metadata of an object
    async fn get_object(&self, id: &BlobId) -> StorageResult<Option<Blob>>;

    /// Store an object, replacing whatever is at that key
    async fn put_object(
        &self,
        id: &BlobId,
        content: ContentSource,
        content_type: Option<&str>,
    ) -> StorageResult<Blob>;

    /// Delete an object, returning `false` when it does not exist
    async fn delete_object(&self, id: &BlobId) -> StorageResult<bool>;

    /// Fetch one page of the objects in a bucket, `None` when the bucket is missing
    async fn list_objects(
        &self,
        bucket: &BucketName,
        page_token: Option<&str>,
        page_size: usize,
    ) -> StorageResult<Option<Page<Blob>>>;

    /// Open a read channel on an object's content
    async fn open_read(&self, id: &BlobId) -> StorageResult<ByteStream>;
}
