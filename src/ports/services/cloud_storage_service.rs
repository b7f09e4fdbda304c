use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::path::{Path, PathBuf};

use crate::domain::{
    errors::StorageResult,
    models::{Blob, Bucket, ContentSource, Lookup, Page},
    value_objects::{BucketName, ObjectKey},
};

/// Lazily paginated listing of blobs
pub type BlobStream = BoxStream<'static, StorageResult<Blob>>;

/// Lazily paginated listing of buckets
pub type BucketStream = BoxStream<'static, StorageResult<Bucket>>;

/// Port for bucket and blob lifecycle operations
///
/// Every operation that works inside a bucket resolves the bucket first and
/// short-circuits to an empty result (`None`, `false`, empty listing) when it is
/// missing. Remote failures are returned unchanged, never retried.
#[async_trait]
pub trait CloudStorageService: Send + Sync + 'static {
    /// Fetch a bucket, `None` when it does not exist
    async fn get_bucket(&self, bucket: &BucketName) -> StorageResult<Option<Bucket>>;

    /// Create a bucket, or return the existing one unchanged
    async fn create_bucket(&self, bucket: &BucketName) -> StorageResult<Bucket>;

    /// Whether the bucket exists
    async fn bucket_exists(&self, bucket: &BucketName) -> StorageResult<bool>;

    /// Delete a bucket, `false` when it does not exist
    async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<bool>;

    /// All buckets of the configured project, fetched page by page
    fn list_buckets(&self) -> BucketStream;

    /// A single page of buckets
    async fn list_buckets_page(&self, page_token: Option<&str>) -> StorageResult<Page<Bucket>>;

    /// Create the zero-byte marker object `name/`
    async fn create_folder(&self, bucket: &BucketName, name: &str) -> StorageResult<Blob>;

    /// Store content at `key`, overwriting any existing object
    async fn add_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        content: ContentSource,
        content_type: Option<&str>,
    ) -> StorageResult<Option<Blob>>;

    /// Store content as `file` inside `folder`
    async fn add_file_in_folder(
        &self,
        bucket: &BucketName,
        folder: &str,
        file: &str,
        content: ContentSource,
        content_type: Option<&str>,
    ) -> StorageResult<Option<Blob>>;

    /// Resolve an object, telling a missing bucket apart from a missing object
    async fn lookup_file(&self, bucket: &BucketName, key: &ObjectKey)
    -> StorageResult<Lookup<Blob>>;

    /// Fetch an object, `None` when either the bucket or the object is missing
    async fn get_file(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<Option<Blob>>;

    /// Fetch `file` inside `folder`
    async fn get_file_in_folder(
        &self,
        bucket: &BucketName,
        folder: &str,
        file: &str,
    ) -> StorageResult<Option<Blob>>;

    /// Fetch several objects, one slot per requested key in input order
    async fn get_files(
        &self,
        bucket: &BucketName,
        keys: &[ObjectKey],
    ) -> StorageResult<Vec<Option<Blob>>>;

    /// Delete an object, `false` when its existence cannot be confirmed
    async fn delete_file(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<bool>;

    /// All objects of a bucket, fetched page by page
    ///
    /// Each call starts a fresh listing. A missing bucket lists nothing.
    fn list_files(&self, bucket: &BucketName) -> BlobStream;

    /// A single page of objects
    async fn list_files_page(
        &self,
        bucket: &BucketName,
        page_token: Option<&str>,
    ) -> StorageResult<Page<Blob>>;

    /// Read a whole object into memory
    async fn read_file(&self, bucket: &BucketName, key: &ObjectKey)
    -> StorageResult<Option<Bytes>>;

    /// Materialize a blob below `destination`, which must be an existing directory
    async fn download(&self, blob: &Blob, destination: &Path) -> StorageResult<PathBuf>;

    /// Look up an object and download it below `destination`
    async fn get_as_local_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        destination: &Path,
    ) -> StorageResult<Option<PathBuf>>;
}
