use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, ObjectMeta,
    ObjectStore as ApacheObjectStore, buffered::BufWriter, memory::InMemory,
    path::Path as ObjectPath,
};
use std::{collections::BTreeMap, ops::Bound, sync::Arc};
use tokio::{io::AsyncWriteExt, sync::RwLock};
use tracing::debug;

use crate::{
    adapters::outbound::storage::error::StoreError,
    domain::{
        errors::{StorageError, StorageResult},
        models::{Blob, Bucket, ContentSource, Page},
        value_objects::{BlobId, BucketName, ObjectKey},
    },
    ports::storage::{ByteStream, StorageBackend},
};

/// Location reported for buckets held in process memory
const MEMORY_LOCATION: &str = "memory";

/// In-process storage backend, one Apache `InMemory` store per bucket
///
/// Behaves like a remote store for the purposes of the facade: buckets must
/// be created before use, non-empty buckets cannot be deleted, and listings
/// are paginated with opaque tokens. Objects are listed in byte order of
/// their names, as Google Cloud Storage lists them. Listings do not report
/// content types.
#[derive(Clone, Default)]
pub struct InMemoryStorageBackend {
    buckets: Arc<RwLock<BTreeMap<BucketName, MemoryBucket>>>,
}

#[derive(Clone)]
struct MemoryBucket {
    store: Arc<InMemory>,
    created: DateTime<Utc>,
}

impl MemoryBucket {
    fn to_bucket(&self, name: &BucketName) -> Bucket {
        Bucket {
            name: name.clone(),
            location: Some(MEMORY_LOCATION.to_string()),
            created: Some(self.created),
        }
    }
}

impl InMemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    async fn store(&self, bucket: &BucketName) -> Option<Arc<InMemory>> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(|entry| entry.store.clone())
    }
}

/// Keys are stored hex-encoded as a single path part
///
/// Trailing and repeated separators survive, and path order matches the byte
/// order of the original names.
fn object_path(key: &ObjectKey) -> ObjectPath {
    ObjectPath::from(hex::encode(key.as_str()))
}

fn object_key(path: &ObjectPath) -> StorageResult<ObjectKey> {
    let raw: &str = path.as_ref();
    let undecodable = |reason: String| StorageError::InternalError {
        message: format!("Undecodable object path '{}': {}", raw, reason),
    };

    let bytes = hex::decode(raw).map_err(|e| undecodable(e.to_string()))?;
    let name = String::from_utf8(bytes).map_err(|e| undecodable(e.to_string()))?;
    Ok(ObjectKey::new(name)?)
}

fn to_blob(bucket: &BucketName, meta: &ObjectMeta, attributes: Option<&Attributes>) -> StorageResult<Blob> {
    Ok(Blob {
        bucket: bucket.clone(),
        key: object_key(&meta.location)?,
        size: meta.size as u64,
        content_type: attributes
            .and_then(|attrs| attrs.get(&Attribute::ContentType))
            .map(|value| value.to_string()),
        etag: meta.e_tag.clone(),
        generation: meta.version.clone(),
        updated: Some(meta.last_modified),
    })
}

#[async_trait]
impl StorageBackend for InMemoryStorageBackend {
    async fn get_bucket(&self, bucket: &BucketName) -> StorageResult<Option<Bucket>> {
        let buckets = self.buckets.read().await;
        Ok(buckets.get(bucket).map(|entry| entry.to_bucket(bucket)))
    }

    async fn create_bucket(&self, bucket: &BucketName) -> StorageResult<Bucket> {
        let mut buckets = self.buckets.write().await;

        if buckets.contains_key(bucket) {
            return Err(StorageError::BucketAlreadyExists {
                bucket: bucket.clone(),
            });
        }

        let entry = MemoryBucket {
            store: Arc::new(InMemory::new()),
            created: Utc::now(),
        };
        let created = entry.to_bucket(bucket);
        buckets.insert(bucket.clone(), entry);

        debug!(bucket = %bucket, "created in-memory bucket");
        Ok(created)
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<bool> {
        let mut buckets = self.buckets.write().await;

        let Some(entry) = buckets.get(bucket) else {
            return Ok(false);
        };

        // Remote stores refuse to drop buckets that still hold objects
        if let Some(first) = entry.store.list(None).next().await {
            first.map_err(StoreError::from)?;
            return Err(StorageError::BucketNotEmpty {
                bucket: bucket.clone(),
            });
        }

        buckets.remove(bucket);
        Ok(true)
    }

    async fn list_buckets(
        &self,
        page_token: Option<&str>,
        page_size: usize,
    ) -> StorageResult<Page<Bucket>> {
        let page_size = page_size.max(1);
        let buckets = self.buckets.read().await;

        let after = page_token.map(BucketName::new).transpose()?;
        let lower = match &after {
            Some(name) => Bound::Excluded(name),
            None => Bound::Unbounded,
        };

        let mut items: Vec<Bucket> = buckets
            .range((lower, Bound::Unbounded))
            .take(page_size + 1)
            .map(|(name, entry)| entry.to_bucket(name))
            .collect();

        let next_page_token = if items.len() > page_size {
            items.truncate(page_size);
            items.last().map(|bucket| bucket.name().to_string())
        } else {
            None
        };

        Ok(Page::new(items, next_page_token))
    }

    async fn get_object(&self, id: &BlobId) -> StorageResult<Option<Blob>> {
        let Some(store) = self.store(&id.bucket).await else {
            return Ok(None);
        };

        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        match store.get_opts(&object_path(&id.key), options).await {
            Ok(result) => Ok(Some(to_blob(
                &id.bucket,
                &result.meta,
                Some(&result.attributes),
            )?)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(StoreError::from(e).into()),
        }
    }

    async fn put_object(
        &self,
        id: &BlobId,
        content: ContentSource,
        content_type: Option<&str>,
    ) -> StorageResult<Blob> {
        let Some(store) = self.store(&id.bucket).await else {
            return Err(StorageError::BucketNotFound {
                bucket: id.bucket.clone(),
            });
        };

        let (mut reader, _) = content.into_reader().await?;

        let mut attributes = Attributes::new();
        if let Some(content_type) = content_type {
            attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_string()),
            );
        }

        let path = object_path(&id.key);
        let mut writer = BufWriter::new(store.clone(), path.clone()).with_attributes(attributes);

        tokio::io::copy(&mut reader, &mut writer).await?;
        writer.shutdown().await?;

        let meta = store.head(&path).await.map_err(StoreError::from)?;
        let mut blob = to_blob(&id.bucket, &meta, None)?;
        blob.content_type = content_type.map(str::to_string);

        debug!(object = %id, size = blob.size, "stored in-memory object");
        Ok(blob)
    }

    async fn delete_object(&self, id: &BlobId) -> StorageResult<bool> {
        let Some(store) = self.store(&id.bucket).await else {
            return Ok(false);
        };

        let path = object_path(&id.key);
        match store.head(&path).await {
            Ok(_) => {}
            Err(object_store::Error::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(StoreError::from(e).into()),
        }

        store.delete(&path).await.map_err(StoreError::from)?;
        Ok(true)
    }

    async fn list_objects(
        &self,
        bucket: &BucketName,
        page_token: Option<&str>,
        page_size: usize,
    ) -> StorageResult<Option<Page<Blob>>> {
        let Some(store) = self.store(bucket).await else {
            return Ok(None);
        };

        let page_size = page_size.max(1);
        let stream = match page_token {
            Some(token) => store.list_with_offset(None, &object_path(&ObjectKey::new(token)?)),
            None => store.list(None),
        };

        let mut metas: Vec<ObjectMeta> = stream
            .take(page_size + 1)
            .try_collect()
            .await
            .map_err(StoreError::from)?;

        let has_more = metas.len() > page_size;
        metas.truncate(page_size);

        let items = metas
            .iter()
            .map(|meta| to_blob(bucket, meta, None))
            .collect::<StorageResult<Vec<_>>>()?;

        let next_page_token = if has_more {
            items.last().map(|blob| blob.name().to_string())
        } else {
            None
        };

        Ok(Some(Page::new(items, next_page_token)))
    }

    async fn open_read(&self, id: &BlobId) -> StorageResult<ByteStream> {
        let Some(store) = self.store(&id.bucket).await else {
            return Err(StorageError::BucketNotFound {
                bucket: id.bucket.clone(),
            });
        };

        match store.get(&object_path(&id.key)).await {
            Ok(result) => Ok(result
                .into_stream()
                .map_err(|e| StorageError::from(StoreError::from(e)))
                .boxed()),
            Err(object_store::Error::NotFound { .. }) => Err(StorageError::ObjectNotFound {
                bucket: id.bucket.clone(),
                key: id.key.clone(),
            }),
            Err(e) => Err(StoreError::from(e).into()),
        }
    }
}
