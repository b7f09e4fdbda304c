//! Chunked movement of object content between the store and local disk
//!
//! Content is never held whole in memory on the download path: it is pulled
//! from the read channel and written out one [`TRANSFER_CHUNK_SIZE`] buffer at
//! a time.

use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::TRANSFER_CHUNK_SIZE,
        value_objects::ObjectKey,
    },
    ports::storage::ByteStream,
};

/// Check that `path` is an existing directory
pub async fn ensure_directory(path: &Path) -> StorageResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(StorageError::InvalidDestination {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        }),
        Err(e) => Err(StorageError::InvalidDestination {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Local path mirroring `key` below `directory`
///
/// Relative segments are refused so a key can never escape the destination.
pub fn local_path_for(directory: &Path, key: &ObjectKey) -> StorageResult<PathBuf> {
    let mut path = directory.to_path_buf();

    for segment in key.segments() {
        if segment == ".." || segment == "." {
            return Err(StorageError::InvalidDestination {
                path: directory.to_path_buf(),
                reason: format!("object key '{}' has a relative segment", key),
            });
        }
        path.push(segment);
    }

    Ok(path)
}

/// Copy `reader` into `writer` through one reusable buffer
///
/// Each write is a full chunk except the last. Returns the number of bytes copied.
pub async fn copy_chunked<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; TRANSFER_CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let mut filled = 0;
        while filled < buffer.len() {
            let n = reader.read(&mut buffer[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            break;
        }

        writer.write_all(&buffer[..filled]).await?;
        total += filled as u64;

        if filled < buffer.len() {
            break;
        }
    }

    writer.flush().await?;
    Ok(total)
}

/// Recover a storage error carried through an io::Error, or describe the local failure
fn from_io(err: io::Error, path: &Path) -> StorageError {
    if let Some(inner) = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<StorageError>())
    {
        return inner.clone();
    }

    StorageError::Io {
        path: Some(path.to_path_buf()),
        message: err.to_string(),
    }
}

/// Write the content of a read channel to `target`, creating parent directories
pub async fn download_to(stream: ByteStream, target: &Path) -> StorageResult<u64> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| from_io(e, parent))?;
    }

    let mut file = tokio::fs::File::create(target)
        .await
        .map_err(|e| from_io(e, target))?;
    let mut reader = StreamReader::new(stream.map_err(io::Error::other));

    copy_chunked(&mut reader, &mut file)
        .await
        .map_err(|e| from_io(e, target))
}

/// Collect a read channel into memory
pub async fn read_to_bytes(stream: ByteStream) -> StorageResult<Bytes> {
    let buffer = stream
        .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
            buffer.extend_from_slice(&chunk);
            Ok(buffer)
        })
        .await?;

    Ok(buffer.freeze())
}
