use std::path::PathBuf;

use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::domain::errors::{StorageError, StorageResult};

/// Size of the chunks content is moved in, both for uploads and downloads
pub const TRANSFER_CHUNK_SIZE: usize = 64 * 1024;

/// Boxed async byte source used for streamed uploads
pub type BoxedReader = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// Where the content of an uploaded object comes from
pub enum ContentSource {
    /// In-memory bytes
    Bytes(Bytes),
    /// An arbitrary reader, consumed until EOF
    Reader(BoxedReader),
    /// A local file, opened and streamed, never loaded whole
    Path(PathBuf),
}

impl ContentSource {
    /// Zero-byte content, as used by folder markers
    pub fn empty() -> Self {
        ContentSource::Bytes(Bytes::new())
    }

    pub fn reader(reader: impl AsyncRead + Send + Sync + Unpin + 'static) -> Self {
        ContentSource::Reader(Box::new(reader))
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        ContentSource::Path(path.into())
    }

    /// Open the source as a reader, along with its length when known up front
    pub async fn into_reader(self) -> StorageResult<(BoxedReader, Option<u64>)> {
        match self {
            ContentSource::Bytes(bytes) => {
                let len = bytes.len() as u64;
                Ok((Box::new(std::io::Cursor::new(bytes)) as BoxedReader, Some(len)))
            }
            ContentSource::Reader(reader) => Ok((reader, None)),
            ContentSource::Path(path) => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .map_err(|e| StorageError::Io {
                        path: Some(path.clone()),
                        message: format!("Failed to open upload source: {}", e),
                    })?;
                let len = file
                    .metadata()
                    .await
                    .map_err(|e| StorageError::Io {
                        path: Some(path.clone()),
                        message: format!("Failed to stat upload source: {}", e),
                    })?
                    .len();
                Ok((Box::new(file) as BoxedReader, Some(len)))
            }
        }
    }
}

impl std::fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentSource::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            ContentSource::Reader(_) => f.write_str("Reader"),
            ContentSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
        }
    }
}

impl From<Bytes> for ContentSource {
    fn from(bytes: Bytes) -> Self {
        ContentSource::Bytes(bytes)
    }
}

impl From<Vec<u8>> for ContentSource {
    fn from(data: Vec<u8>) -> Self {
        ContentSource::Bytes(Bytes::from(data))
    }
}

impl From<&'static [u8]> for ContentSource {
    fn from(data: &'static [u8]) -> Self {
        ContentSource::Bytes(Bytes::from_static(data))
    }
}

impl From<&'static str> for ContentSource {
    fn from(data: &'static str) -> Self {
        ContentSource::Bytes(Bytes::from_static(data.as_bytes()))
    }
}

impl From<PathBuf> for ContentSource {
    fn from(path: PathBuf) -> Self {
        ContentSource::Path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_bytes_source_reports_length() {
        let (mut reader, len) = ContentSource::from("hello").into_reader().await.unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();

        assert_eq!(len, Some(5));
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_path_source_streams_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        tokio::fs::write(&path, vec![7u8; 1000]).await.unwrap();

        let (mut reader, len) = ContentSource::path(&path).into_reader().await.unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();

        assert_eq!(len, Some(1000));
        assert_eq!(out, vec![7u8; 1000]);
    }

    #[tokio::test]
    async fn test_missing_path_is_io_error() {
        let err = ContentSource::path("/definitely/not/here.txt")
            .into_reader()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[tokio::test]
    async fn test_reader_source_has_unknown_length() {
        let source = ContentSource::reader(std::io::Cursor::new(b"abc".to_vec()));
        let (_, len) = source.into_reader().await.unwrap();
        assert_eq!(len, None);
    }
}
