//! Storage contract and driver dispatch

use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::BufReader;

use crate::error::StorageError;
use crate::local::LocalDisk;
use crate::options::PutOptions;
use crate::s3::S3Disk;

/// Type alias for a boxed stream of bytes
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Wrap an in-memory buffer into a single-chunk `ByteStream`
pub fn bytes_stream(bytes: impl Into<Bytes>) -> ByteStream {
    let bytes = bytes.into();
    Box::pin(futures::stream::once(async move {
        Ok::<_, StorageError>(bytes)
    }))
}

/// Open a local file as a `ByteStream`
pub async fn file_stream(path: &Path) -> Result<ByteStream, StorageError> {
    let file = File::open(path).await?;
    let reader = BufReader::new(file);
    let stream = tokio_util::io::ReaderStream::new(reader);
    Ok(Box::pin(stream.map(|result| result.map_err(StorageError::Io))))
}

/// Uniform storage contract
///
/// Every driver implements the full operation set. Options a backend cannot
/// express are accepted and ignored rather than rejected, so callers can
/// switch disks without changing call sites. Paths are backend-relative
/// keys; each driver handles its own escaping.
#[async_trait]
pub trait Disk: Send + Sync {
    /// Write a stream of bytes to `path`, returning the stored location
    async fn put(
        &self,
        path: &str,
        content: ByteStream,
        options: PutOptions,
    ) -> Result<String, StorageError>;

    /// Upload a file from the local filesystem to `path`
    async fn put_file(
        &self,
        path: &str,
        local_path: &Path,
        options: PutOptions,
    ) -> Result<String, StorageError>;

    /// Read the full content at `path`
    async fn get(&self, path: &str) -> Result<Bytes, StorageError>;

    /// Open a streaming read of `path`
    async fn get_stream(&self, path: &str) -> Result<ByteStream, StorageError>;

    /// Public URL for `path`; referential only, no existence check
    fn url(&self, path: &str) -> String;

    /// Time-boxed URL granting read access for `expires_in`
    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String, StorageError>;

    /// Time-boxed URL granting write access for `expires_in`
    async fn upload_url(&self, path: &str, expires_in: Duration) -> Result<String, StorageError>;

    /// Fetch `path` into a local file
    async fn download(&self, path: &str, local_path: &Path) -> Result<(), StorageError>;

    /// Remove the object at `path`
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Whether `path` currently exists; any failure reads as `false`
    async fn exists(&self, path: &str) -> bool;

    /// Duplicate `from` to `to` within the same backend
    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// Copy `from` to `to`, then delete the source
    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// Size of the object at `path` in bytes
    async fn size(&self, path: &str) -> Result<u64, StorageError>;
}

/// The closed set of storage drivers
///
/// Dispatch is a plain match; the variant set is fixed and small, so a sum
/// type replaces any open registration mechanism.
pub enum AnyDisk {
    Local(LocalDisk),
    S3(S3Disk),
}

impl From<LocalDisk> for AnyDisk {
    fn from(disk: LocalDisk) -> Self {
        AnyDisk::Local(disk)
    }
}

impl From<S3Disk> for AnyDisk {
    fn from(disk: S3Disk) -> Self {
        AnyDisk::S3(disk)
    }
}

#[async_trait]
impl Disk for AnyDisk {
    async fn put(
        &self,
        path: &str,
        content: ByteStream,
        options: PutOptions,
    ) -> Result<String, StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.put(path, content, options).await,
            AnyDisk::S3(disk) => disk.put(path, content, options).await,
        }
    }

    async fn put_file(
        &self,
        path: &str,
        local_path: &Path,
        options: PutOptions,
    ) -> Result<String, StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.put_file(path, local_path, options).await,
            AnyDisk::S3(disk) => disk.put_file(path, local_path, options).await,
        }
    }

    async fn get(&self, path: &str) -> Result<Bytes, StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.get(path).await,
            AnyDisk::S3(disk) => disk.get(path).await,
        }
    }

    async fn get_stream(&self, path: &str) -> Result<ByteStream, StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.get_stream(path).await,
            AnyDisk::S3(disk) => disk.get_stream(path).await,
        }
    }

    fn url(&self, path: &str) -> String {
        match self {
            AnyDisk::Local(disk) => disk.url(path),
            AnyDisk::S3(disk) => disk.url(path),
        }
    }

    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String, StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.signed_url(path, expires_in).await,
            AnyDisk::S3(disk) => disk.signed_url(path, expires_in).await,
        }
    }

    async fn upload_url(&self, path: &str, expires_in: Duration) -> Result<String, StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.upload_url(path, expires_in).await,
            AnyDisk::S3(disk) => disk.upload_url(path, expires_in).await,
        }
    }

    async fn download(&self, path: &str, local_path: &Path) -> Result<(), StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.download(path, local_path).await,
            AnyDisk::S3(disk) => disk.download(path, local_path).await,
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.delete(path).await,
            AnyDisk::S3(disk) => disk.delete(path).await,
        }
    }

    async fn exists(&self, path: &str) -> bool {
        match self {
            AnyDisk::Local(disk) => disk.exists(path).await,
            AnyDisk::S3(disk) => disk.exists(path).await,
        }
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.copy(from, to).await,
            AnyDisk::S3(disk) => disk.copy(from, to).await,
        }
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.rename(from, to).await,
            AnyDisk::S3(disk) => disk.rename(from, to).await,
        }
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        match self {
            AnyDisk::Local(disk) => disk.size(path).await,
            AnyDisk::S3(disk) => disk.size(path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bytes_stream_yields_content() {
        let mut stream = bytes_stream(Bytes::from_static(b"hello"));
        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"hello");
        assert!(stream.next().await.is_none());
    }
}
