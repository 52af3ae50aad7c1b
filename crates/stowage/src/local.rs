//! Local filesystem driver

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::LocalDiskConfig;
use crate::disk::{bytes_stream, file_stream, ByteStream, Disk};
use crate::error::StorageError;
use crate::options::PutOptions;

/// Disk rooted at a directory on the local filesystem
pub struct LocalDisk {
    root: PathBuf,
    base_url: String,
}

impl LocalDisk {
    /// Create a local disk from configuration
    pub fn new(config: &LocalDiskConfig) -> Self {
        let root = PathBuf::from(&config.root_path);
        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!("Initialized local disk at {:?}", root);
        Self { root, base_url }
    }

    /// Resolve a storage path to an absolute filesystem path
    ///
    /// `..` segments are passed through as-is; callers hand this layer
    /// trusted paths.
    fn full_path(&self, path: &str) -> PathBuf {
        // Joining an absolute path would replace the root, so strip the
        // leading separator first.
        self.root.join(path.trim_start_matches('/'))
    }
}

/// Create the parent directories of `path` with mode 0755
async fn create_parent_dirs(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder.create(parent).await?;
    }
    Ok(())
}

#[async_trait]
impl Disk for LocalDisk {
    async fn put(
        &self,
        path: &str,
        mut content: ByteStream,
        _options: PutOptions,
    ) -> Result<String, StorageError> {
        let full_path = self.full_path(path);
        debug!("Writing object to {:?}", full_path);

        create_parent_dirs(&full_path).await?;

        // Plain create-and-write: overwrite is not atomic and a mid-stream
        // failure can leave a truncated file.
        let mut file = fs::File::create(&full_path).await?;
        while let Some(chunk) = content.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(full_path.to_string_lossy().to_string())
    }

    async fn put_file(
        &self,
        path: &str,
        local_path: &Path,
        options: PutOptions,
    ) -> Result<String, StorageError> {
        let stream = file_stream(local_path).await?;
        self.put(path, stream, options).await
    }

    async fn get(&self, path: &str) -> Result<Bytes, StorageError> {
        let full_path = self.full_path(path);
        debug!("Reading object from {:?}", full_path);

        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn get_stream(&self, path: &str) -> Result<ByteStream, StorageError> {
        let full_path = self.full_path(path);
        debug!("Streaming object from {:?}", full_path);

        file_stream(&full_path).await.map_err(|e| match e {
            StorageError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                StorageError::NotFound(path.to_string())
            }
            other => other,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String, StorageError> {
        if expires_in.is_zero() {
            return Err(StorageError::InvalidExpiry(expires_in));
        }
        // No access control model to sign against; the plain URL is the
        // closest equivalent.
        Ok(self.url(path))
    }

    async fn upload_url(&self, path: &str, expires_in: Duration) -> Result<String, StorageError> {
        self.signed_url(path, expires_in).await
    }

    async fn download(&self, path: &str, local_path: &Path) -> Result<(), StorageError> {
        let data = self.get(path).await?;
        if let Some(parent) = local_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(local_path, &data).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.full_path(path);
        debug!("Deleting object at {:?}", full_path);

        fs::remove_file(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.to_string())
            } else {
                StorageError::Io(e)
            }
        })
    }

    async fn exists(&self, path: &str) -> bool {
        fs::metadata(self.full_path(path)).await.is_ok()
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let data = self.get(from).await?;
        self.put(to, bytes_stream(data), PutOptions::new()).await?;
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        // Copy first; the source is removed only once the copy succeeded.
        self.copy(from, to).await?;
        self.delete(from).await
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        let full_path = self.full_path(path);
        let metadata = fs::metadata(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_disk(dir: &TempDir) -> LocalDisk {
        LocalDisk::new(&LocalDiskConfig {
            root_path: dir.path().to_string_lossy().to_string(),
            base_url: "https://cdn.test".to_string(),
        })
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        disk.put(
            "docs/readme.txt",
            bytes_stream(Bytes::from_static(b"hello world")),
            PutOptions::new(),
        )
        .await
        .unwrap();

        let data = disk.get("docs/readme.txt").await.unwrap();
        assert_eq!(&data[..], b"hello world");
    }

    #[tokio::test]
    async fn test_exists_follows_put_and_delete() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        assert!(!disk.exists("a.txt").await);
        disk.put("a.txt", bytes_stream(Bytes::from_static(b"x")), PutOptions::new())
            .await
            .unwrap();
        assert!(disk.exists("a.txt").await);
        disk.delete("a.txt").await.unwrap();
        assert!(!disk.exists("a.txt").await);
    }

    #[tokio::test]
    async fn test_url_and_size_of_stored_object() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        let content = vec![0u8; 37];
        disk.put("images/a.png", bytes_stream(content), PutOptions::new())
            .await
            .unwrap();

        assert_eq!(disk.url("images/a.png"), "https://cdn.test/images/a.png");
        assert_eq!(disk.size("images/a.png").await.unwrap(), 37);

        disk.delete("images/a.png").await.unwrap();
        assert!(!disk.exists("images/a.png").await);
    }

    #[tokio::test]
    async fn test_url_strips_leading_slash() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);
        assert_eq!(disk.url("/images/a.png"), "https://cdn.test/images/a.png");
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_trimmed() {
        let dir = TempDir::new().unwrap();
        let disk = LocalDisk::new(&LocalDiskConfig {
            root_path: dir.path().to_string_lossy().to_string(),
            base_url: "https://cdn.test/".to_string(),
        });
        assert_eq!(disk.url("a.txt"), "https://cdn.test/a.txt");
    }

    #[tokio::test]
    async fn test_copy_keeps_source() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        disk.put("src.txt", bytes_stream(Bytes::from_static(b"data")), PutOptions::new())
            .await
            .unwrap();
        disk.copy("src.txt", "dst.txt").await.unwrap();

        assert!(disk.exists("src.txt").await);
        assert_eq!(&disk.get("dst.txt").await.unwrap()[..], b"data");
    }

    #[tokio::test]
    async fn test_rename_removes_source() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        disk.put("old.txt", bytes_stream(Bytes::from_static(b"data")), PutOptions::new())
            .await
            .unwrap();
        disk.rename("old.txt", "new.txt").await.unwrap();

        assert!(!disk.exists("old.txt").await);
        assert_eq!(&disk.get("new.txt").await.unwrap()[..], b"data");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        let err = disk.get("missing.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(path) if path == "missing.txt"));
    }

    #[tokio::test]
    async fn test_size_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        let err = disk.size("missing.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_signed_url_rejects_zero_expiry() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        let err = disk.signed_url("a.txt", Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidExpiry(_)));

        let err = disk.upload_url("a.txt", Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidExpiry(_)));
    }

    #[tokio::test]
    async fn test_signed_url_matches_public_url() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        let signed = disk
            .signed_url("a.txt", Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(signed, disk.url("a.txt"));
    }

    #[tokio::test]
    async fn test_put_file_and_download() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        let upload = dir.path().join("upload-source.bin");
        tokio::fs::write(&upload, b"file contents").await.unwrap();

        disk.put_file("stored.bin", &upload, PutOptions::new())
            .await
            .unwrap();

        let target = dir.path().join("fetched/stored.bin");
        disk.download("stored.bin", &target).await.unwrap();

        let data = tokio::fs::read(&target).await.unwrap();
        assert_eq!(&data[..], b"file contents");
    }

    #[tokio::test]
    async fn test_get_stream_collects_to_content() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        disk.put("s.txt", bytes_stream(Bytes::from_static(b"streamed")), PutOptions::new())
            .await
            .unwrap();

        let mut stream = disk.get_stream("s.txt").await.unwrap();
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(&collected[..], b"streamed");
    }

    #[tokio::test]
    async fn test_get_stream_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let disk = test_disk(&dir);

        let err = disk.get_stream("missing.txt").await.err().unwrap();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
