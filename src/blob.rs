//! Content storage for uploaded media.
//!
//! The catalog only keeps the handle returned by [`BlobStore::put`]; bytes live
//! behind this trait.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::io::AsyncRead;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A readable blob.
pub type BlobReader = Pin<Box<dyn AsyncRead + Send>>;

/// What [`BlobStore::put`] stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Opaque handle to pass back to [`BlobStore::open`].
    pub handle: String,
    /// Size in bytes.
    pub size: i64,
    /// BLAKE3 digest, lowercase hex.
    pub checksum: String,
    /// MIME type sniffed from the leading bytes, when recognised.
    pub mime_type: Option<String>,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` and returns the handle and metadata.
    async fn put(&self, bytes: Bytes) -> Result<StoredBlob>;

    /// Opens a stored blob. An unknown handle is `NotFound`.
    async fn open(&self, handle: &str) -> Result<BlobReader>;

    /// Removes a stored blob. Removing an unknown handle is not an error.
    async fn remove(&self, handle: &str) -> Result<()>;
}

/// Blobs as files in one flat directory, named by random handles.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Opens the store at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!("✅ Media directory ready at {}", root.display());
        Ok(Self { root })
    }

    /// Resolves a handle to a path inside the root. Anything that is not a plain
    /// file name (separators, `..`, empty) is rejected.
    fn path_for(&self, handle: &str) -> Result<PathBuf> {
        let is_plain = !handle.is_empty()
            && Path::new(handle).file_name().and_then(|n| n.to_str()) == Some(handle)
            && handle != "..";

        if !is_plain {
            tracing::warn!("❌ Rejected blob handle: {:?}", handle);
            return Err(AppError::NotFound);
        }

        Ok(self.root.join(handle))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, bytes: Bytes) -> Result<StoredBlob> {
        let handle = Uuid::new_v4().simple().to_string();
        let path = self.path_for(&handle)?;

        let checksum = blake3::hash(&bytes).to_hex().to_string();
        let mime_type = infer::get(&bytes).map(|kind| kind.mime_type().to_string());
        let size = i64::try_from(bytes.len())
            .map_err(|_| AppError::Validation("File too large".to_string()))?;

        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!("💾 Stored blob {} ({} bytes, {:?})", handle, size, mime_type);

        Ok(StoredBlob {
            handle,
            size,
            checksum,
            mime_type,
        })
    }

    async fn open(&self, handle: &str) -> Result<BlobReader> {
        let path = self.path_for(handle)?;

        match tokio::fs::File::open(&path).await {
            Ok(file) => Ok(Box::pin(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("❌ Blob {} missing from media directory", handle);
                Err(AppError::NotFound)
            }
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn remove(&self, handle: &str) -> Result<()> {
        let path = self.path_for(handle)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    const OGG_HEADER: &[u8] = b"OggS\x00\x02\x00\x00\x00\x00\x00\x00\x00\x00";

    async fn store() -> (tempfile::TempDir, LocalBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("media")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_open_returns_same_bytes() {
        let (_dir, store) = store().await;
        let blob = store.put(Bytes::from_static(b"hello media")).await.unwrap();

        assert_eq!(blob.size, 11);
        assert_eq!(blob.handle.len(), 32);
        assert_eq!(blob.checksum, blake3::hash(b"hello media").to_hex().to_string());

        let mut reader = store.open(&blob.handle).await.unwrap();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"hello media");
    }

    #[tokio::test]
    async fn sniffs_mime_type() {
        let (_dir, store) = store().await;

        let ogg = store.put(Bytes::from_static(OGG_HEADER)).await.unwrap();
        assert_eq!(ogg.mime_type.as_deref(), Some("audio/ogg"));

        let text = store.put(Bytes::from_static(b"plain words")).await.unwrap();
        assert_eq!(text.mime_type, None);
    }

    #[tokio::test]
    async fn unknown_handle_is_not_found() {
        let (_dir, store) = store().await;
        assert!(matches!(
            store.open("0123456789abcdef0123456789abcdef").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let (_dir, store) = store().await;
        for handle in ["../secret", "a/b", "", "..", "/etc/passwd"] {
            assert!(
                matches!(store.open(handle).await, Err(AppError::NotFound)),
                "handle {:?}",
                handle
            );
        }
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let (_dir, store) = store().await;
        let blob = store.put(Bytes::from_static(b"bye")).await.unwrap();

        store.remove(&blob.handle).await.unwrap();
        store.remove(&blob.handle).await.unwrap();
        assert!(matches!(store.open(&blob.handle).await, Err(AppError::NotFound)));
    }
}
