/// Profile picture storage on the local filesystem
///
/// Each account has at most one picture, stored as `<dir>/<account_id>.jpg`.
/// Downloads fall back to `<dir>/default.jpg` for accounts without one.
/// Writes go to a temporary file first and are renamed into place, so a
/// reader never sees a half-written image.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

pub const IMAGE_EXTENSION: &str = "jpg";
pub const DEFAULT_IMAGE: &str = "default.jpg";

/// Largest accepted upload, in bytes
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Image must not be empty")]
    Empty,

    #[error("Image exceeds {MAX_IMAGE_BYTES} bytes")]
    TooLarge,

    #[error("Profile picture not found")]
    NotFound,

    #[error("Storage I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Directory-backed picture store
#[derive(Debug, Clone)]
pub struct ProfilePictureStore {
    dir: PathBuf,
}

impl ProfilePictureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where an account's picture lives
    pub fn path_for(&self, account_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.{}", account_id, IMAGE_EXTENSION))
    }

    /// Creates the directory if missing
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Stores an image, replacing any previous one, and returns its path
    pub async fn save(&self, account_id: Uuid, image: &[u8]) -> Result<PathBuf, StorageError> {
        if image.is_empty() {
            return Err(StorageError::Empty);
        }
        if image.len() > MAX_IMAGE_BYTES {
            return Err(StorageError::TooLarge);
        }

        self.ensure_dir().await?;

        let target = self.path_for(account_id);
        let staging = self.dir.join(format!(".{}.{}.part", account_id, Uuid::new_v4()));

        tokio::fs::write(&staging, image).await?;
        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        info!(%account_id, bytes = image.len(), "Profile picture stored");
        Ok(target)
    }

    /// Loads an account's picture, or the default image
    pub async fn load(&self, account_id: Uuid, has_picture: bool) -> Result<Bytes, StorageError> {
        if has_picture {
            match read_if_exists(&self.path_for(account_id)).await? {
                Some(image) => return Ok(image),
                None => debug!(%account_id, "Stored picture missing, using default"),
            }
        }

        read_if_exists(&self.dir.join(DEFAULT_IMAGE))
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Removes an account's picture; missing files are ignored
    pub async fn remove(&self, account_id: Uuid) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(account_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn read_if_exists(path: &Path) -> Result<Option<Bytes>, StorageError> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(Some(Bytes::from(data))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
