use eyre::{bail, Result};
use fs_err as fs;
use moodlog_common::domain::UserId;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const BUCKETS: [&str; 2] = ["wpisy-photos", "avatars"];

/// Object storage backed by plain files: `<root>/<bucket>/<user_id>/<name>`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unknown bucket")]
    UnknownBucket,
    #[error("invalid object path")]
    InvalidPath,
    #[error("object belongs to another user")]
    Forbidden,
    #[error("object already exists")]
    Exists,
    #[error("object not found")]
    NotFound,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if root.as_os_str().is_empty() {
            bail!("Storage path can not be empty");
        }
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Locates an object inside its bucket. Paths must be relative and stay inside the
    /// bucket.
    fn locate(&self, bucket: &str, path: &str) -> Result<PathBuf, StorageError> {
        if !BUCKETS.contains(&bucket) {
            return Err(StorageError::UnknownBucket);
        }

        let rel = Path::new(path);
        let normal = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !normal {
            return Err(StorageError::InvalidPath);
        }

        Ok(self.root.join(bucket).join(rel))
    }

    /// Like `locate`, but the path must also start with the owner's id.
    fn resolve(&self, bucket: &str, path: &str, owner: &UserId) -> Result<PathBuf, StorageError> {
        let file = self.locate(bucket, path)?;

        let prefix = format!("{owner}/");
        if !path.starts_with(&prefix) || path.len() == prefix.len() {
            return Err(StorageError::Forbidden);
        }

        Ok(file)
    }

    pub fn put(
        &self,
        bucket: &str,
        path: &str,
        owner: &UserId,
        bytes: &[u8],
        upsert: bool,
    ) -> Result<(), StorageError> {
        let file = self.resolve(bucket, path, owner)?;
        if file.exists() && !upsert {
            return Err(StorageError::Exists);
        }
        if let Some(dir) = file.parent() {
            fs::create_dir_all(dir)?;
        }
        debug!("storing {} bytes at {bucket}/{path}", bytes.len());
        fs::write(&file, bytes)?;
        Ok(())
    }

    /// Reads an object. Reads are public, object names carry a random id.
    pub fn get(&self, bucket: &str, path: &str) -> Result<Vec<u8>, StorageError> {
        let file = self.locate(bucket, path)?;
        if !file.is_file() {
            return Err(StorageError::NotFound);
        }
        Ok(fs::read(&file)?)
    }

    /// Removes the given objects. Missing objects are skipped, the number of removed ones
    /// is returned.
    pub fn remove(&self, bucket: &str, paths: &[String], owner: &UserId) -> Result<usize, StorageError> {
        let files = paths
            .iter()
            .map(|p| self.resolve(bucket, p, owner))
            .collect::<Result<Vec<_>, _>>()?;

        let mut removed = 0;
        for file in files {
            if file.exists() {
                fs::remove_file(&file)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

pub fn content_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|x| x.to_str())
        .map(|x| x.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
