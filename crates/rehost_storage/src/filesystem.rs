//! Filesystem-backed object store.
//!
//! Objects live under a root directory at their store path and are served
//! from a public base URL, e.g. `root/assets/<sha256>.jpg` is published as
//! `<public_base_url>/assets/<sha256>.jpg`.

use crate::{ObjectStore, PutOptions, StoredObject};
use bytes::Bytes;
use rehost_error::{RehostResult, StorageError, StorageErrorKind};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Local object store.
///
/// # Features
///
/// - **Atomic writes**: temp file in the destination directory, then rename
/// - **Overwrite control**: without `overwrite` an existing object is a
///   conflict, matching remote stores
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    root: PathBuf,
    public_base_url: String,
}

impl FileSystemStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or the base URL does
    /// not parse.
    #[tracing::instrument(skip(root, public_base_url))]
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> RehostResult<Self> {
        let root = root.into();
        let public_base_url = public_base_url.into();

        url::Url::parse(&public_base_url).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidConfig(format!(
                "public_base_url {}: {}",
                public_base_url, e
            )))
        })?;

        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                root.display(),
                e
            )))
        })?;

        tracing::info!(root = %root.display(), "Created filesystem object store");
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a store path to a file below the root, rejecting anything that
    /// could escape it.
    fn file_path(&self, path: &str) -> RehostResult<PathBuf> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(path.to_string())).into());
        }
        Ok(self.root.join(relative))
    }

    fn stored(&self, path: &str) -> StoredObject {
        StoredObject {
            url: format!("{}/{}", self.public_base_url, path),
            pathname: path.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for FileSystemStore {
    fn backend(&self) -> &'static str {
        "filesystem"
    }

    #[tracing::instrument(skip(self, data, _content_type), fields(size = data.len()))]
    async fn put(
        &self,
        path: &str,
        data: Bytes,
        _content_type: &str,
        options: PutOptions,
    ) -> RehostResult<StoredObject> {
        let file = self.file_path(path)?;

        if !options.overwrite && tokio::fs::try_exists(&file).await.unwrap_or(false) {
            return Err(StorageError::new(StorageErrorKind::AlreadyExists(path.to_string())).into());
        }

        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Unique per write so concurrent writers of one path never share a temp file
        let temp = file.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&temp, &data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp, &file).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp.display(),
                file.display(),
                e
            )))
        })?;

        tracing::debug!(path = %file.display(), "Stored object");
        Ok(self.stored(path))
    }

    #[tracing::instrument(skip(self))]
    async fn head(&self, path: &str) -> RehostResult<Option<StoredObject>> {
        let file = self.file_path(path)?;
        if tokio::fs::try_exists(&file).await.unwrap_or(false) {
            Ok(Some(self.stored(path)))
        } else {
            Ok(None)
        }
    }
}
