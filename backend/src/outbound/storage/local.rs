//! Local-directory implementation of the `ObjectStorage` port.
//!
//! Objects live under a capability-scoped root directory and are served by
//! whatever fronts `public_base_url`. Keys have the shape
//! `{folder}/{YYYYMMDD}-{uuid8}.{ext}`; writes are staged under a hidden name
//! and renamed into place so readers never observe a partial file.

use std::io;
use std::path::{Component, Path};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use mockable::Clock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ports::{MAX_OBJECT_BYTES, ObjectStorage, ObjectStorageError, StoredContentType};

/// Errors raised while opening the storage root.
#[derive(Debug, thiserror::Error)]
pub enum LocalStorageError {
    #[error("failed to open storage root {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("public base url must be http or https: {url}")]
    BaseUrl { url: String },
}

/// Stores objects in a directory on the local filesystem.
#[derive(Clone)]
pub struct LocalObjectStorage {
    root: Arc<Dir>,
    public_base_url: String,
    clock: Arc<dyn Clock>,
}

impl LocalObjectStorage {
    /// Open (creating if needed) the storage root.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStorageError::Open`] when the directory cannot be
    /// created or opened and [`LocalStorageError::BaseUrl`] when the public
    /// URL is not http(s).
    pub fn open(
        root: &Path,
        public_base_url: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LocalStorageError> {
        let trimmed = public_base_url.trim_end_matches('/');
        let scheme_ok = url::Url::parse(trimmed)
            .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !scheme_ok {
            return Err(LocalStorageError::BaseUrl {
                url: public_base_url.to_owned(),
            });
        }

        let open_error = |source| LocalStorageError::Open {
            path: root.display().to_string(),
            source,
        };
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(open_error)?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(open_error)?;

        Ok(Self {
            root: Arc::new(dir),
            public_base_url: trimmed.to_owned(),
            clock,
        })
    }

    fn object_key(&self, folder: &str, content_type: StoredContentType) -> String {
        let date = self.clock.utc().format("%Y%m%d");
        let simple = Uuid::new_v4().simple().to_string();
        let suffix = simple.get(..8).unwrap_or(simple.as_str());
        format!("{folder}/{date}-{suffix}.{}", content_type.extension())
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Result<&'a str, ObjectStorageError> {
        let key = url
            .strip_prefix(self.public_base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| ObjectStorageError::foreign_url(url))?;
        let safe = !key.is_empty()
            && Path::new(key)
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if safe {
            Ok(key)
        } else {
            Err(ObjectStorageError::foreign_url(url))
        }
    }
}

fn validate_folder(folder: &str) -> Result<(), ObjectStorageError> {
    let valid = !folder.is_empty()
        && folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ObjectStorageError::invalid_folder(folder))
    }
}

fn write_staged(root: &Dir, folder: &str, key: &str, bytes: &[u8]) -> io::Result<()> {
    root.create_dir_all(folder)?;
    let staged = format!("{folder}/.tmp-{}", Uuid::new_v4().simple());
    root.write(&staged, bytes)?;
    if let Err(error) = root.rename(&staged, root, key) {
        let _cleanup = root.remove_file(&staged);
        return Err(error);
    }
    Ok(())
}

fn remove_if_exists(root: &Dir, key: &str) -> io::Result<()> {
    match root.remove_file(key) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        folder: &str,
        bytes: Vec<u8>,
        content_type: StoredContentType,
    ) -> Result<String, ObjectStorageError> {
        validate_folder(folder)?;
        if bytes.len() > MAX_OBJECT_BYTES {
            return Err(ObjectStorageError::too_large(bytes.len()));
        }

        let key = self.object_key(folder, content_type);
        let root = Arc::clone(&self.root);
        let folder_owned = folder.to_owned();
        let key_owned = key.clone();
        let size = bytes.len();
        tokio::task::spawn_blocking(move || write_staged(&root, &folder_owned, &key_owned, &bytes))
            .await
            .map_err(|err| ObjectStorageError::write(err.to_string()))?
            .map_err(|err| ObjectStorageError::write(err.to_string()))?;

        info!(%key, size, mime = content_type.mime(), "object stored");
        Ok(format!("{}/{key}", self.public_base_url))
    }

    async fn delete(&self, url: &str) -> Result<(), ObjectStorageError> {
        let key = self.key_from_url(url)?.to_owned();
        let root = Arc::clone(&self.root);
        let key_for_log = key.clone();
        tokio::task::spawn_blocking(move || remove_if_exists(&root, &key))
            .await
            .map_err(|err| ObjectStorageError::delete(err.to_string()))?
            .map_err(|err| ObjectStorageError::delete(err.to_string()))?;

        debug!(key = %key_for_log, "object deleted");
        Ok(())
    }
}
