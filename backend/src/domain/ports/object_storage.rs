//! Port for storing uploaded files and rendered documents.

use async_trait::async_trait;

use super::define_port_error;

/// Largest object accepted by [`ObjectStorage::upload`], in bytes.
pub const MAX_OBJECT_BYTES: usize = 10 * 1024 * 1024;

/// Content types the store accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoredContentType {
    Jpeg,
    Png,
    Pdf,
}

impl StoredContentType {
    /// Resolve a MIME type, returning `None` for anything not accepted.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "application/pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

define_port_error! {
    /// Errors raised by object storage adapters.
    pub enum ObjectStorageError {
        /// The MIME type is not one of JPEG, PNG or PDF.
        UnsupportedContentType { content_type: String } =>
            "content type {content_type} is not allowed",
        /// The payload exceeds [`MAX_OBJECT_BYTES`].
        TooLarge { size: usize } =>
            "object of {size} bytes exceeds the 10 MiB limit",
        /// The folder name is empty or escapes the storage root.
        InvalidFolder { folder: String } =>
            "storage folder {folder} is not allowed",
        /// Writing the object failed.
        Write { message: String } =>
            "object storage write failed: {message}",
        /// Removing the object failed.
        Delete { message: String } =>
            "object storage delete failed: {message}",
        /// The URL was not issued by this store.
        ForeignUrl { url: String } =>
            "url {url} does not belong to this store",
    }
}

/// Check an upload before any bytes are sent to storage.
///
/// # Examples
/// ```
/// use achievement_ledger::domain::ports::{validate_upload, StoredContentType};
///
/// assert_eq!(validate_upload("image/png", 1024), Ok(StoredContentType::Png));
/// assert!(validate_upload("text/plain", 10).is_err());
/// ```
pub fn validate_upload(mime: &str, size: usize) -> Result<StoredContentType, ObjectStorageError> {
    let content_type = StoredContentType::from_mime(mime)
        .ok_or_else(|| ObjectStorageError::unsupported_content_type(mime))?;
    if size > MAX_OBJECT_BYTES {
        return Err(ObjectStorageError::too_large(size));
    }
    Ok(content_type)
}

/// Port for object storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `folder` and return the public URL.
    async fn upload(
        &self,
        folder: &str,
        bytes: Vec<u8>,
        content_type: StoredContentType,
    ) -> Result<String, ObjectStorageError>;

    /// Remove an object previously returned by [`ObjectStorage::upload`].
    async fn delete(&self, url: &str) -> Result<(), ObjectStorageError>;
}
