//! Session signing key loading.
//!
//! Key material is read through `cap_std` and wiped from memory once the
//! cookie key has been derived.

use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use cap_std::{ambient_authority, fs::Dir};
use tracing::warn;
use zeroize::Zeroize;

pub(crate) const SESSION_KEY_MIN_LEN: usize = 64;

/// Errors raised while loading the session key.
#[derive(Debug, thiserror::Error)]
pub enum SessionKeyError {
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

fn read_key_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "key path has no file name")
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read(file_name)
}

/// Load the cookie signing key from `path`.
///
/// A missing or unreadable file yields a generated key only when
/// `allow_ephemeral` is set; sessions then do not survive restarts.
///
/// # Errors
///
/// Returns [`SessionKeyError::KeyTooShort`] for key files under
/// [`SESSION_KEY_MIN_LEN`] bytes and [`SessionKeyError::KeyRead`] when the
/// file cannot be read and ephemeral keys are not allowed.
pub fn load_session_key(path: &Path, allow_ephemeral: bool) -> Result<Key, SessionKeyError> {
    match read_key_bytes(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionKeyError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionKeyError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}
