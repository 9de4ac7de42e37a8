//! Object storage gateway.
//!
//! Storage is an opaque bucket addressed by string keys. Nothing here
//! authorizes callers; that happens in `service` before a key is touched.

mod key;
mod local;
mod signing;

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use key::{
    image_key, image_prefix, is_owned_upload_key, sanitize_filename, upload_key, upload_prefix,
    validate_key,
};
pub use local::LocalStorage;
pub use signing::{SignedMethod, UrlSigner};

/// Lifetime of presigned upload and download URLs.
pub const PRESIGN_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found")]
    NotFound,
    #[error("invalid storage key")]
    InvalidKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("signed url has expired")]
    Expired,
    #[error("signing key must not be empty")]
    InvalidSigningKey,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    fn from_io(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str)
    -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<String, StorageError>;

    async fn presign_download(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;

    /// URL under which a stored object is readable: the configured public
    /// base when there is one, the `/files/` proxy route otherwise.
    fn public_url(&self, key: &str) -> String;

    /// Recovers the key from a URL previously produced by `public_url`.
    /// Returns `None` for URLs that point somewhere else.
    fn key_for_url(&self, url: &str) -> Option<String> {
        let prefix = self.public_url("");
        let rest = url.strip_prefix(prefix.as_str())?;
        let key = urlencoding::decode(rest).ok()?.into_owned();
        validate_key(&key).ok()?;
        Some(key)
    }
}

/// Joins a base URL and a key, percent-encoding each key segment.
pub(crate) fn join_key(base: &str, key: &str) -> String {
    let encoded: Vec<_> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}", base.trim_end_matches('/'), encoded.join("/"))
}
