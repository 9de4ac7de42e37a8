use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{
    ObjectStorage, SignedMethod, StorageError, StoredObject, UrlSigner, join_key, validate_key,
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A bucket on the local filesystem.
///
/// Object bytes live under `objects/data/<key>`, their content type under
/// `objects/meta/<key>`. Presigned URLs point back at this server's `/storage/` route.
pub struct LocalStorage {
    base_path: PathBuf,
    signer: UrlSigner,
    public_base_url: Option<String>,
}

impl LocalStorage {
    pub fn new(data_dir: &Path, signer: UrlSigner, public_base_url: Option<String>) -> Self {
        Self {
            base_path: data_dir.join("objects"),
            signer,
            public_base_url: public_base_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_path.join("data").join(key)
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.base_path.join("meta").join(key)
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path.join("tmp").join(Uuid::new_v4().to_string())
    }

    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut temp_file = File::create(&temp_path).await?;
        temp_file.write_all(data).await?;
        temp_file.sync_all().await?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::rename(&temp_path, path).await?;
        Ok(())
    }
}

async fn remove_if_present(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::Io(e)),
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        validate_key(key)?;

        self.write_atomic(&self.object_path(key), &bytes).await?;
        self.write_atomic(&self.meta_path(key), content_type.as_bytes())
            .await?;

        tracing::debug!(key, size = bytes.len(), "stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        validate_key(key)?;

        let data = fs::read(self.object_path(key))
            .await
            .map_err(StorageError::from_io)?;

        let content_type = match fs::read_to_string(self.meta_path(key)).await {
            Ok(ct) if !ct.is_empty() => ct,
            Ok(_) => DEFAULT_CONTENT_TYPE.to_string(),
            Err(e) if e.kind() == ErrorKind::NotFound => DEFAULT_CONTENT_TYPE.to_string(),
            Err(e) => return Err(StorageError::Io(e)),
        };

        Ok(StoredObject {
            bytes: Bytes::from(data),
            content_type,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        remove_if_present(&self.object_path(key)).await?;
        remove_if_present(&self.meta_path(key)).await?;
        Ok(())
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        validate_key(key)?;
        Ok(self
            .signer
            .signed_url(SignedMethod::Put, key, content_type, ttl))
    }

    async fn presign_download(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        validate_key(key)?;
        Ok(self.signer.signed_url(SignedMethod::Get, key, "", ttl))
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => join_key(base, key),
            None => join_key("/files", key),
        }
    }
}
