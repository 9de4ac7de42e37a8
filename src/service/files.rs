use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::validate_upload;
use crate::error::{Error, Result};
use crate::storage::{ObjectStorage, PRESIGN_TTL, is_owned_upload_key, upload_key, validate_key};
use crate::store::Store;
use crate::types::{FileRecord, User};

/// An upload received in full by the server.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Bytes,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresignedUpload {
    pub upload_url: String,
    pub key: String,
}

/// Metadata a client reports after uploading to a presigned URL.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmUpload {
    pub key: String,
    pub name: String,
    pub size: i64,
    pub mime_type: String,
}

fn display_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

fn require_storage(storage: Option<&dyn ObjectStorage>) -> Result<&dyn ObjectStorage> {
    storage.ok_or(Error::StorageUnconfigured)
}

/// Stores the bytes under a fresh key in the caller's namespace and records
/// the file.
pub async fn register_upload(
    store: &dyn Store,
    storage: Option<&dyn ObjectStorage>,
    user: &User,
    upload: Upload,
) -> Result<FileRecord> {
    validate_upload(upload.bytes.len(), &upload.mime_type)?;
    let storage = require_storage(storage)?;

    let key = upload_key(&user.id, &upload.name);
    let size = upload.bytes.len() as i64;
    storage.put(&key, upload.bytes, &upload.mime_type).await?;

    let record = FileRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        name: display_name(&upload.name),
        size,
        mime_type: upload.mime_type,
        url: storage.public_url(&key),
        key,
        created_at: Utc::now(),
    };

    if let Err(e) = store.create_file(&record) {
        if let Err(cleanup) = storage.delete(&record.key).await {
            tracing::warn!(key = %record.key, "Failed to remove unrecorded upload: {}", cleanup);
        }
        return Err(e);
    }

    tracing::info!(file_id = %record.id, user_id = %user.id, size, "Registered upload");
    Ok(record)
}

/// Issues a short-lived URL the client can PUT the file to directly.
pub async fn presign_upload(
    storage: Option<&dyn ObjectStorage>,
    user: &User,
    name: &str,
    size: i64,
    mime_type: &str,
) -> Result<PresignedUpload> {
    validate_upload(usize::try_from(size).unwrap_or(0), mime_type)?;
    let storage = require_storage(storage)?;

    let key = upload_key(&user.id, name);
    let upload_url = storage.presign_upload(&key, mime_type, PRESIGN_TTL).await?;

    Ok(PresignedUpload { upload_url, key })
}

/// Records a file the client uploaded through a presigned URL. The key must
/// sit in the caller's own upload namespace.
pub async fn confirm_upload(
    store: &dyn Store,
    storage: Option<&dyn ObjectStorage>,
    user: &User,
    confirm: ConfirmUpload,
) -> Result<FileRecord> {
    if !is_owned_upload_key(&user.id, &confirm.key) || validate_key(&confirm.key).is_err() {
        return Err(Error::KeyMismatch);
    }
    validate_upload(usize::try_from(confirm.size).unwrap_or(0), &confirm.mime_type)?;
    let storage = require_storage(storage)?;

    let record = FileRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        name: display_name(&confirm.name),
        size: confirm.size,
        mime_type: confirm.mime_type,
        url: storage.public_url(&confirm.key),
        key: confirm.key,
        created_at: Utc::now(),
    };
    store.create_file(&record)?;

    Ok(record)
}

/// The caller's files, newest first.
pub fn list_files(store: &dyn Store, user: &User) -> Result<Vec<FileRecord>> {
    store.list_user_files(&user.id)
}

/// Deletes the object, then the record. If storage refuses, the record is
/// kept so the delete can be retried.
pub async fn delete_file(
    store: &dyn Store,
    storage: Option<&dyn ObjectStorage>,
    user: &User,
    file_id: &str,
) -> Result<()> {
    let record = store
        .get_user_file(&user.id, file_id)?
        .ok_or(Error::NotFound)?;
    let storage = require_storage(storage)?;

    storage.delete(&record.key).await?;
    store.delete_file(&record.id)?;

    tracing::info!(file_id, user_id = %user.id, "Deleted file");
    Ok(())
}

/// A short-lived download URL for one of the caller's files.
pub async fn file_download_url(
    store: &dyn Store,
    storage: Option<&dyn ObjectStorage>,
    user: &User,
    key: &str,
) -> Result<String> {
    let record = store
        .get_user_file_by_key(&user.id, key)?
        .ok_or(Error::NotFound)?;
    let storage = require_storage(storage)?;

    Ok(storage.presign_download(&record.key, PRESIGN_TTL).await?)
}
