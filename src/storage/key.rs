use chrono::Utc;
use rand::Rng;

use super::StorageError;

/// Longest sanitized name kept in a key; longer names are cut before the
/// extension so the key stays within filesystem name limits.
const MAX_FILENAME_LEN: usize = 100;

/// Extensions longer than this are treated as part of the stem when cutting.
const MAX_EXTENSION_LEN: usize = 16;

/// Replaces every character outside `[A-Za-z0-9._-]` with `_` and caps the
/// result at 100 characters, keeping a short extension intact.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        return "file".to_string();
    }
    if sanitized.len() <= MAX_FILENAME_LEN {
        return sanitized;
    }

    // Only ASCII survives the mapping above, so byte slicing is safe.
    match sanitized.rfind('.') {
        Some(dot) if dot > 0 && sanitized.len() - dot <= MAX_EXTENSION_LEN => {
            let ext = &sanitized[dot..];
            format!("{}{}", &sanitized[..MAX_FILENAME_LEN - ext.len()], ext)
        }
        _ => sanitized[..MAX_FILENAME_LEN].to_string(),
    }
}

/// Millisecond timestamp followed by three random digits, so two uploads of
/// the same name in the same millisecond still get distinct keys.
fn unique_stamp() -> String {
    let millis = Utc::now().timestamp_millis();
    let salt: u16 = rand::thread_rng().gen_range(0..1000);
    format!("{millis}{salt:03}")
}

#[must_use]
pub fn upload_prefix(user_id: &str) -> String {
    format!("uploads/{user_id}/")
}

/// `uploads/<user_id>/<digits>-<sanitized name>`
#[must_use]
pub fn upload_key(user_id: &str, filename: &str) -> String {
    format!(
        "{}{}-{}",
        upload_prefix(user_id),
        unique_stamp(),
        sanitize_filename(filename)
    )
}

#[must_use]
pub fn image_prefix(kind: &str, identifier: &str) -> String {
    format!("images/{kind}/{identifier}/")
}

/// `images/<kind>/<identifier>/<digits>-<sanitized name>`
#[must_use]
pub fn image_key(kind: &str, identifier: &str, filename: &str) -> String {
    format!(
        "{}{}-{}",
        image_prefix(kind, identifier),
        unique_stamp(),
        sanitize_filename(filename)
    )
}

#[must_use]
pub fn is_owned_upload_key(user_id: &str, key: &str) -> bool {
    key.strip_prefix(&upload_prefix(user_id))
        .is_some_and(|rest| !rest.is_empty())
}

pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.starts_with('/') {
        return Err(StorageError::InvalidKey);
    }

    if key.chars().any(|c| c == '\\' || c.is_control()) {
        return Err(StorageError::InvalidKey);
    }

    if key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(StorageError::InvalidKey);
    }

    Ok(())
}
