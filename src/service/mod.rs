//! Authorization-scoped operations on groups, pages, files, and users.
//!
//! Every function takes the caller's resolved [`User`](crate::types::User)
//! and checks membership or role against the store before acting. HTTP
//! handlers in [`crate::server`] are thin wrappers over these.

pub mod access;
pub mod files;
pub mod groups;
pub mod images;
pub mod pages;
pub mod users;
pub mod validation;

use crate::storage::ObjectStorage;

/// Deletes the object behind an image URL when it lies under `owned_prefix`.
///
/// Image references are free-form, so a URL pointing at any other key (another
/// user's upload, another group's image) is left alone. Runs after the owning
/// row is gone; a failure only leaves an orphaned object behind and is logged.
pub(crate) async fn discard_image(
    storage: Option<&dyn ObjectStorage>,
    url: Option<&str>,
    owned_prefix: &str,
) {
    let (Some(storage), Some(url)) = (storage, url) else {
        return;
    };
    let Some(key) = storage.key_for_url(url) else {
        return;
    };
    if !key.starts_with(owned_prefix) {
        tracing::debug!(key = %key, "Image not owned by the deleted row; keeping it");
        return;
    }

    if let Err(e) = storage.delete(&key).await {
        tracing::warn!(key = %key, "Failed to delete image object: {}", e);
    }
}
