use std::fmt;

use serde::{Deserialize, Serialize};

use super::access::require_admin;
use super::files::Upload;
use super::validation::validate_image;
use crate::error::{Error, Result};
use crate::storage::{ObjectStorage, image_key};
use crate::store::Store;
use crate::types::User;

/// What an uploaded image is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Profile,
    Group,
    Page,
}

impl ImageKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageKind::Profile => "profile",
            ImageKind::Group => "group",
            ImageKind::Page => "page",
        }
    }

    pub fn parse(s: &str) -> Option<ImageKind> {
        match s {
            "profile" => Some(ImageKind::Profile),
            "group" => Some(ImageKind::Group),
            "page" => Some(ImageKind::Page),
            _ => None,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks the caller may attach an image to `identifier`.
fn authorize(store: &dyn Store, user: &User, kind: ImageKind, identifier: &str) -> Result<()> {
    match kind {
        ImageKind::Profile => {
            if identifier != user.id {
                return Err(Error::NotAuthorized);
            }
        }
        ImageKind::Group => {
            require_admin(store, identifier, &user.id)?;
        }
        ImageKind::Page => {
            let page = store.get_page(identifier)?.ok_or(Error::NotFound)?;
            require_admin(store, &page.group_id, &user.id)?;
        }
    }
    Ok(())
}

/// Stores an image and returns the URL to reference it by. Attaching the
/// URL to its profile, group or page is a separate update.
pub async fn upload_image(
    store: &dyn Store,
    storage: Option<&dyn ObjectStorage>,
    user: &User,
    kind: ImageKind,
    identifier: &str,
    upload: Upload,
) -> Result<String> {
    authorize(store, user, kind, identifier)?;
    validate_image(upload.bytes.len(), &upload.mime_type)?;
    let storage = storage.ok_or(Error::StorageUnconfigured)?;

    let key = image_key(kind.as_str(), identifier, &upload.name);
    storage.put(&key, upload.bytes, &upload.mime_type).await?;

    Ok(storage.public_url(&key))
}
