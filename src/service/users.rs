use chrono::Utc;
use serde::Deserialize;

use super::discard_image;
use super::images::ImageKind;
use super::validation::{optional_email, optional_ref};
use crate::error::Result;
use crate::storage::{ObjectStorage, image_prefix};
use crate::store::Store;
use crate::types::User;

/// Profile changes. Absent fields stay as they are; an empty string clears.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

pub async fn update_profile(
    store: &dyn Store,
    storage: Option<&dyn ObjectStorage>,
    user: &User,
    update: &ProfileUpdate,
) -> Result<User> {
    let mut updated = user.clone();

    if let Some(email) = &update.email {
        updated.email = optional_email(Some(email))?;
    }

    let mut replaced_image = None;
    if let Some(url) = &update.profile_image_url {
        updated.profile_image_url = optional_ref(Some(url));
        if updated.profile_image_url != user.profile_image_url {
            replaced_image = user.profile_image_url.clone();
        }
    }

    updated.updated_at = Utc::now();
    store.update_user(&updated)?;

    if let Some(old_url) = replaced_image {
        let prefix = image_prefix(ImageKind::Profile.as_str(), &user.id);
        discard_image(storage, Some(&old_url), &prefix).await;
    }

    Ok(updated)
}

