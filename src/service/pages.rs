use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::access::require_admin;
use super::discard_image;
use super::images::ImageKind;
use super::validation::{
    MAX_DESCRIPTION_LEN, MAX_PAGE_TITLE_LEN, optional_ref, optional_text, required_text,
};
use crate::error::{Error, Result};
use crate::storage::{ObjectStorage, image_prefix};
use crate::store::Store;
use crate::types::{Page, User};

/// Editable page fields. Updates replace all of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_photo_url: Option<String>,
}

pub fn create_page(
    store: &dyn Store,
    user: &User,
    group_id: &str,
    input: &PageInput,
) -> Result<Page> {
    require_admin(store, group_id, &user.id)?;

    let title = required_text(&input.title, "Title", MAX_PAGE_TITLE_LEN)?;
    let description = optional_text(
        input.description.as_deref(),
        "Description",
        MAX_DESCRIPTION_LEN,
    )?;
    let (parent_group_logo_url, child_group_logo_url) = store.page_logos(group_id)?;

    let now = Utc::now();
    let page = Page {
        id: Uuid::new_v4().to_string(),
        group_id: group_id.to_string(),
        title,
        description,
        cover_photo_url: optional_ref(input.cover_photo_url.as_deref()),
        parent_group_logo_url,
        child_group_logo_url,
        created_at: now,
        updated_at: now,
    };

    store.create_page(&page)?;
    tracing::info!(page_id = %page.id, group_id, "Created page");

    Ok(page)
}

/// A page, visible only to members of its group.
pub fn get_page(store: &dyn Store, user: &User, page_id: &str) -> Result<Page> {
    store
        .get_page_for_member(page_id, &user.id)?
        .ok_or(Error::NotFound)
}

/// Pages of a group, most recently updated first.
pub fn list_pages(store: &dyn Store, user: &User, group_id: &str) -> Result<Vec<Page>> {
    if store.get_group_for_member(group_id, &user.id)?.is_none() {
        return Err(Error::NotFound);
    }
    store.list_pages_for_member(group_id, &user.id)
}

/// Loads a page and checks the caller administers its group.
fn admin_page(store: &dyn Store, user: &User, page_id: &str) -> Result<Page> {
    let page = store.get_page(page_id)?.ok_or(Error::NotFound)?;
    require_admin(store, &page.group_id, &user.id)?;
    Ok(page)
}

pub fn update_page(
    store: &dyn Store,
    user: &User,
    page_id: &str,
    input: &PageInput,
) -> Result<Page> {
    let mut page = admin_page(store, user, page_id)?;

    page.title = required_text(&input.title, "Title", MAX_PAGE_TITLE_LEN)?;
    page.description = optional_text(
        input.description.as_deref(),
        "Description",
        MAX_DESCRIPTION_LEN,
    )?;
    page.cover_photo_url = optional_ref(input.cover_photo_url.as_deref());

    let (parent_logo, child_logo) = store.page_logos(&page.group_id)?;
    page.parent_group_logo_url = parent_logo;
    page.child_group_logo_url = child_logo;
    page.updated_at = Utc::now();

    store.update_page(&page)?;
    Ok(page)
}

pub async fn delete_page(
    store: &dyn Store,
    storage: Option<&dyn ObjectStorage>,
    user: &User,
    page_id: &str,
) -> Result<()> {
    let page = admin_page(store, user, page_id)?;

    if !store.delete_page(&page.id)? {
        return Err(Error::NotFound);
    }
    tracing::info!(page_id, group_id = %page.group_id, "Deleted page");

    let prefix = image_prefix(ImageKind::Page.as_str(), &page.id);
    discard_image(storage, page.cover_photo_url.as_deref(), &prefix).await;
    Ok(())
}

pub fn set_page_cover(
    store: &dyn Store,
    user: &User,
    page_id: &str,
    cover_photo_url: Option<&str>,
) -> Result<Page> {
    admin_page(store, user, page_id)?;

    store.set_page_cover(page_id, optional_ref(cover_photo_url).as_deref())?;
    store.get_page(page_id)?.ok_or(Error::NotFound)
}
