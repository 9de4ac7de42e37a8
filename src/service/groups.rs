use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::access::{require_admin, require_membership};
use super::discard_image;
use super::images::ImageKind;
use super::validation::{
    MAX_DESCRIPTION_LEN, MAX_GROUP_NAME_LEN, optional_ref, optional_text, required_text,
};
use crate::error::{Error, Result};
use crate::storage::{ObjectStorage, image_prefix};
use crate::store::Store;
use crate::types::{Group, GroupDetail, GroupMember, GroupWithRole, ParentSummary, Role, User};

/// Editable group fields. Updates replace all of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub parent_group_id: Option<String>,
}

struct ValidGroupInput {
    name: String,
    description: Option<String>,
    logo_url: Option<String>,
    parent_group_id: Option<String>,
}

impl GroupInput {
    fn validate(&self) -> Result<ValidGroupInput> {
        Ok(ValidGroupInput {
            name: required_text(&self.name, "Name", MAX_GROUP_NAME_LEN)?,
            description: optional_text(
                self.description.as_deref(),
                "Description",
                MAX_DESCRIPTION_LEN,
            )?,
            logo_url: optional_ref(self.logo_url.as_deref()),
            parent_group_id: optional_ref(self.parent_group_id.as_deref()),
        })
    }
}

/// A group can only be nested under a group the caller belongs to. Missing
/// and foreign parents are reported the same way.
fn check_parent(store: &dyn Store, parent_id: &str, user_id: &str) -> Result<()> {
    store
        .get_group_for_member(parent_id, user_id)?
        .map(|_| ())
        .ok_or_else(|| Error::validation("Parent group not found"))
}

/// Creates a group with the caller as its first admin.
pub fn create_group(store: &dyn Store, user: &User, input: &GroupInput) -> Result<Group> {
    let input = input.validate()?;

    if let Some(parent_id) = &input.parent_group_id {
        check_parent(store, parent_id, &user.id)?;
    }

    let now = Utc::now();
    let group = Group {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        description: input.description,
        logo_url: input.logo_url,
        parent_group_id: input.parent_group_id,
        created_at: now,
        updated_at: now,
    };

    store.create_group_with_admin(&group, &user.id)?;
    tracing::info!(group_id = %group.id, user_id = %user.id, "Created group");

    Ok(group)
}

/// Full view of a group for one of its members.
pub fn get_group(store: &dyn Store, user: &User, group_id: &str) -> Result<GroupDetail> {
    let group = store
        .get_group_for_member(group_id, &user.id)?
        .ok_or(Error::NotFound)?;
    let member = require_membership(store, group_id, &user.id)?;

    let parent = match &group.parent_group_id {
        Some(parent_id) => store.get_group(parent_id)?.map(|p| ParentSummary {
            id: p.id,
            name: p.name,
            logo_url: p.logo_url,
        }),
        None => None,
    };

    Ok(GroupDetail {
        role: member.role,
        parent,
        children: store.list_child_groups(group_id)?,
        members: store.list_members(group_id)?,
        pages: store.list_page_summaries(group_id)?,
        group,
    })
}

pub fn update_group(
    store: &dyn Store,
    user: &User,
    group_id: &str,
    input: &GroupInput,
) -> Result<Group> {
    require_admin(store, group_id, &user.id)?;
    let input = input.validate()?;

    let mut group = store.get_group(group_id)?.ok_or(Error::NotFound)?;

    if let Some(parent_id) = &input.parent_group_id {
        if parent_id == group_id {
            return Err(Error::validation("A group cannot be its own parent"));
        }
        if group.parent_group_id.as_ref() != Some(parent_id) {
            check_parent(store, parent_id, &user.id)?;
        }
    }

    group.name = input.name;
    group.description = input.description;
    group.logo_url = input.logo_url;
    group.parent_group_id = input.parent_group_id;
    group.updated_at = Utc::now();

    store.update_group(&group)?;
    Ok(group)
}

/// Deletes a group along with its pages and memberships. Child groups
/// become roots.
pub async fn delete_group(
    store: &dyn Store,
    storage: Option<&dyn ObjectStorage>,
    user: &User,
    group_id: &str,
) -> Result<()> {
    require_admin(store, group_id, &user.id)?;

    let group = store.get_group(group_id)?.ok_or(Error::NotFound)?;
    if !store.delete_group(group_id)? {
        return Err(Error::NotFound);
    }
    tracing::info!(group_id, user_id = %user.id, "Deleted group");

    let prefix = image_prefix(ImageKind::Group.as_str(), &group.id);
    discard_image(storage, group.logo_url.as_deref(), &prefix).await;
    Ok(())
}

/// Adds an existing user as a plain member.
pub fn add_member(
    store: &dyn Store,
    user: &User,
    group_id: &str,
    target_user_id: &str,
) -> Result<GroupMember> {
    require_admin(store, group_id, &user.id)?;

    if store.get_user(target_user_id)?.is_none() {
        return Err(Error::NotFound);
    }

    let member = GroupMember {
        user_id: target_user_id.to_string(),
        group_id: group_id.to_string(),
        role: Role::Member,
        created_at: Utc::now(),
    };
    store.add_member(&member)?;

    Ok(member)
}

/// Removes a membership. Removing the group's only admin, the caller
/// included, fails with `LastAdminGuard`.
pub fn remove_member(
    store: &dyn Store,
    user: &User,
    group_id: &str,
    target_user_id: &str,
) -> Result<()> {
    require_admin(store, group_id, &user.id)?;

    if !store.remove_member(group_id, target_user_id)? {
        return Err(Error::NotFound);
    }
    Ok(())
}

pub fn set_member_role(
    store: &dyn Store,
    user: &User,
    group_id: &str,
    target_user_id: &str,
    role: Role,
) -> Result<GroupMember> {
    require_admin(store, group_id, &user.id)?;

    store.set_member_role(group_id, target_user_id, role)?;
    store
        .get_member(group_id, target_user_id)?
        .ok_or(Error::NotFound)
}

/// Removes the caller's own membership.
pub fn leave_group(store: &dyn Store, user: &User, group_id: &str) -> Result<()> {
    require_membership(store, group_id, &user.id)?;

    if !store.remove_member(group_id, &user.id)? {
        return Err(Error::NotAMember);
    }
    Ok(())
}

pub fn set_group_logo(
    store: &dyn Store,
    user: &User,
    group_id: &str,
    logo_url: Option<&str>,
) -> Result<Group> {
    require_admin(store, group_id, &user.id)?;

    store.set_group_logo(group_id, optional_ref(logo_url).as_deref())?;
    store.get_group(group_id)?.ok_or(Error::NotFound)
}

pub fn list_groups_for_user(store: &dyn Store, user: &User) -> Result<Vec<GroupWithRole>> {
    store.list_groups_for_user(&user.id)
}
