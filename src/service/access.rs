use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::GroupMember;

/// Returns the caller's membership in a group.
pub fn require_membership(store: &dyn Store, group_id: &str, user_id: &str) -> Result<GroupMember> {
    store
        .get_member(group_id, user_id)?
        .ok_or(Error::NotAMember)
}

/// Returns the caller's membership if it carries the admin role.
/// The role is always read fresh from the store.
pub fn require_admin(store: &dyn Store, group_id: &str, user_id: &str) -> Result<GroupMember> {
    let member = require_membership(store, group_id, user_id)?;
    if !member.role.is_admin() {
        return Err(Error::NotAuthorized);
    }
    Ok(member)
}
