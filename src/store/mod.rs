mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Membership-scoped reads (`*_for_member`) fold the membership check into the
/// query itself, so a non-member gets the same answer as for a missing row.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>>;
    fn update_user(&self, user: &User) -> Result<()>;

    // Group operations
    /// Inserts the group and an admin membership for `admin_user_id` atomically.
    fn create_group_with_admin(&self, group: &Group, admin_user_id: &str) -> Result<()>;
    fn get_group(&self, id: &str) -> Result<Option<Group>>;
    fn get_group_for_member(&self, id: &str, user_id: &str) -> Result<Option<Group>>;
    /// Fails with a validation error if the new parent would introduce a cycle.
    fn update_group(&self, group: &Group) -> Result<()>;
    fn delete_group(&self, id: &str) -> Result<bool>;
    fn set_group_logo(&self, id: &str, logo_url: Option<&str>) -> Result<()>;
    fn list_child_groups(&self, id: &str) -> Result<Vec<ChildGroupSummary>>;
    fn list_groups_for_user(&self, user_id: &str) -> Result<Vec<GroupWithRole>>;

    // Membership operations
    fn get_member(&self, group_id: &str, user_id: &str) -> Result<Option<GroupMember>>;
    fn add_member(&self, member: &GroupMember) -> Result<()>;
    fn list_members(&self, group_id: &str) -> Result<Vec<MemberWithUser>>;
    fn count_admins(&self, group_id: &str) -> Result<i64>;
    /// Deletes a membership. Removing an admin fails with `LastAdminGuard` when
    /// no other admin would remain; the count and delete share one transaction.
    fn remove_member(&self, group_id: &str, user_id: &str) -> Result<bool>;
    /// Changes a role under the same last-admin guard as `remove_member`.
    fn set_member_role(&self, group_id: &str, user_id: &str, role: Role) -> Result<()>;

    // Page operations
    fn create_page(&self, page: &Page) -> Result<()>;
    fn get_page(&self, id: &str) -> Result<Option<Page>>;
    fn get_page_for_member(&self, id: &str, user_id: &str) -> Result<Option<Page>>;
    fn list_pages_for_member(&self, group_id: &str, user_id: &str) -> Result<Vec<Page>>;
    fn list_page_summaries(&self, group_id: &str) -> Result<Vec<PageSummary>>;
    fn update_page(&self, page: &Page) -> Result<()>;
    fn delete_page(&self, id: &str) -> Result<bool>;
    fn set_page_cover(&self, id: &str, cover_photo_url: Option<&str>) -> Result<()>;
    /// Returns the (parent logo, first child logo) pair shown on a group's pages.
    fn page_logos(&self, group_id: &str) -> Result<(Option<String>, Option<String>)>;

    // File operations
    fn create_file(&self, file: &FileRecord) -> Result<()>;
    fn get_user_file(&self, user_id: &str, id: &str) -> Result<Option<FileRecord>>;
    fn get_user_file_by_key(&self, user_id: &str, key: &str) -> Result<Option<FileRecord>>;
    fn list_user_files(&self, user_id: &str) -> Result<Vec<FileRecord>>;
    fn delete_file(&self, id: &str) -> Result<bool>;

    fn close(&self) -> Result<()>;
}
