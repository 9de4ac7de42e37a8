use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

const USER_COLUMNS: &str =
    "u.id, u.external_id, u.email, u.name, u.phone, u.profile_image_url, u.created_at, u.updated_at";

const GROUP_COLUMNS: &str =
    "g.id, g.name, g.description, g.logo_url, g.parent_group_id, g.created_at, g.updated_at";

const PAGE_COLUMNS: &str = "p.id, p.group_id, p.title, p.description, p.cover_photo_url, \
     p.parent_group_logo_url, p.child_group_logo_url, p.created_at, p.updated_at";

const FILE_COLUMNS: &str =
    "f.id, f.user_id, f.name, f.size, f.mime_type, f.storage_key, f.url, f.created_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

/// Fixed-width so that `ORDER BY` on the text column matches time order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        external_id: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        phone: row.get(4)?,
        profile_image_url: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        updated_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        logo_url: row.get(3)?,
        parent_group_id: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        group_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        cover_photo_url: row.get(4)?,
        parent_group_logo_url: row.get(5)?,
        child_group_logo_url: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        size: row.get(3)?,
        mime_type: row.get(4)?,
        key: row.get(5)?,
        url: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

/// Fails with `LastAdminGuard` unless the group has an admin besides the one
/// about to be removed or demoted.
fn ensure_other_admin(tx: &Transaction<'_>, group_id: &str) -> Result<()> {
    let admins: i64 = tx.query_row(
        "SELECT COUNT(*) FROM group_members WHERE group_id = ?1 AND role = 'admin'",
        params![group_id],
        |row| row.get(0),
    )?;
    if admins <= 1 {
        return Err(Error::LastAdminGuard);
    }
    Ok(())
}

fn current_role(tx: &Transaction<'_>, group_id: &str, user_id: &str) -> Result<Option<Role>> {
    tx.query_row(
        "SELECT role FROM group_members WHERE group_id = ?1 AND user_id = ?2",
        params![group_id, user_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(Error::from)
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (id, external_id, email, name, phone, profile_image_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.id,
                user.external_id,
                user.email,
                user.name,
                user.phone,
                user.profile_image_url,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => {
                Err(Error::Conflict("user already exists".to_string()))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.external_id = ?1"),
            params![external_id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET email = ?1, name = ?2, phone = ?3, profile_image_url = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                user.email,
                user.name,
                user.phone,
                user.profile_image_url,
                format_datetime(&user.updated_at),
                user.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Group operations

    fn create_group_with_admin(&self, group: &Group, admin_user_id: &str) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO org_groups (id, name, description, logo_url, parent_group_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                group.id,
                group.name,
                group.description,
                group.logo_url,
                group.parent_group_id,
                format_datetime(&group.created_at),
                format_datetime(&group.updated_at),
            ],
        )?;

        tx.execute(
            "INSERT INTO group_members (user_id, group_id, role, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                admin_user_id,
                group.id,
                Role::Admin,
                format_datetime(&group.created_at)
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get_group(&self, id: &str) -> Result<Option<Group>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {GROUP_COLUMNS} FROM org_groups g WHERE g.id = ?1"),
            params![id],
            group_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_group_for_member(&self, id: &str, user_id: &str) -> Result<Option<Group>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {GROUP_COLUMNS} FROM org_groups g
                 JOIN group_members m ON m.group_id = g.id AND m.user_id = ?2
                 WHERE g.id = ?1"
            ),
            params![id, user_id],
            group_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_group(&self, group: &Group) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(parent_id) = &group.parent_group_id {
            if parent_id == &group.id {
                return Err(Error::validation("A group cannot be its own parent"));
            }

            let creates_cycle: bool = tx.query_row(
                "WITH RECURSIVE ancestors(id) AS (
                     SELECT ?1
                     UNION
                     SELECT g.parent_group_id FROM org_groups g
                     JOIN ancestors a ON g.id = a.id
                     WHERE g.parent_group_id IS NOT NULL
                 )
                 SELECT EXISTS(SELECT 1 FROM ancestors WHERE id = ?2)",
                params![parent_id, group.id],
                |row| row.get(0),
            )?;

            if creates_cycle {
                return Err(Error::validation(
                    "Cannot move a group under one of its own subgroups",
                ));
            }
        }

        let result = tx.execute(
            "UPDATE org_groups SET name = ?1, description = ?2, logo_url = ?3, parent_group_id = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                group.name,
                group.description,
                group.logo_url,
                group.parent_group_id,
                format_datetime(&group.updated_at),
                group.id,
            ],
        );

        let rows = match result {
            Ok(rows) => rows,
            Err(e) if is_constraint_violation(&e) => {
                return Err(Error::validation("Parent group not found"));
            }
            Err(e) => return Err(Error::from(e)),
        };

        if rows == 0 {
            return Err(Error::NotFound);
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_group(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM org_groups WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn set_group_logo(&self, id: &str, logo_url: Option<&str>) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE org_groups SET logo_url = ?1, updated_at = ?2 WHERE id = ?3",
            params![logo_url, format_datetime(&Utc::now()), id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn list_child_groups(&self, id: &str) -> Result<Vec<ChildGroupSummary>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.logo_url,
                    (SELECT COUNT(*) FROM pages p WHERE p.group_id = c.id),
                    (SELECT COUNT(*) FROM group_members m WHERE m.group_id = c.id)
             FROM org_groups c WHERE c.parent_group_id = ?1
             ORDER BY c.created_at, c.id",
        )?;

        let rows = stmt.query_map(params![id], |row| {
            Ok(ChildGroupSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                logo_url: row.get(2)?,
                page_count: row.get(3)?,
                member_count: row.get(4)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_groups_for_user(&self, user_id: &str) -> Result<Vec<GroupWithRole>> {
        let conn = self.conn();

        // Children of every group the user belongs to, fetched in one pass.
        let mut stmt = conn.prepare(
            "SELECT c.parent_group_id, c.id, c.name, c.logo_url,
                    (SELECT COUNT(*) FROM pages p WHERE p.group_id = c.id),
                    (SELECT COUNT(*) FROM group_members m WHERE m.group_id = c.id)
             FROM org_groups c
             WHERE c.parent_group_id IN (SELECT group_id FROM group_members WHERE user_id = ?1)
             ORDER BY c.created_at, c.id",
        )?;

        let mut children: HashMap<String, Vec<ChildGroupSummary>> = HashMap::new();
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                ChildGroupSummary {
                    id: row.get(1)?,
                    name: row.get(2)?,
                    logo_url: row.get(3)?,
                    page_count: row.get(4)?,
                    member_count: row.get(5)?,
                },
            ))
        })?;
        for row in rows {
            let (parent_id, child) = row?;
            children.entry(parent_id).or_default().push(child);
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {GROUP_COLUMNS}, m.role, parent.id, parent.name, parent.logo_url,
                    (SELECT COUNT(*) FROM pages p WHERE p.group_id = g.id),
                    (SELECT COUNT(*) FROM group_members gm WHERE gm.group_id = g.id)
             FROM group_members m
             JOIN org_groups g ON g.id = m.group_id
             LEFT JOIN org_groups parent ON parent.id = g.parent_group_id
             WHERE m.user_id = ?1
             ORDER BY g.name, g.id"
        ))?;

        let rows = stmt.query_map(params![user_id], |row| {
            let group = group_from_row(row)?;
            let parent = match row.get::<_, Option<String>>(8)? {
                Some(id) => Some(ParentSummary {
                    id,
                    name: row.get(9)?,
                    logo_url: row.get(10)?,
                }),
                None => None,
            };
            Ok(GroupWithRole {
                role: row.get(7)?,
                parent,
                page_count: row.get(11)?,
                member_count: row.get(12)?,
                children: Vec::new(),
                group,
            })
        })?;

        let mut groups = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        for entry in &mut groups {
            entry.children = children.remove(&entry.group.id).unwrap_or_default();
        }
        Ok(groups)
    }

    // Membership operations

    fn get_member(&self, group_id: &str, user_id: &str) -> Result<Option<GroupMember>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT user_id, group_id, role, created_at FROM group_members
             WHERE group_id = ?1 AND user_id = ?2",
            params![group_id, user_id],
            |row| {
                Ok(GroupMember {
                    user_id: row.get(0)?,
                    group_id: row.get(1)?,
                    role: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn add_member(&self, member: &GroupMember) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO group_members (user_id, group_id, role, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                member.user_id,
                member.group_id,
                member.role,
                format_datetime(&member.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::Conflict(
                "user is already a member of this group".to_string(),
            )),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn list_members(&self, group_id: &str) -> Result<Vec<MemberWithUser>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT m.user_id, m.role, u.email, u.name, u.profile_image_url, m.created_at
             FROM group_members m JOIN users u ON u.id = m.user_id
             WHERE m.group_id = ?1
             ORDER BY m.created_at, m.user_id",
        )?;

        let rows = stmt.query_map(params![group_id], |row| {
            Ok(MemberWithUser {
                user_id: row.get(0)?,
                role: row.get(1)?,
                email: row.get(2)?,
                name: row.get(3)?,
                profile_image_url: row.get(4)?,
                joined_at: parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_admins(&self, group_id: &str) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM group_members WHERE group_id = ?1 AND role = 'admin'",
            params![group_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn remove_member(&self, group_id: &str, user_id: &str) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(role) = current_role(&tx, group_id, user_id)? else {
            return Ok(false);
        };

        if role.is_admin() {
            ensure_other_admin(&tx, group_id)?;
        }

        tx.execute(
            "DELETE FROM group_members WHERE group_id = ?1 AND user_id = ?2",
            params![group_id, user_id],
        )?;

        tx.commit()?;
        Ok(true)
    }

    fn set_member_role(&self, group_id: &str, user_id: &str, role: Role) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = current_role(&tx, group_id, user_id)?.ok_or(Error::NotFound)?;

        if current == role {
            return Ok(());
        }

        if current.is_admin() {
            ensure_other_admin(&tx, group_id)?;
        }

        tx.execute(
            "UPDATE group_members SET role = ?1 WHERE group_id = ?2 AND user_id = ?3",
            params![role, group_id, user_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    // Page operations

    fn create_page(&self, page: &Page) -> Result<()> {
        self.conn().execute(
            "INSERT INTO pages (id, group_id, title, description, cover_photo_url,
                                parent_group_logo_url, child_group_logo_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                page.id,
                page.group_id,
                page.title,
                page.description,
                page.cover_photo_url,
                page.parent_group_logo_url,
                page.child_group_logo_url,
                format_datetime(&page.created_at),
                format_datetime(&page.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_page(&self, id: &str) -> Result<Option<Page>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PAGE_COLUMNS} FROM pages p WHERE p.id = ?1"),
            params![id],
            page_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_page_for_member(&self, id: &str, user_id: &str) -> Result<Option<Page>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {PAGE_COLUMNS} FROM pages p
                 JOIN group_members m ON m.group_id = p.group_id AND m.user_id = ?2
                 WHERE p.id = ?1"
            ),
            params![id, user_id],
            page_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_pages_for_member(&self, group_id: &str, user_id: &str) -> Result<Vec<Page>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages p
             JOIN group_members m ON m.group_id = p.group_id AND m.user_id = ?2
             WHERE p.group_id = ?1
             ORDER BY p.updated_at DESC, p.id"
        ))?;

        let rows = stmt.query_map(params![group_id, user_id], page_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_page_summaries(&self, group_id: &str) -> Result<Vec<PageSummary>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, description, cover_photo_url, updated_at FROM pages
             WHERE group_id = ?1 ORDER BY updated_at DESC, id",
        )?;

        let rows = stmt.query_map(params![group_id], |row| {
            Ok(PageSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                cover_photo_url: row.get(3)?,
                updated_at: parse_datetime(&row.get::<_, String>(4)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_page(&self, page: &Page) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE pages SET title = ?1, description = ?2, cover_photo_url = ?3,
                              parent_group_logo_url = ?4, child_group_logo_url = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                page.title,
                page.description,
                page.cover_photo_url,
                page.parent_group_logo_url,
                page.child_group_logo_url,
                format_datetime(&page.updated_at),
                page.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_page(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM pages WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn set_page_cover(&self, id: &str, cover_photo_url: Option<&str>) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE pages SET cover_photo_url = ?1, updated_at = ?2 WHERE id = ?3",
            params![cover_photo_url, format_datetime(&Utc::now()), id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn page_logos(&self, group_id: &str) -> Result<(Option<String>, Option<String>)> {
        let conn = self.conn();

        let parent_logo: Option<String> = conn
            .query_row(
                "SELECT parent.logo_url FROM org_groups g
                 JOIN org_groups parent ON parent.id = g.parent_group_id
                 WHERE g.id = ?1",
                params![group_id],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        let child_logo: Option<String> = conn
            .query_row(
                "SELECT logo_url FROM org_groups WHERE parent_group_id = ?1
                 ORDER BY created_at, id LIMIT 1",
                params![group_id],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        Ok((parent_logo, child_logo))
    }

    // File operations

    fn create_file(&self, file: &FileRecord) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO files (id, user_id, name, size, mime_type, storage_key, url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                file.id,
                file.user_id,
                file.name,
                file.size,
                file.mime_type,
                file.key,
                file.url,
                format_datetime(&file.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::Conflict(
                "a file is already registered for this key".to_string(),
            )),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user_file(&self, user_id: &str, id: &str) -> Result<Option<FileRecord>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {FILE_COLUMNS} FROM files f WHERE f.id = ?1 AND f.user_id = ?2"),
            params![id, user_id],
            file_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_file_by_key(&self, user_id: &str, key: &str) -> Result<Option<FileRecord>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {FILE_COLUMNS} FROM files f WHERE f.storage_key = ?1 AND f.user_id = ?2"
            ),
            params![key, user_id],
            file_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_user_files(&self, user_id: &str) -> Result<Vec<FileRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM files f WHERE f.user_id = ?1
             ORDER BY f.created_at DESC, f.id"
        ))?;

        let rows = stmt.query_map(params![user_id], file_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_file(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM files WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn close(&self) -> Result<()> {
        self.conn()
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
