pub const SCHEMA: &str = r#"
-- Local accounts, one per identity-provider subject
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    external_id TEXT NOT NULL UNIQUE,
    email TEXT,
    name TEXT,
    phone TEXT,
    profile_image_url TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Groups form a tree; deleting a parent turns its children into roots
CREATE TABLE IF NOT EXISTS org_groups (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    logo_url TEXT,
    parent_group_id TEXT REFERENCES org_groups(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Membership edges between users and groups
CREATE TABLE IF NOT EXISTS group_members (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    group_id TEXT NOT NULL REFERENCES org_groups(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK (role IN ('admin', 'member')),
    created_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (user_id, group_id)
);

-- Pages belong to exactly one group
CREATE TABLE IF NOT EXISTS pages (
    id TEXT PRIMARY KEY,
    group_id TEXT NOT NULL REFERENCES org_groups(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    cover_photo_url TEXT,

    -- Display fields copied from the hierarchy on write
    parent_group_logo_url TEXT,
    child_group_logo_url TEXT,

    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Uploaded objects owned by a user
CREATE TABLE IF NOT EXISTS files (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    size INTEGER NOT NULL,
    mime_type TEXT NOT NULL,
    storage_key TEXT NOT NULL UNIQUE,
    url TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_groups_parent ON org_groups(parent_group_id);
CREATE INDEX IF NOT EXISTS idx_group_members_group ON group_members(group_id, role);
CREATE INDEX IF NOT EXISTS idx_pages_group ON pages(group_id, updated_at);
CREATE INDEX IF NOT EXISTS idx_files_user ON files(user_id, created_at);
"#;
