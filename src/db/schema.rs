//! Database schema and migrations for cabinet.
//!
//! Migrations are applied sequentially when the database is opened; the
//! schema_version table tracks which have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users table
    r#"
-- Users table for authentication and record ownership
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password    TEXT NOT NULL,           -- Argon2 hash
    email       TEXT,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX idx_users_username ON users(username);
"#,
    // v2: file_records table - one row per file or folder
    r#"
-- File/folder metadata. parent_id is NULL only for a user's root folder.
-- ON DELETE CASCADE makes folder deletion remove the whole subtree.
CREATE TABLE file_records (
    id          TEXT PRIMARY KEY,        -- opaque UUID
    owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    parent_id   TEXT REFERENCES file_records(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    kind        TEXT NOT NULL CHECK (kind IN ('file', 'folder')),
    size        INTEGER NOT NULL DEFAULT 0,
    stored_name TEXT,                    -- blob storage handle, files only
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    modified_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_file_records_owner ON file_records(owner_id);
CREATE INDEX idx_file_records_parent ON file_records(parent_id);

-- Exactly one root per user
CREATE UNIQUE INDEX idx_file_records_root
    ON file_records(owner_id) WHERE parent_id IS NULL;

-- Sibling names are unique under a parent, case-insensitively
CREATE UNIQUE INDEX idx_file_records_sibling_name
    ON file_records(owner_id, parent_id, name COLLATE NOCASE)
    WHERE parent_id IS NOT NULL;
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_users_table() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE users"));
        assert!(first.contains("username"));
        assert!(first.contains("password"));
    }

    #[test]
    fn test_records_migration_contains_invariant_indexes() {
        let records = MIGRATIONS[1];
        assert!(records.contains("CREATE TABLE file_records"));
        assert!(records.contains("idx_file_records_root"));
        assert!(records.contains("idx_file_records_sibling_name"));
        assert!(records.contains("ON DELETE CASCADE"));
    }

    #[test]
    fn test_migrations_are_valid_sql() {
        for migration in MIGRATIONS {
            assert!(!migration.trim().is_empty());
            assert!(
                migration.contains("CREATE TABLE")
                    || migration.contains("ALTER TABLE")
                    || migration.contains("CREATE INDEX")
            );
        }
    }
}
