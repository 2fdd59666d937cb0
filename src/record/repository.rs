//! Record repository for cabinet.
//!
//! All queries are owner-scoped: a record ID only resolves together with
//! the requesting owner, so one user's IDs are invisible to another.

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::{CabinetError, Result};

use super::model::{FileRecord, NewRecord};
use super::ROOT_NAME;

const RECORD_COLUMNS: &str =
    "id, owner_id, parent_id, name, kind, size, stored_name, created_at, modified_at";

/// Repository for file record operations.
pub struct RecordRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RecordRepository<'a> {
    /// Create a new RecordRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new record and return the stored row.
    pub async fn create(&self, record: &NewRecord) -> Result<FileRecord> {
        sqlx::query(
            "INSERT INTO file_records (id, owner_id, parent_id, name, kind, size, stored_name)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(record.owner_id)
        .bind(&record.parent_id)
        .bind(&record.name)
        .bind(record.kind.as_str())
        .bind(record.size)
        .bind(&record.stored_name)
        .execute(self.pool)
        .await?;

        self.get_by_id(&record.id)
            .await?
            .ok_or_else(|| CabinetError::NotFound(format!("record: {}", record.id)))
    }

    /// Get a record by ID regardless of owner.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_records WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Resolve a record ID for a specific owner.
    ///
    /// Returns `None` both when the ID does not exist and when it belongs
    /// to a different owner.
    pub async fn resolve(&self, owner_id: i64, id: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_records WHERE id = ? AND owner_id = ?"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Get the owner's root folder, if it exists.
    pub async fn root(&self, owner_id: i64) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_records
             WHERE owner_id = ? AND parent_id IS NULL"
        ))
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Create the owner's root folder.
    pub async fn create_root(&self, owner_id: i64) -> Result<FileRecord> {
        self.create(&NewRecord::root(owner_id, ROOT_NAME)).await
    }

    /// List every record of one owner, in deterministic order.
    pub async fn list_owned(&self, owner_id: i64) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_records WHERE owner_id = ?
             ORDER BY LOWER(name), created_at, id"
        ))
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// List direct children of a folder, in deterministic order.
    pub async fn list_children(&self, owner_id: i64, parent_id: &str) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_records
             WHERE owner_id = ? AND parent_id = ?
             ORDER BY LOWER(name), created_at, id"
        ))
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Look up a direct child of a folder by name (case-insensitive).
    pub async fn child_named(
        &self,
        owner_id: i64,
        parent_id: &str,
        name: &str,
    ) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_records
             WHERE owner_id = ? AND parent_id = ? AND name = ? COLLATE NOCASE"
        ))
        .bind(owner_id)
        .bind(parent_id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Rename a record, bumping its modification time.
    ///
    /// Returns `false` when no row matched.
    pub async fn rename(&self, id: &str, name: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE file_records SET name = ?, modified_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(name)
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Move a record under a new parent inside an open transaction.
    pub async fn reparent(
        tx: &mut Transaction<'_, Sqlite>,
        id: &str,
        new_parent_id: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE file_records SET parent_id = ?, modified_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(new_parent_id)
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Delete a record.
    ///
    /// Descendants go with it through the foreign key cascade. Returns
    /// `false` when no row matched.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM file_records WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Collect a record and all its descendants. Order is unspecified;
    /// callers treat the result as a set.
    pub async fn collect_subtree(&self, owner_id: i64, id: &str) -> Result<Vec<FileRecord>> {
        let mut collected = Vec::new();
        let Some(top) = self.resolve(owner_id, id).await? else {
            return Ok(collected);
        };

        let mut queue = vec![top];
        while let Some(record) = queue.pop() {
            if record.is_folder() {
                let children = self.list_children(owner_id, &record.id).await?;
                queue.extend(children);
            }
            collected.push(record);
        }

        Ok(collected)
    }

    /// Collect the IDs of a record's ancestors, nearest first.
    pub async fn ancestors(&self, owner_id: i64, id: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        let mut current = self
            .resolve(owner_id, id)
            .await?
            .and_then(|r| r.parent_id);

        while let Some(parent_id) = current {
            let Some(parent) = self.resolve(owner_id, &parent_id).await? else {
                break;
            };
            chain.push(parent.id.clone());
            current = parent.parent_id;
        }

        Ok(chain)
    }

    /// Count direct children of a folder.
    pub async fn count_children(&self, owner_id: i64, parent_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM file_records WHERE owner_id = ? AND parent_id = ?",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
