// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct Contacts {
    pool: SqlitePool,
}

impl Contacts {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: ContactFilter) -> Result<Vec<ContactRecord>, sqlx::Error> {
        let sql = format!(
            "\
SELECT id, file_name, etag, dirty, deleted, payload
FROM contacts
{}
ORDER BY id;",
            filter.where_clause()
        );

        sqlx::query_as(&sql).fetch_all(&self.pool).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<ContactRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, file_name, etag, dirty, deleted, payload
FROM contacts
WHERE id = ?;
";

        sqlx::query_as(SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_by_file_name(
        &self,
        file_name: &str,
    ) -> Result<Option<ContactRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, file_name, etag, dirty, deleted, payload
FROM contacts
WHERE file_name = ?;
";

        sqlx::query_as(SQL)
            .bind(file_name)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert(
        &self,
        file_name: Option<&str>,
        etag: Option<&str>,
        dirty: bool,
        payload: &str,
    ) -> Result<i64, sqlx::Error> {
        const SQL: &str = "\
INSERT INTO contacts (file_name, etag, dirty, deleted, payload)
VALUES (?, ?, ?, 0, ?);
";

        let result = sqlx::query(SQL)
            .bind(file_name)
            .bind(etag)
            .bind(dirty)
            .bind(payload)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Names a record and stores the payload carrying its new unique id.
    pub async fn assign_name(
        &self,
        id: i64,
        file_name: &str,
        payload: &str,
    ) -> Result<u64, sqlx::Error> {
        const SQL: &str = "UPDATE contacts SET file_name = ?, payload = ? WHERE id = ?;";

        let result = sqlx::query(SQL)
            .bind(file_name)
            .bind(payload)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Overwrites with remote data; the dirty flag is left as is.
    pub async fn update_remote(
        &self,
        id: i64,
        etag: &str,
        payload: &str,
    ) -> Result<u64, sqlx::Error> {
        const SQL: &str = "UPDATE contacts SET etag = ?, payload = ? WHERE id = ?;";

        let result = sqlx::query(SQL)
            .bind(etag)
            .bind(payload)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Stores a local modification.
    pub async fn update_local(&self, id: i64, payload: &str) -> Result<u64, sqlx::Error> {
        const SQL: &str = "UPDATE contacts SET payload = ?, dirty = 1 WHERE id = ? AND deleted = 0;";

        let result = sqlx::query(SQL)
            .bind(payload)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn clear_dirty(&self, id: i64, etag: Option<&str>) -> Result<u64, sqlx::Error> {
        const SQL: &str = "UPDATE contacts SET dirty = 0, etag = ? WHERE id = ?;";

        let result = sqlx::query(SQL)
            .bind(etag)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Marks a record deleted; a deleted record is never dirty.
    pub async fn mark_deleted(&self, id: i64) -> Result<u64, sqlx::Error> {
        const SQL: &str = "UPDATE contacts SET deleted = 1, dirty = 0 WHERE id = ?;";

        let result = sqlx::query(SQL).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        const SQL: &str = "DELETE FROM contacts WHERE id = ?;";

        let result = sqlx::query(SQL).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactFilter {
    All,
    Dirty,
    Deleted,
    Unnamed,
}

impl ContactFilter {
    fn where_clause(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Dirty => "WHERE dirty = 1 AND deleted = 0",
            Self::Deleted => "WHERE deleted = 1",
            Self::Unnamed => "WHERE file_name IS NULL AND deleted = 0",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactRecord {
    pub id: i64,
    pub file_name: Option<String>,
    pub etag: Option<String>,
    pub dirty: bool,
    pub deleted: bool,
    pub payload: String,
}
