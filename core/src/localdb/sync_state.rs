// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::SqlitePool;

/// Key/value table holding per-collection sync state.
#[derive(Debug, Clone)]
pub struct SyncState {
    pool: SqlitePool,
}

impl SyncState {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        const SQL: &str = "SELECT value FROM sync_state WHERE key = ?;";

        let value: Option<Option<String>> = sqlx::query_scalar(SQL)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.flatten())
    }

    pub async fn set(&self, key: &str, value: Option<&str>) -> Result<(), sqlx::Error> {
        const SQL: &str = "
INSERT INTO sync_state (key, value)
VALUES (?, ?)
ON CONFLICT(key) DO UPDATE SET
    value = excluded.value;
";

        sqlx::query(SQL)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
