use async_trait::async_trait;

use super::schema::Database;
use super::store::KeyValueStore;
use super::types::StorageError;

impl Database {
    // ========================================================================
    // Key-Value Operations
    // ========================================================================

    /// Get a stored value by key.
    ///
    /// Keys use dotted convention: `bookmarks.articles`, `theme.variant`.
    pub async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM key_value WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Set a value (UPSERT), refreshing its timestamp.
    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO key_value (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::trace!(key, bytes = value.len(), "Stored value");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get_value(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_value(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Database, KeyValueStore};
    use std::sync::Arc;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_get_value_missing() {
        let db = test_db().await;
        assert_eq!(db.get_value("nonexistent.key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_get_value() {
        let db = test_db().await;
        db.set_value("theme.variant", "dark").await.unwrap();
        assert_eq!(
            db.get_value("theme.variant").await.unwrap(),
            Some("dark".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_value_upsert() {
        let db = test_db().await;
        db.set_value("theme.variant", "dark").await.unwrap();
        db.set_value("theme.variant", "light").await.unwrap();

        assert_eq!(
            db.get_value("theme.variant").await.unwrap(),
            Some("light".to_string())
        );
        let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM key_value")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(rows.0, 1);
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let store: Arc<dyn KeyValueStore> = Arc::new(test_db().await);
        store.set("bookmarks.articles", "[]").await.unwrap();
        assert_eq!(
            store.get("bookmarks.articles").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_large_value_round_trips() {
        let db = test_db().await;
        let value = "x".repeat(256 * 1024);
        db.set_value("bookmarks.articles", &value).await.unwrap();
        assert_eq!(
            db.get_value("bookmarks.articles").await.unwrap().map(|v| v.len()),
            Some(value.len())
        );
    }
}
