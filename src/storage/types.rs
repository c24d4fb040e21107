use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors opening the database, with user-facing messages.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another instance of the application has locked the database
    #[error("Another instance of newsdesk appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify a sqlx error, detecting SQLite lock conditions.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14)
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
            || error_string.contains("unable to open database file")
        {
            return DatabaseError::InstanceLocked;
        }

        DatabaseError::Other(err)
    }
}

/// Errors reading or writing persisted values.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored bookmark data could not be decoded.
    #[error("Stored bookmarks are corrupt: {0}")]
    Corrupt(serde_json::Error),

    #[error("Failed to encode bookmarks: {0}")]
    Encode(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_error_message() {
        let err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let msg = StorageError::Corrupt(err).to_string();
        assert!(msg.starts_with("Stored bookmarks are corrupt"));
    }

    #[test]
    fn pool_timeout_is_not_a_lock() {
        let err = DatabaseError::from_sqlx(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DatabaseError::Other(_)));
    }
}
