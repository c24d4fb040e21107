mod bookmarks;
mod key_value;
mod preferences;
mod schema;
mod store;
mod types;

pub use bookmarks::{BookmarkSet, BookmarkSnapshot, BookmarkWriter, BOOKMARKS_KEY};
pub use preferences::PreferenceWriter;
pub use schema::Database;
pub use store::{KeyValueStore, MemoryStore};
pub use types::{DatabaseError, StorageError};

/// Storage key for the persisted theme variant name.
pub const THEME_KEY: &str = "theme.variant";
