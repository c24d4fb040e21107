use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::store::KeyValueStore;
use super::types::StorageError;
use crate::api::Article;

/// Storage key holding the JSON array of bookmarked articles.
pub const BOOKMARKS_KEY: &str = "bookmarks.articles";

// ============================================================================
// Bookmark Set
// ============================================================================

/// Ordered list of bookmarked articles, unique by URL.
///
/// `revision` increases on every mutation so that persisted snapshots can be
/// ordered even when writes complete out of order.
#[derive(Debug, Clone, Default)]
pub struct BookmarkSet {
    articles: Vec<Article>,
    urls: HashSet<String>,
    revision: u64,
}

/// Serialized state of a [`BookmarkSet`] at a given revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkSnapshot {
    pub revision: u64,
    pub payload: String,
}

impl BookmarkSet {
    /// Build a set from articles in order, keeping the first entry for each URL.
    pub fn from_articles(articles: Vec<Article>) -> Self {
        let mut set = Self::default();
        for article in articles {
            if set.urls.insert(article.url.clone()) {
                set.articles.push(article);
            }
        }
        set
    }

    /// Decode a persisted JSON array.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let articles: Vec<Article> = serde_json::from_str(json).map_err(StorageError::Corrupt)?;
        let loaded = articles.len();
        let set = Self::from_articles(articles);
        if set.len() < loaded {
            tracing::warn!(
                loaded,
                kept = set.len(),
                "Dropped duplicate bookmarks from storage"
            );
        }
        Ok(set)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Remove `article` if bookmarked, otherwise append it.
    ///
    /// Returns `true` if the article was added.
    pub fn toggle(&mut self, article: &Article) -> bool {
        self.revision += 1;
        if self.urls.remove(&article.url) {
            self.articles.retain(|a| !a.same_article(article));
            false
        } else {
            self.urls.insert(article.url.clone());
            self.articles.push(article.clone());
            true
        }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, index: usize) -> Option<&Article> {
        self.articles.get(index)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Serialize the current contents for persistence.
    pub fn snapshot(&self) -> Result<BookmarkSnapshot, StorageError> {
        let payload = serde_json::to_string(&self.articles).map_err(StorageError::Encode)?;
        Ok(BookmarkSnapshot {
            revision: self.revision,
            payload,
        })
    }
}

// ============================================================================
// Bookmark Writer
// ============================================================================

/// Loads and saves the bookmark set through a [`KeyValueStore`].
///
/// Saves are fire-and-forget from the UI's point of view and may be spawned
/// concurrently. The writer serializes them and skips any snapshot older than
/// the last one written, so storage never regresses to an earlier state.
#[derive(Clone)]
pub struct BookmarkWriter {
    store: Arc<dyn KeyValueStore>,
    last_written: Arc<Mutex<u64>>,
}

impl BookmarkWriter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            last_written: Arc::new(Mutex::new(0)),
        }
    }

    /// Read the persisted set. A missing key yields an empty set.
    pub async fn load(&self) -> Result<BookmarkSet, StorageError> {
        match self.store.get(BOOKMARKS_KEY).await? {
            Some(json) => BookmarkSet::from_json(&json),
            None => Ok(BookmarkSet::default()),
        }
    }

    /// Persist `snapshot` unless a newer one has already been written.
    ///
    /// Returns `Ok(false)` when the snapshot was skipped as stale.
    pub async fn save(&self, snapshot: &BookmarkSnapshot) -> Result<bool, StorageError> {
        let mut last = self.last_written.lock().await;
        if snapshot.revision <= *last {
            tracing::debug!(
                revision = snapshot.revision,
                last_written = *last,
                "Skipping stale bookmark snapshot"
            );
            return Ok(false);
        }

        self.store.set(BOOKMARKS_KEY, &snapshot.payload).await?;
        *last = snapshot.revision;
        tracing::debug!(revision = snapshot.revision, "Bookmarks persisted");
        Ok(true)
    }
}
