//! Integration tests for bookmark and theme persistence through SQLite.
//!
//! File-backed tests use a unique temp path so the database can be closed and
//! reopened the way a restart would.

use newsdesk::api::{Article, Filters, NewsClient};
use newsdesk::app::App;
use newsdesk::storage::{
    BookmarkSet, BookmarkWriter, Database, KeyValueStore, BOOKMARKS_KEY, THEME_KEY,
};
use newsdesk::theme::ThemeVariant;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;

fn article(n: usize) -> Article {
    Article {
        title: format!("Story {}", n),
        description: Some("Body".to_string()),
        author: None,
        source_name: "Wire".to_string(),
        published_at: None,
        url: format!("https://news.example.com/{}", n),
        image_url: None,
    }
}

fn temp_db_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("newsdesk_it_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("newsdesk.db")
}

fn cleanup(path: &PathBuf) {
    if let Some(dir) = path.parent() {
        std::fs::remove_dir_all(dir).ok();
    }
}

fn app_with(store: Arc<dyn KeyValueStore>) -> App {
    let client = NewsClient::new("http://127.0.0.1:9", SecretString::from("k")).unwrap();
    App::new(client, store, Filters::default(), ThemeVariant::Light)
}

fn urls(set: &BookmarkSet) -> Vec<String> {
    set.articles().iter().map(|a| a.url.clone()).collect()
}

#[tokio::test]
async fn test_bookmarks_survive_restart() {
    let path = temp_db_path("restart");
    let path_str = path.to_str().unwrap().to_string();

    {
        let db: Arc<dyn KeyValueStore> = Arc::new(Database::open(&path_str).await.unwrap());
        let mut app = app_with(db);
        app.load_persisted().await;
        assert!(app.bookmarks().is_empty());

        for n in [3, 1, 2] {
            let snapshot = app.toggle_bookmark(&article(n)).unwrap();
            assert!(app.bookmark_writer.save(&snapshot).await.unwrap());
        }
        let snapshot = app.toggle_bookmark(&article(1)).unwrap();
        app.bookmark_writer.save(&snapshot).await.unwrap();
        app.store.set(THEME_KEY, "dark").await.unwrap();
    }

    let db: Arc<dyn KeyValueStore> = Arc::new(Database::open(&path_str).await.unwrap());
    let mut app = app_with(db);
    app.load_persisted().await;
    assert_eq!(
        urls(app.bookmarks()),
        vec![
            "https://news.example.com/3".to_string(),
            "https://news.example.com/2".to_string(),
        ]
    );
    assert_eq!(app.theme_variant, ThemeVariant::Dark);

    drop(app);
    cleanup(&path);
}

#[tokio::test]
async fn test_out_of_order_saves_keep_newest() {
    let db: Arc<dyn KeyValueStore> = Arc::new(Database::open(":memory:").await.unwrap());
    let mut set = BookmarkSet::default();
    set.toggle(&article(1));
    let older = set.snapshot().unwrap();
    set.toggle(&article(2));
    let newer = set.snapshot().unwrap();

    let writer = BookmarkWriter::new(db.clone());
    assert!(writer.save(&newer).await.unwrap());
    assert!(!writer.save(&older).await.unwrap());

    let reloaded = writer.load().await.unwrap();
    assert_eq!(reloaded.len(), 2);
}

#[tokio::test]
async fn test_concurrent_saves_converge_on_latest() {
    let db: Arc<dyn KeyValueStore> = Arc::new(Database::open(":memory:").await.unwrap());
    let writer = BookmarkWriter::new(db.clone());

    let mut set = BookmarkSet::default();
    let mut snapshots = Vec::new();
    for n in 0..10 {
        set.toggle(&article(n));
        snapshots.push(set.snapshot().unwrap());
    }

    // Spawn in reverse so older revisions race against newer ones
    let handles: Vec<_> = snapshots
        .into_iter()
        .rev()
        .map(|snap| {
            let writer = writer.clone();
            tokio::spawn(async move { writer.save(&snap).await.unwrap() })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = writer.load().await.unwrap();
    assert_eq!(urls(&stored), urls(&set));
}

#[tokio::test]
async fn test_corrupt_bookmarks_start_empty() {
    let db = Database::open(":memory:").await.unwrap();
    db.set(BOOKMARKS_KEY, "[{\"title\": 42}").await.unwrap();

    let mut app = app_with(Arc::new(db));
    app.load_persisted().await;
    assert!(app.bookmarks().is_empty());
    assert!(app.status_message.is_some());

    // The next toggle overwrites the corrupt value
    let snapshot = app.toggle_bookmark(&article(7)).unwrap();
    app.bookmark_writer.save(&snapshot).await.unwrap();
    let stored = app.store.get(BOOKMARKS_KEY).await.unwrap().unwrap();
    let set = BookmarkSet::from_json(&stored).unwrap();
    assert_eq!(urls(&set), vec!["https://news.example.com/7".to_string()]);
}

#[tokio::test]
async fn test_duplicate_urls_in_storage_are_collapsed() {
    let db = Database::open(":memory:").await.unwrap();
    let payload = serde_json::to_string(&vec![article(1), article(2), article(1)]).unwrap();
    db.set(BOOKMARKS_KEY, &payload).await.unwrap();

    let mut app = app_with(Arc::new(db));
    app.load_persisted().await;
    assert_eq!(app.bookmarks().len(), 2);
}
