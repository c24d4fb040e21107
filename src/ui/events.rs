//! Application event handling.
//!
//! Applies background task results (fetched pages, failed writes, panics)
//! to the application state.

use crate::api::ApiError;
use crate::app::{App, AppEvent, FetchMode};

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::NewsLoaded {
            generation,
            mode,
            result,
        } => {
            if app.apply_fetch(generation, mode, result) {
                app.fetch_handle = None;
            }
        }
        AppEvent::BookmarkSaveFailed { error } => {
            app.set_status(format!("Bookmarks not saved: {}", error));
        }
        AppEvent::PreferenceSaveFailed { key, error } => {
            tracing::debug!(key, "Preference write failed");
            app.set_status(format!("Preference not saved: {}", error));
        }
        AppEvent::FetchPanicked { generation, error } => {
            tracing::error!(generation, error = %error, "Fetch task panicked");
            // The panicked fetch can never report, so unstick the spinner.
            // A superseded task's panic leaves the live request alone.
            let applied = app.apply_fetch(
                generation,
                FetchMode::Replace,
                Err(ApiError::InvalidResponse(format!(
                    "internal error: {}",
                    error
                ))),
            );
            if applied {
                app.fetch_handle = None;
                app.set_status(format!("Internal error in fetch: {}", error));
            }
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_status(format!("Internal error in {}: {}", task, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Article, Filters, NewsClient, NewsPage};
    use crate::app::DisplayState;
    use crate::storage::MemoryStore;
    use crate::theme::ThemeVariant;
    use secrecy::SecretString;
    use std::sync::Arc;

    fn test_app() -> App {
        let client = NewsClient::new("http://127.0.0.1:9", SecretString::from("k")).unwrap();
        App::new(
            client,
            Arc::new(MemoryStore::new()),
            Filters::default(),
            ThemeVariant::default(),
        )
    }

    fn one_article_page() -> NewsPage {
        NewsPage {
            articles: vec![Article {
                title: "Headline".to_string(),
                description: None,
                author: None,
                source_name: "Wire".to_string(),
                published_at: None,
                url: "https://news.example.com/1".to_string(),
                image_url: None,
            }],
            received: 1,
            total_results: Some(1),
        }
    }

    #[tokio::test]
    async fn test_news_loaded_applies_current_generation() {
        let mut app = test_app();
        let req = app.apply_filters();
        handle_app_event(
            &mut app,
            AppEvent::NewsLoaded {
                generation: req.generation,
                mode: req.mode,
                result: Ok(one_article_page()),
            },
        );
        assert_eq!(app.articles().len(), 1);
        assert_eq!(app.display_state(), DisplayState::Content);
    }

    #[tokio::test]
    async fn test_news_loaded_ignores_stale_generation() {
        let mut app = test_app();
        let old = app.apply_filters();
        app.refresh();
        handle_app_event(
            &mut app,
            AppEvent::NewsLoaded {
                generation: old.generation,
                mode: FetchMode::Replace,
                result: Err(ApiError::Api("stale".to_string())),
            },
        );
        assert_eq!(app.error(), None);
        assert!(app.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_panic_clears_loading() {
        let mut app = test_app();
        let req = app.apply_filters();
        handle_app_event(
            &mut app,
            AppEvent::FetchPanicked {
                generation: req.generation,
                error: "boom".to_string(),
            },
        );
        assert!(!app.is_loading());
        assert!(matches!(app.display_state(), DisplayState::Error(_)));
    }

    #[tokio::test]
    async fn test_superseded_fetch_panic_keeps_current_request() {
        let mut app = test_app();
        let old = app.apply_filters();
        let current = app.refresh();
        app.fetch_handle = Some(tokio::spawn(async {}));

        handle_app_event(
            &mut app,
            AppEvent::FetchPanicked {
                generation: old.generation,
                error: "boom".to_string(),
            },
        );
        assert!(app.is_loading());
        assert_eq!(app.error(), None);
        assert!(app.fetch_handle.is_some());
        assert_eq!(app.fetch_generation(), current.generation);

        handle_app_event(
            &mut app,
            AppEvent::NewsLoaded {
                generation: current.generation,
                mode: current.mode,
                result: Ok(one_article_page()),
            },
        );
        assert_eq!(app.display_state(), DisplayState::Content);
        assert!(app.fetch_handle.is_none());
    }

    #[tokio::test]
    async fn test_save_failure_sets_status() {
        let mut app = test_app();
        handle_app_event(
            &mut app,
            AppEvent::BookmarkSaveFailed {
                error: "disk full".to_string(),
            },
        );
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("disk full"));
    }
}
