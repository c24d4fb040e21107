//! Helper functions for UI operations.
//!
//! Background work (news fetches, bookmark and preference writes) is spawned
//! from here. Every task reports back through `AppEvent`; none of them touch
//! `App` directly.

use crate::api::NewsClient;
use crate::app::{App, AppEvent, FetchRequest};
use crate::storage::{BookmarkSnapshot, BookmarkWriter, PreferenceWriter, THEME_KEY};
use crate::theme::ThemeVariant;
use crate::util::validate_article_url;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing (caught by Tokio's runtime but not
/// handled), panics are converted to `Err(String)` containing the panic message.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(e) = panic.downcast_ref::<Box<dyn std::error::Error + Send>>() {
                e.to_string()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn `request`, aborting whatever fetch was running before it.
///
/// The aborted task's result could never be applied anyway (its generation
/// is stale), so this only saves the network round trip.
pub fn start_fetch(app: &mut App, request: FetchRequest, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(handle) = app.fetch_handle.take() {
        handle.abort();
        tracing::debug!("Aborted previous fetch task");
    }
    app.fetch_handle = Some(spawn_fetch(app.client.clone(), request, event_tx.clone()));
}

fn spawn_fetch(
    client: NewsClient,
    request: FetchRequest,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let tx_panic = tx.clone();
        let FetchRequest {
            generation,
            query,
            page,
            mode,
        } = request;
        tracing::debug!(generation, page, "Spawning fetch task");

        match catch_task_panic(async {
            let result = client.fetch_page(&query, page).await;
            if let Err(e) = tx
                .send(AppEvent::NewsLoaded {
                    generation,
                    mode,
                    result,
                })
                .await
            {
                tracing::warn!(error = %e, event = "NewsLoaded", "Channel send failed (receiver dropped)");
            }
        })
        .await
        {
            Ok(()) => {}
            Err(panic_msg) => {
                tracing::error!(task = "fetch", generation, error = %panic_msg, "Background task panicked");
                let _ = tx_panic
                    .send(AppEvent::FetchPanicked {
                        generation,
                        error: panic_msg,
                    })
                    .await;
            }
        }
    })
}

/// Persist a bookmark snapshot without blocking input.
pub(super) fn spawn_bookmark_save(
    writer: BookmarkWriter,
    snapshot: BookmarkSnapshot,
    tx: mpsc::Sender<AppEvent>,
) {
    tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(writer.save(&snapshot)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                tracing::error!(revision = snapshot.revision, error = %e, "Failed to persist bookmarks");
                let _ = tx
                    .send(AppEvent::BookmarkSaveFailed {
                        error: e.to_string(),
                    })
                    .await;
            }
            Err(panic_msg) => {
                tracing::error!(task = "bookmark_save", error = %panic_msg, "Background task panicked");
                let _ = tx_panic
                    .send(AppEvent::TaskPanicked {
                        task: "bookmark_save",
                        error: panic_msg,
                    })
                    .await;
            }
        }
    });
}

/// Persist the chosen theme.
///
/// `revision` must be taken from the writer when the theme changes so that
/// rapid toggles cannot land out of order.
pub(super) fn spawn_theme_save(
    writer: PreferenceWriter,
    revision: u64,
    variant: ThemeVariant,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = writer.save(THEME_KEY, revision, variant.as_str()).await {
            tracing::warn!(theme = variant.as_str(), error = %e, "Failed to save theme");
            let _ = tx
                .send(AppEvent::PreferenceSaveFailed {
                    key: THEME_KEY,
                    error: e.to_string(),
                })
                .await;
        }
    })
}

/// Toggle the bookmark under the cursor and persist the result.
pub(super) fn toggle_bookmark_and_save(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    match app.toggle_selected_bookmark() {
        Some(Ok(snapshot)) => {
            spawn_bookmark_save(app.bookmark_writer.clone(), snapshot, event_tx.clone());
        }
        Some(Err(e)) => {
            tracing::error!(error = %e, "Failed to encode bookmarks");
            app.set_status(format!("Could not save bookmarks: {}", e));
        }
        None => {}
    }
}

/// Open the selected article in the system browser.
pub(super) fn open_selected(app: &mut App) {
    let Some(url) = app.selected().map(|a| a.url.clone()) else {
        return;
    };

    // Links come from the news service; validate before open::that()
    match validate_article_url(&url) {
        Err(e) => app.set_status(format!("Refusing to open link: {}", e)),
        Ok(valid) => match open::that(valid.as_str()) {
            Ok(()) => app.set_status("Opening in browser..."),
            Err(e) => app.set_status(format!("Failed to open browser: {}", e)),
        },
    }
}
