use crate::api::{ApiError, Article, Filters, NewsClient, NewsPage, Query, PAGE_SIZE};
use crate::storage::{
    BookmarkSet, BookmarkSnapshot, BookmarkWriter, KeyValueStore, PreferenceWriter, StorageError,
    THEME_KEY,
};
use crate::theme::{StyleMap, ThemeVariant};
use ratatui::style::Style;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

// ============================================================================
// Views and Fetch Requests
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    News,
    Bookmarks,
}

/// How a fetched page is merged into the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Fresh query: the page becomes the whole list.
    Replace,
    /// Pagination: the page is appended after existing results.
    Append,
}

/// A fetch the UI should spawn on the controller's behalf.
///
/// `generation` must be handed back to [`App::apply_fetch`] with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub query: Query,
    pub page: u32,
    pub mode: FetchMode,
}

/// What the news list should show.
///
/// An error wins over the empty message; the spinner only replaces an empty
/// list, so results stay visible while the next page loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Content,
}

// ============================================================================
// Background Events
// ============================================================================

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A news fetch finished.
    ///
    /// Fields:
    /// - `generation`: Generation counter when the fetch was spawned (for stale result detection)
    /// - `mode`: Whether the page replaces or extends the list
    /// - `result`: The page, or the error that ended the request
    NewsLoaded {
        generation: u64,
        mode: FetchMode,
        result: Result<NewsPage, ApiError>,
    },
    /// Writing the bookmark set failed. In-memory bookmarks are unaffected.
    BookmarkSaveFailed { error: String },
    /// Writing a preference (e.g. the theme) failed.
    PreferenceSaveFailed { key: &'static str, error: String },
    /// A fetch task panicked before reporting its result.
    FetchPanicked { generation: u64, error: String },
    /// A background task other than a fetch panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "bookmark_save")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state.
///
/// Query, pagination, results and bookmarks are private and change only
/// through the operations below; renderers read them through accessors.
pub struct App {
    pub client: NewsClient,
    pub store: Arc<dyn KeyValueStore>,
    pub bookmark_writer: BookmarkWriter,
    pub preference_writer: PreferenceWriter,

    /// Filter selection shown in the header; `apply_filters` turns it into a query.
    pub filters: Filters,
    /// In-flight fetch task, aborted when superseded.
    pub fetch_handle: Option<JoinHandle<()>>,

    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub view: View,
    pub selected_article: usize,
    pub selected_bookmark: usize,

    pub search_mode: bool,
    pub search_input: String,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,

    query: Query,
    page: u32,
    articles: Vec<Article>,
    loading: bool,
    error: Option<String>,
    has_more: bool,
    fetch_generation: u64,
    bookmarks: BookmarkSet,
}

impl App {
    pub fn new(
        client: NewsClient,
        store: Arc<dyn KeyValueStore>,
        filters: Filters,
        theme_variant: ThemeVariant,
    ) -> Self {
        let bookmark_writer = BookmarkWriter::new(store.clone());
        let preference_writer = PreferenceWriter::new(store.clone());
        Self {
            client,
            store,
            bookmark_writer,
            preference_writer,
            query: filters.query(),
            filters,
            fetch_handle: None,
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            view: View::News,
            selected_article: 0,
            selected_bookmark: 0,
            search_mode: false,
            search_input: String::new(),
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            page: 1,
            articles: Vec::new(),
            loading: false,
            error: None,
            has_more: false,
            fetch_generation: 0,
            bookmarks: BookmarkSet::default(),
        }
    }

    /// Restore bookmarks and the theme from the store.
    ///
    /// Failures are logged and reported in the status bar; the app starts
    /// with an empty bookmark set rather than refusing to run.
    pub async fn load_persisted(&mut self) {
        match self.bookmark_writer.load().await {
            Ok(set) => {
                tracing::info!(count = set.len(), "Loaded bookmarks");
                self.bookmarks = set;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load bookmarks, starting empty");
                self.bookmarks = BookmarkSet::default();
                self.set_status(format!("Could not load bookmarks: {}", e));
            }
        }

        match self.store.get(THEME_KEY).await {
            Ok(Some(name)) => match ThemeVariant::from_str_name(&name) {
                Some(variant) => self.set_theme(variant),
                None => tracing::warn!(value = %name, "Ignoring unknown stored theme"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to load theme preference"),
        }
    }

    // ------------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------------

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn fetch_generation(&self) -> u64 {
        self.fetch_generation
    }

    pub fn bookmarks(&self) -> &BookmarkSet {
        &self.bookmarks
    }

    pub fn is_bookmarked(&self, article: &Article) -> bool {
        self.bookmarks.contains(&article.url)
    }

    pub fn display_state(&self) -> DisplayState<'_> {
        if let Some(err) = self.error.as_deref() {
            DisplayState::Error(err)
        } else if self.articles.is_empty() && self.loading {
            DisplayState::Loading
        } else if self.articles.is_empty() {
            DisplayState::Empty
        } else {
            DisplayState::Content
        }
    }

    /// Whether the load-more action is currently available.
    pub fn can_load_more(&self) -> bool {
        !self.loading && self.has_more
    }

    /// Article under the cursor in the active view.
    pub fn selected(&self) -> Option<&Article> {
        match self.view {
            View::News => self.articles.get(self.selected_article),
            View::Bookmarks => self.bookmarks.get(self.selected_bookmark),
        }
    }

    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    // ------------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------------

    /// Make `query` current and start over at page 1.
    ///
    /// Any response still in flight for an earlier request becomes stale.
    pub fn set_query(&mut self, query: Query) -> FetchRequest {
        self.fetch_generation += 1;
        self.query = query;
        self.page = 1;
        self.error = None;
        self.loading = true;
        self.has_more = false;

        tracing::debug!(
            generation = self.fetch_generation,
            search = self.query.is_search(),
            "Query changed"
        );

        FetchRequest {
            generation: self.fetch_generation,
            query: self.query.clone(),
            page: 1,
            mode: FetchMode::Replace,
        }
    }

    /// Re-derive the query from `filters` and fetch it.
    pub fn apply_filters(&mut self) -> FetchRequest {
        let query = self.filters.query();
        self.set_query(query)
    }

    /// Re-run the current query from page 1.
    pub fn refresh(&mut self) -> FetchRequest {
        let query = self.query.clone();
        self.set_query(query)
    }

    /// Request the next page, or `None` while a fetch is pending or when the
    /// last page was short.
    pub fn load_more(&mut self) -> Option<FetchRequest> {
        if !self.can_load_more() {
            return None;
        }

        self.fetch_generation += 1;
        self.page += 1;
        self.loading = true;

        tracing::debug!(
            generation = self.fetch_generation,
            page = self.page,
            "Loading more"
        );

        Some(FetchRequest {
            generation: self.fetch_generation,
            query: self.query.clone(),
            page: self.page,
            mode: FetchMode::Append,
        })
    }

    /// Merge a finished fetch into state.
    ///
    /// Returns `false` when `generation` is not the current one; such results
    /// leave state untouched.
    pub fn apply_fetch(
        &mut self,
        generation: u64,
        mode: FetchMode,
        result: Result<NewsPage, ApiError>,
    ) -> bool {
        if generation != self.fetch_generation {
            tracing::debug!(
                generation,
                current = self.fetch_generation,
                "Discarding stale fetch result"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                let NewsPage {
                    articles,
                    received,
                    total_results,
                } = page;
                let loaded_so_far = u64::from(self.page) * u64::from(PAGE_SIZE);
                self.has_more = received >= PAGE_SIZE as usize
                    && total_results.map_or(true, |total| loaded_so_far < total);
                self.error = None;

                match mode {
                    FetchMode::Replace => {
                        self.articles = articles;
                        self.selected_article = 0;
                    }
                    FetchMode::Append => self.articles.extend(articles),
                }
                tracing::info!(
                    page = self.page,
                    total = self.articles.len(),
                    has_more = self.has_more,
                    "News loaded"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, page = self.page, "News fetch failed");
                self.error = Some(e.to_string());
                self.articles.clear();
                self.has_more = false;
                self.selected_article = 0;
            }
        }
        self.needs_redraw = true;
        true
    }

    // ------------------------------------------------------------------------
    // Bookmarks
    // ------------------------------------------------------------------------

    /// Add or remove `article` and return the snapshot to persist.
    ///
    /// The result list is never touched.
    pub fn toggle_bookmark(&mut self, article: &Article) -> Result<BookmarkSnapshot, StorageError> {
        let added = self.bookmarks.toggle(article);
        self.set_status(if added {
            "Bookmarked"
        } else {
            "Bookmark removed"
        });
        self.clamp_selections();
        self.bookmarks.snapshot()
    }

    /// Toggle the article under the cursor, if any.
    pub fn toggle_selected_bookmark(&mut self) -> Option<Result<BookmarkSnapshot, StorageError>> {
        let article = self.selected()?.clone();
        Some(self.toggle_bookmark(&article))
    }

    pub fn toggle_bookmarks_view(&mut self) {
        self.view = match self.view {
            View::News => View::Bookmarks,
            View::Bookmarks => View::News,
        };
        self.clamp_selections();
    }

    // ------------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------------

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Flip between light and dark. Returns the new variant for persisting.
    pub fn toggle_theme(&mut self) -> ThemeVariant {
        let next = self.theme_variant.toggled();
        self.set_theme(next);
        self.set_status(format!("Theme: {}", next.name()));
        next
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Navigate up in current list
    pub fn nav_up(&mut self) {
        match self.view {
            View::News => self.selected_article = self.selected_article.saturating_sub(1),
            View::Bookmarks => self.selected_bookmark = self.selected_bookmark.saturating_sub(1),
        }
    }

    /// Navigate down in current list
    pub fn nav_down(&mut self) {
        match self.view {
            View::News => {
                if !self.articles.is_empty() {
                    let max_index = self.articles.len() - 1;
                    self.selected_article = self.selected_article.saturating_add(1).min(max_index);
                }
            }
            View::Bookmarks => {
                if !self.bookmarks.is_empty() {
                    let max_index = self.bookmarks.len() - 1;
                    self.selected_bookmark =
                        self.selected_bookmark.saturating_add(1).min(max_index);
                }
            }
        }
    }

    /// Keep cursors inside their lists after the lists shrink.
    pub fn clamp_selections(&mut self) {
        self.selected_article = self
            .selected_article
            .min(self.articles.len().saturating_sub(1));
        self.selected_bookmark = self
            .selected_bookmark
            .min(self.bookmarks.len().saturating_sub(1));
    }

    // ------------------------------------------------------------------------
    // Status bar
    // ------------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.fetch_handle.take() {
            handle.abort();
            tracing::debug!("Aborted fetch task on App drop");
        }
    }
}
