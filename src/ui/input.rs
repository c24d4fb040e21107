//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on current view and mode.

use crate::app::{App, AppEvent, View};
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{open_selected, spawn_theme_save, start_fetch, toggle_bookmark_and_save};
use super::Action;

/// Main input dispatch function.
///
/// Routes input to the appropriate handler based on current mode and view.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.search_mode {
        handle_search_input(app, code, event_tx);
        return Action::Continue;
    }

    // Keys shared by both views
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => {
            app.nav_down();
            return Action::Continue;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.nav_up();
            return Action::Continue;
        }
        KeyCode::Char('b') => {
            toggle_bookmark_and_save(app, event_tx);
            return Action::Continue;
        }
        KeyCode::Char('B') => {
            app.toggle_bookmarks_view();
            return Action::Continue;
        }
        KeyCode::Char('t') => {
            let variant = app.toggle_theme();
            let revision = app.preference_writer.next_revision();
            spawn_theme_save(
                app.preference_writer.clone(),
                revision,
                variant,
                event_tx.clone(),
            );
            return Action::Continue;
        }
        KeyCode::Char('o') | KeyCode::Enter => {
            open_selected(app);
            return Action::Continue;
        }
        _ => {}
    }

    match app.view {
        View::News => handle_news_input(app, code, event_tx),
        View::Bookmarks => {
            if code == KeyCode::Esc {
                app.toggle_bookmarks_view();
            }
        }
    }
    Action::Continue
}

/// Filter, pagination and refresh keys, only meaningful on the news list.
fn handle_news_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Char('/') => {
            app.search_mode = true;
            app.search_input = app.filters.search_text.clone();
        }
        KeyCode::Esc => {
            // Leave search results for the headlines
            if !app.filters.search_text.is_empty() {
                app.filters.search_text.clear();
                let request = app.apply_filters();
                start_fetch(app, request, event_tx);
            }
        }
        KeyCode::Char('c') => {
            app.filters.category = app.filters.category.next();
            let request = app.apply_filters();
            start_fetch(app, request, event_tx);
        }
        KeyCode::Char('C') => {
            app.filters.category = app.filters.category.prev();
            let request = app.apply_filters();
            start_fetch(app, request, event_tx);
        }
        KeyCode::Char('n') => {
            app.filters.country = app.filters.country.next();
            let request = app.apply_filters();
            start_fetch(app, request, event_tx);
        }
        KeyCode::Char('N') => {
            app.filters.country = app.filters.country.prev();
            let request = app.apply_filters();
            start_fetch(app, request, event_tx);
        }
        KeyCode::Char('s') => {
            app.filters.sort_by = app.filters.sort_by.next();
            let request = app.apply_filters();
            start_fetch(app, request, event_tx);
        }
        KeyCode::Char('r') => {
            let request = app.refresh();
            start_fetch(app, request, event_tx);
        }
        KeyCode::Char('m') => match app.load_more() {
            Some(request) => start_fetch(app, request, event_tx),
            None if app.is_loading() => app.set_status("Still loading..."),
            None => app.set_status("No more articles"),
        },
        _ => {}
    }
}

/// Handle input while the search box is open.
///
/// Enter submits the text; blank text returns to the headlines.
fn handle_search_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Esc => {
            app.search_mode = false;
            app.search_input.clear();
        }
        KeyCode::Enter => {
            app.search_mode = false;
            app.filters.search_text = std::mem::take(&mut app.search_input).trim().to_string();
            let request = app.apply_filters();
            start_fetch(app, request, event_tx);
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => {
            // Prevent input beyond max search length
            if app.search_input.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
                app.set_status(format!(
                    "Search query at max length ({} chars)",
                    MAX_SEARCH_QUERY_LENGTH
                ));
                return;
            }
            app.search_input.push(c);
        }
        _ => {}
    }
}
