//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! view based on application state.

use crate::api::Query;
use crate::app::{App, View};
use crate::util::{display_width, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{bookmarks, news, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
///
/// Routes to the appropriate view renderer based on current application state.
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    f.render_widget(Block::default().style(app.style("background")), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.view {
        View::News => news::render(f, app, chunks[1]),
        View::Bookmarks => bookmarks::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);
}

/// Header: app name, active filters, and the search box when open.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let filter_style = app.style("header_filter");
    let mut spans = vec![Span::styled(" newsdesk ", app.style("header"))];

    if app.search_mode {
        spans.push(Span::styled(
            format!(" Search: {}_", app.search_input),
            app.style("search_input"),
        ));
    } else {
        match app.query() {
            Query::Search { text, sort_by } => {
                spans.push(Span::raw(" Search "));
                spans.push(Span::styled(format!("\"{}\"", text), filter_style));
                spans.push(Span::raw("  Sort "));
                spans.push(Span::styled(sort_by.label(), filter_style));
            }
            Query::TopHeadlines { category, country } => {
                spans.push(Span::raw(" Top headlines "));
                spans.push(Span::styled(category.label(), filter_style));
                spans.push(Span::raw("  Country "));
                spans.push(Span::styled(country.label(), filter_style));
            }
        }
    }

    let bookmarks = format!("  Bookmarks ({})", app.bookmarks().len());
    spans.push(Span::styled(bookmarks, app.style("bookmark_marker")));

    // Long search text must not push the bookmark count off screen
    let inner_width = area.width.saturating_sub(2) as usize;
    let line: String = spans.iter().map(|s| s.content.as_ref()).collect();
    let header = if display_width(&line) > inner_width {
        Line::from(Span::styled(
            truncate_to_width(&line, inner_width).into_owned(),
            app.style("header"),
        ))
    } else {
        Line::from(spans)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border"));
    f.render_widget(Paragraph::new(header).block(block), area);
}
