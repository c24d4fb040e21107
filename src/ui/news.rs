//! News list renderer: article cards plus the loading, error and empty states.

use crate::api::Article;
use crate::app::{App, DisplayState};
use crate::util::{clean_line, format_published, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(format!(" News ({}) ", app.articles().len()));

    match app.display_state() {
        DisplayState::Error(msg) => {
            let text = vec![
                Line::from(Span::styled(clean_line(msg).into_owned(), app.style("list_error"))),
                Line::from(""),
                Line::from(Span::styled(
                    "Press r to retry or change a filter",
                    app.style("list_empty"),
                )),
            ];
            let p = Paragraph::new(text)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(p, area);
        }
        DisplayState::Loading => {
            let frame = SPINNER[app.spinner_frame % SPINNER.len()];
            let p = Paragraph::new(Span::styled(
                format!("{} Loading news...", frame),
                app.style("spinner"),
            ))
            .block(block)
            .alignment(Alignment::Center);
            f.render_widget(p, area);
        }
        DisplayState::Empty => {
            let p = Paragraph::new(Span::styled(
                "No articles found. Try another category or search.",
                app.style("list_empty"),
            ))
            .block(block)
            .alignment(Alignment::Center);
            f.render_widget(p, area);
        }
        DisplayState::Content => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(area);

            let items = article_cards(app, app.articles(), chunks[0].width);
            let list = List::new(items)
                .block(block)
                .highlight_style(app.style("card_selected"));
            let mut state = ListState::default().with_selected(Some(app.selected_article));
            f.render_stateful_widget(list, chunks[0], &mut state);

            f.render_widget(load_more_hint(app), chunks[1]);
        }
    }
}

fn load_more_hint(app: &App) -> Paragraph<'static> {
    let text = if app.is_loading() {
        format!("{} Loading more...", SPINNER[app.spinner_frame % SPINNER.len()])
    } else if app.has_more() {
        "[m] Load more".to_string()
    } else {
        "End of results".to_string()
    };
    Paragraph::new(text)
        .style(app.style("load_more_hint"))
        .alignment(Alignment::Center)
}

const UNKNOWN_SOURCE: &str = "Unknown Source";
const NO_DESCRIPTION: &str = "No description available.";

/// Build three-line cards: title, meta line, description.
///
/// Shared with the bookmark renderer.
pub(super) fn article_cards<'a>(app: &App, articles: &'a [Article], width: u16) -> Vec<ListItem<'a>> {
    // Borders plus the bookmark marker column
    let text_width = width.saturating_sub(4) as usize;

    articles
        .iter()
        .map(|article| {
            let marker = if app.is_bookmarked(article) { "★ " } else { "  " };
            let title = clean_line(&article.title);
            let title = truncate_to_width(&title, text_width).into_owned();

            let source = clean_line(&article.source_name);
            let mut meta = if source.trim().is_empty() {
                UNKNOWN_SOURCE.to_string()
            } else {
                source.into_owned()
            };
            if let Some(author) = article.author.as_deref().filter(|a| !a.trim().is_empty()) {
                meta.push_str(" · ");
                meta.push_str(&clean_line(author));
            }
            meta.push_str(" · ");
            meta.push_str(&format_published(article.published_at));
            let meta = truncate_to_width(&meta, text_width).into_owned();

            let description = article
                .description
                .as_deref()
                .map(clean_line)
                .filter(|d| !d.trim().is_empty())
                .map(|d| truncate_to_width(&d, text_width).into_owned())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string());

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, app.style("bookmark_marker")),
                    Span::styled(title, app.style("card_title")),
                ]),
                Line::from(Span::styled(format!("  {}", meta), app.style("card_meta"))),
                Line::from(Span::styled(
                    format!("  {}", description),
                    app.style("card_description"),
                )),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Filters, NewsClient, NewsPage};
    use crate::storage::MemoryStore;
    use crate::theme::ThemeVariant;
    use ratatui::{backend::TestBackend, Terminal};
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

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 12)).unwrap();
        terminal
            .draw(|f| render(f, app, f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_error_state_shows_message() {
        let mut app = test_app();
        let req = app.apply_filters();
        app.apply_fetch(req.generation, req.mode, Err(ApiError::Api("Rate limit".into())));
        assert!(draw(&app).contains("Rate limit"));
    }

    #[test]
    fn test_empty_and_loading_states() {
        let mut app = test_app();
        assert!(draw(&app).contains("No articles found"));
        app.apply_filters();
        assert!(draw(&app).contains("Loading news"));
    }

    #[test]
    fn test_cards_show_bookmark_marker() {
        let mut app = test_app();
        let req = app.apply_filters();
        let article = Article {
            title: "Markets rally".to_string(),
            description: Some("Stocks rose".to_string()),
            author: Some("Ana".to_string()),
            source_name: "Wire".to_string(),
            published_at: None,
            url: "https://news.example.com/markets".to_string(),
            image_url: None,
        };
        app.apply_fetch(
            req.generation,
            req.mode,
            Ok(NewsPage {
                articles: vec![article.clone()],
                received: 1,
                total_results: Some(1),
            }),
        );
        app.toggle_bookmark(&article).unwrap();

        let screen = draw(&app);
        assert!(screen.contains("Markets rally"));
        assert!(screen.contains("★"));
        assert!(screen.contains("Wire · Ana · Unknown date"));
        assert!(screen.contains("End of results"));
    }

    #[test]
    fn test_cards_fall_back_for_missing_source_and_description() {
        let mut app = test_app();
        let req = app.apply_filters();
        let article = Article {
            title: "Quiet day".to_string(),
            description: None,
            author: Some("Desk".to_string()),
            source_name: String::new(),
            published_at: None,
            url: "https://news.example.com/quiet".to_string(),
            image_url: None,
        };
        app.apply_fetch(
            req.generation,
            req.mode,
            Ok(NewsPage {
                articles: vec![article],
                received: 1,
                total_results: Some(1),
            }),
        );

        let screen = draw(&app);
        assert!(screen.contains("Unknown Source · Desk · Unknown date"));
        assert!(screen.contains("No description available."));
    }
}
