use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListState, Paragraph},
    Frame,
};

use super::news::article_cards;

/// Render the saved bookmark list.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let bookmarks = app.bookmarks();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(format!(" Bookmarks ({}) ", bookmarks.len()));

    if bookmarks.is_empty() {
        let text = vec![
            Line::from(Span::styled("No bookmarks yet.", app.style("list_empty"))),
            Line::from(Span::styled(
                "Press b on an article to save it, Esc to go back.",
                app.style("list_empty"),
            )),
        ];
        let p = Paragraph::new(text).block(block).alignment(Alignment::Center);
        f.render_widget(p, area);
        return;
    }

    let items = article_cards(app, bookmarks.articles(), area.width);
    let list = List::new(items)
        .block(block)
        .highlight_style(app.style("card_selected"));
    let mut state = ListState::default().with_selected(Some(app.selected_bookmark));
    f.render_stateful_widget(list, area, &mut state);
}
