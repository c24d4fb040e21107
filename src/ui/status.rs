use crate::app::{App, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Use Cow to avoid allocations for static strings and borrowed status messages
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.search_mode {
        Cow::Borrowed("Type to search | ESC cancel | ENTER search (blank = headlines)")
    } else {
        match app.view {
            View::News => Cow::Borrowed(
                "[/]search [c/C]ategory [n/N]country [s]ort [m]ore [r]efresh [b]ookmark [B]ookmarks [t]heme [o]pen [q]uit",
            ),
            View::Bookmarks => {
                Cow::Borrowed("[b]remove [o]pen [j/k]move [t]heme [Esc/B]back [q]uit")
            }
        }
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
