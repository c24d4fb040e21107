use chrono::{DateTime, Utc};
use std::borrow::Cow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Display width of `s` in terminal columns (CJK and emoji count double).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate `s` to at most `max_width` columns, appending "..." when cut.
///
/// Widths of 3 or less leave no room for an ellipsis, so the text is cut
/// without one. Returns the input borrowed when it already fits.
///
/// ```
/// use newsdesk::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Breaking news", 11), "Breaking...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", s[..end].trim_end(), suffix))
}

/// Make service-provided text safe for a single terminal line.
///
/// Drops ANSI escape sequences and control characters, and folds runs of
/// whitespace (including newlines) into single spaces.
pub fn clean_line(s: &str) -> Cow<'_, str> {
    let needs_work = s
        .chars()
        .any(|c| c.is_control() || c == '\u{1b}')
        || s.contains("  ")
        || s.starts_with(char::is_whitespace)
        || s.ends_with(char::is_whitespace);
    if !needs_work {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            match chars.peek() {
                // CSI: parameters until a final byte in @..~
                Some('[') => {
                    chars.next();
                    for n in chars.by_ref() {
                        if ('@'..='~').contains(&n) {
                            break;
                        }
                    }
                }
                // OSC: until BEL or ESC \
                Some(']') => {
                    chars.next();
                    while let Some(n) = chars.next() {
                        if n == '\u{7}' {
                            break;
                        }
                        if n == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    Cow::Owned(out)
}

/// Card date line, e.g. "May 01, 2024 12:30". Missing dates read "Unknown date".
pub fn format_published(published: Option<DateTime<Utc>>) -> String {
    match published {
        Some(dt) => dt.format("%b %d, %Y %H:%M").to_string(),
        None => "Unknown date".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn truncate_fits_is_borrowed() {
        assert!(matches!(truncate_to_width("hello", 5), Cow::Borrowed("hello")));
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Hello world", 8), "Hello...");
        assert_eq!(display_width(&truncate_to_width("Hello world", 8)), 8);
    }

    #[test]
    fn truncate_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
    }

    #[test]
    fn truncate_wide_chars() {
        // Each CJK char is two columns
        let out = truncate_to_width("你好世界你好", 7);
        assert_eq!(out, "你好...");
        assert!(display_width(&out) <= 7);
    }

    #[test]
    fn clean_line_passthrough() {
        assert!(matches!(clean_line("Plain title"), Cow::Borrowed(_)));
    }

    #[test]
    fn clean_line_folds_whitespace() {
        assert_eq!(clean_line("  Multi\nline\t\ttext  "), "Multi line text");
    }

    #[test]
    fn clean_line_strips_escapes() {
        assert_eq!(clean_line("\u{1b}[31mRed\u{1b}[0m alert"), "Red alert");
        assert_eq!(clean_line("\u{1b}]0;title\u{7}Body"), "Body");
        assert_eq!(clean_line("Bell\u{7}ring"), "Bellring");
    }

    #[test]
    fn format_published_dates() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(format_published(Some(dt)), "May 01, 2024 12:30");
        assert_eq!(format_published(None), "Unknown date");
    }
}
