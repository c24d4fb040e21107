//! Utility functions for common operations.
//!
//! - **Link validation**: article URLs are checked before opening in a browser
//! - **Text processing**: terminal-safe single-line text, width-aware truncation, date formatting

mod text;
mod url_validator;

pub use text::{clean_line, display_width, format_published, truncate_to_width};
pub use url_validator::{validate_article_url, UrlValidationError};

/// Maximum search text length accepted from the search box.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 500;
