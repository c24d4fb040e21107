use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Article
// ============================================================================

/// A single news article as displayed in the card list and stored in bookmarks.
///
/// Articles are immutable once received. Two articles are the same article
/// when their `url` fields are equal; every other field is display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Article {
    /// Identity comparison: articles match when their URLs match.
    pub fn same_article(&self, other: &Article) -> bool {
        self.url == other.url
    }
}

// ============================================================================
// Filter Errors
// ============================================================================

/// Rejected filter values from configuration or the command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid country code: {0} (expected two letters, e.g. \"us\")")]
    InvalidCountry(String),

    #[error("Unknown sort order: {0} (expected publishedAt, relevancy or popularity)")]
    UnknownSort(String),
}

// ============================================================================
// Category
// ============================================================================

/// Top-headlines category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Category {
    #[default]
    General,
    Business,
    Sports,
    Technology,
    Health,
    Entertainment,
    Science,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Sports,
        Category::Technology,
        Category::Health,
        Category::Entertainment,
        Category::Science,
    ];

    /// Value sent in the `category` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Business => "business",
            Self::Sports => "sports",
            Self::Technology => "technology",
            Self::Health => "health",
            Self::Entertainment => "entertainment",
            Self::Science => "science",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Business => "Business",
            Self::Sports => "Sports",
            Self::Technology => "Technology",
            Self::Health => "Health",
            Self::Entertainment => "Entertainment",
            Self::Science => "Science",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Next category, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Previous category, wrapping around.
    pub fn prev(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }
}

impl FromStr for Category {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| FilterError::UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Country
// ============================================================================

/// Countries offered when cycling with the keyboard: (code, display name).
const PRESET_COUNTRIES: [(&str, &str); 7] = [
    ("us", "United States"),
    ("in", "India"),
    ("gb", "United Kingdom"),
    ("ca", "Canada"),
    ("au", "Australia"),
    ("de", "Germany"),
    ("fr", "France"),
];

/// ISO 3166-1 alpha-2 country code, stored lowercase.
///
/// Any two-letter code is accepted; the preset list only drives keyboard cycling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Country(String);

impl Country {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display name for preset countries, uppercase code otherwise.
    pub fn label(&self) -> String {
        PRESET_COUNTRIES
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, name)| (*name).to_string())
            .unwrap_or_else(|| self.0.to_ascii_uppercase())
    }

    fn preset_position(&self) -> Option<usize> {
        PRESET_COUNTRIES.iter().position(|(code, _)| *code == self.0)
    }

    fn preset(index: usize) -> Self {
        Self(PRESET_COUNTRIES[index % PRESET_COUNTRIES.len()].0.to_string())
    }

    /// Next preset country. A non-preset code moves to the first preset.
    pub fn next(&self) -> Self {
        match self.preset_position() {
            Some(i) => Self::preset(i + 1),
            None => Self::preset(0),
        }
    }

    /// Previous preset country. A non-preset code moves to the last preset.
    pub fn prev(&self) -> Self {
        let len = PRESET_COUNTRIES.len();
        match self.preset_position() {
            Some(i) => Self::preset(i + len - 1),
            None => Self::preset(len - 1),
        }
    }
}

impl Default for Country {
    fn default() -> Self {
        Self("us".to_string())
    }
}

impl FromStr for Country {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase()) {
            Ok(Self(code))
        } else {
            Err(FilterError::InvalidCountry(s.to_string()))
        }
    }
}

impl TryFrom<String> for Country {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Sort Order
// ============================================================================

/// Sort order for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum SortBy {
    #[default]
    PublishedAt,
    Relevancy,
    Popularity,
}

impl SortBy {
    pub const ALL: [SortBy; 3] = [SortBy::PublishedAt, SortBy::Relevancy, SortBy::Popularity];

    /// Value sent in the `sortBy` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PublishedAt => "publishedAt",
            Self::Relevancy => "relevancy",
            Self::Popularity => "popularity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PublishedAt => "Published Date",
            Self::Relevancy => "Relevancy",
            Self::Popularity => "Popularity",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::PublishedAt => Self::Relevancy,
            Self::Relevancy => Self::Popularity,
            Self::Popularity => Self::PublishedAt,
        }
    }
}

impl FromStr for SortBy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FilterError::UnknownSort(s.to_string()))
    }
}

impl TryFrom<String> for SortBy {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Query and Filters
// ============================================================================

/// What to ask the news service for.
///
/// Search and top-headlines are mutually exclusive: search has no
/// category/country, top-headlines has no text or sort order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Search { text: String, sort_by: SortBy },
    TopHeadlines { category: Category, country: Country },
}

impl Query {
    pub fn is_search(&self) -> bool {
        matches!(self, Query::Search { .. })
    }
}

impl Default for Query {
    fn default() -> Self {
        Query::TopHeadlines {
            category: Category::default(),
            country: Country::default(),
        }
    }
}

/// The user's full filter selection. Search text, when non-blank, wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filters {
    pub search_text: String,
    pub sort_by: SortBy,
    pub category: Category,
    pub country: Country,
}

impl Filters {
    /// Derive the query these filters describe.
    pub fn query(&self) -> Query {
        let text = self.search_text.trim();
        if text.is_empty() {
            Query::TopHeadlines {
                category: self.category,
                country: self.country.clone(),
            }
        } else {
            Query::Search {
                text: text.to_string(),
                sort_by: self.sort_by,
            }
        }
    }
}
