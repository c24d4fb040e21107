//! News service access.
//!
//! - [`types`] - Articles, queries, and the filter vocabulary (category, country, sort)
//! - [`request`] - Request URL construction for both endpoints
//! - [`client`] - HTTP client, response interpretation, and error types
//!
//! # Example
//!
//! ```ignore
//! use newsdesk::api::{NewsClient, Query, DEFAULT_BASE_URL};
//!
//! let client = NewsClient::new(DEFAULT_BASE_URL, api_key)?;
//! let page = client.fetch_page(&Query::default(), 1).await?;
//! ```

mod client;
mod request;
mod types;

pub use client::{ApiError, NewsClient, NewsPage, DEFAULT_BASE_URL, FALLBACK_ERROR_MESSAGE};
pub use request::{build_request_url, redact_api_key, PAGE_SIZE};
pub use types::{Article, Category, Country, FilterError, Filters, Query, SortBy};
