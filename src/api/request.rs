use url::Url;

use super::types::Query;

/// Articles requested per page. Also the threshold for "a full page".
pub const PAGE_SIZE: u32 = 20;

/// Endpoint for free-text search.
const SEARCH_ENDPOINT: &str = "everything";
/// Endpoint for category/country browsing.
const HEADLINES_ENDPOINT: &str = "top-headlines";

const API_KEY_PARAM: &str = "apiKey";

/// Build the request URL for `query` at `page`.
///
/// The endpoint segment is appended to `base`'s path, so a base of
/// `https://newsapi.org/v2` yields `https://newsapi.org/v2/everything?...`.
/// Any query string already on `base` is dropped. `page` is clamped to 1.
///
/// Returns `None` if `base` cannot carry a path (e.g. `mailto:` URLs);
/// [`NewsClient`](super::NewsClient) rejects those at construction.
pub fn build_request_url(base: &Url, query: &Query, page: u32, api_key: &str) -> Option<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);

    let endpoint = if query.is_search() {
        SEARCH_ENDPOINT
    } else {
        HEADLINES_ENDPOINT
    };
    url.path_segments_mut().ok()?.pop_if_empty().push(endpoint);

    let page = page.max(1).to_string();
    let page_size = PAGE_SIZE.to_string();
    {
        let mut pairs = url.query_pairs_mut();
        match query {
            Query::Search { text, sort_by } => {
                pairs
                    .append_pair("q", text)
                    .append_pair("sortBy", sort_by.as_str());
            }
            Query::TopHeadlines { category, country } => {
                pairs
                    .append_pair("country", country.as_str())
                    .append_pair("category", category.as_str());
            }
        }
        pairs
            .append_pair("pageSize", &page_size)
            .append_pair("page", &page)
            .append_pair(API_KEY_PARAM, api_key);
    }

    Some(url)
}

/// Render a request URL for logs with the API key value masked.
pub fn redact_api_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == API_KEY_PARAM {
                (k.into_owned(), "[REDACTED]".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    if pairs.is_empty() {
        return redacted.to_string();
    }
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
