use chrono::{DateTime, Utc};
use futures::StreamExt;
use reqwest::redirect::Policy;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::request::{build_request_url, redact_api_key};
use super::types::{Article, Query};

/// Default NewsAPI v2 endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Message shown when the service reports an error without one.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to fetch news";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after 20s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Error reported by the news service itself; displays its message verbatim.
    #[error("{0}")]
    Api(String),
    #[error("Unexpected response from news service: {0}")]
    InvalidResponse(String),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

/// One page of results as returned by the service.
#[derive(Debug, Clone, Default)]
pub struct NewsPage {
    /// Usable articles, in service order.
    pub articles: Vec<Article>,
    /// Entries in the payload's `articles` array before filtering.
    /// Pagination decides "full page" from this, not from `articles.len()`.
    pub received: usize,
    /// `totalResults` when the service reports it.
    pub total_results: Option<u64>,
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    status: Option<String>,
    message: Option<String>,
    code: Option<String>,
    total_results: Option<u64>,
    #[serde(default)]
    articles: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireArticle {
    source: Option<WireSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireSource {
    name: Option<String>,
}

/// Drop empty / whitespace-only optional strings.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl WireArticle {
    /// Convert to an [`Article`]. Entries without a URL have no identity and are skipped.
    fn into_article(self) -> Option<Article> {
        let url = non_blank(self.url)?.trim().to_string();
        let published_at = self.published_at.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        Some(Article {
            title: self.title.unwrap_or_default(),
            description: non_blank(self.description),
            author: non_blank(self.author),
            source_name: self.source.and_then(|s| s.name).unwrap_or_default(),
            published_at,
            url,
            image_url: non_blank(self.url_to_image),
        })
    }
}

/// Interpret a response body.
///
/// - `status: "error"` → [`ApiError::Api`] with the service message (or a fallback)
/// - `status: "ok"` → page; a missing, null, or non-array `articles` is an empty page
/// - anything else → [`ApiError::InvalidResponse`]
///
/// Non-JSON bodies from non-2xx responses surface as [`ApiError::HttpStatus`].
pub(crate) fn parse_response(http_status: u16, body: &[u8]) -> Result<NewsPage, ApiError> {
    let success = (200..300).contains(&http_status);

    let wire: WireResponse = match serde_json::from_slice(body) {
        Ok(wire) => wire,
        Err(_) if !success => return Err(ApiError::HttpStatus(http_status)),
        Err(e) => {
            return Err(ApiError::InvalidResponse(format!(
                "body is not valid JSON ({})",
                e
            )))
        }
    };

    match wire.status.as_deref() {
        Some("error") => {
            tracing::warn!(
                http_status,
                code = wire.code.as_deref().unwrap_or("unknown"),
                "News service reported an error"
            );
            let message = non_blank(wire.message)
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
            Err(ApiError::Api(message))
        }
        Some("ok") if !success => Err(ApiError::HttpStatus(http_status)),
        Some("ok") => {
            let entries = match wire.articles {
                serde_json::Value::Array(entries) => entries,
                serde_json::Value::Null => Vec::new(),
                other => {
                    tracing::warn!(kind = %json_kind(&other), "Ignoring non-array articles field");
                    Vec::new()
                }
            };
            let received = entries.len();
            let articles: Vec<Article> = entries
                .into_iter()
                .filter_map(|entry| serde_json::from_value::<WireArticle>(entry).ok())
                .filter_map(WireArticle::into_article)
                .collect();

            if articles.len() < received {
                tracing::debug!(
                    received,
                    kept = articles.len(),
                    "Dropped malformed articles from response"
                );
            }

            Ok(NewsPage {
                articles,
                received,
                total_results: wire.total_results,
            })
        }
        Some(other) => Err(ApiError::InvalidResponse(format!("status \"{}\"", other))),
        None => Err(ApiError::InvalidResponse("missing status".to_string())),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ============================================================================
// Client
// ============================================================================

/// Redirect policy: at most 3 hops, no loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

/// HTTP client for the news service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Arc<SecretString>,
    /// Deadline for the whole exchange, body included.
    request_timeout: Duration,
}

impl std::fmt::Debug for NewsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl NewsClient {
    /// Create a client for `base_url`.
    ///
    /// The base URL must be HTTPS; plain HTTP is accepted only for
    /// `localhost` / `127.0.0.1` so tests can point at a local mock server.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        match base_url.scheme() {
            "https" => {}
            "http" => {
                let is_localhost = matches!(base_url.host_str(), Some("localhost" | "127.0.0.1"));
                if !is_localhost {
                    tracing::error!(base_url = %base_url, "Rejecting non-HTTPS base URL");
                    return Err(ApiError::InsecureBaseUrl);
                }
                tracing::warn!(base_url = %base_url, "Using non-HTTPS news base URL (localhost only)");
            }
            other => {
                return Err(ApiError::InvalidBaseUrl(format!(
                    "unsupported scheme {}",
                    other
                )))
            }
        }

        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: Arc::new(api_key),
            request_timeout: REQUEST_TIMEOUT,
        })
    }

    #[cfg(test)]
    fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch one page for `query`. Failures are not retried.
    pub async fn fetch_page(&self, query: &Query, page: u32) -> Result<NewsPage, ApiError> {
        let url = build_request_url(&self.base_url, query, page, self.api_key.expose_secret())
            .ok_or_else(|| ApiError::InvalidBaseUrl(self.base_url.to_string()))?;

        tracing::debug!(url = %redact_api_key(&url), page, "Fetching news");

        let exchange = async {
            let response = self.http.get(url).send().await.map_err(ApiError::Network)?;
            let status = response.status().as_u16();
            let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
            Ok::<_, ApiError>((status, body))
        };
        let (status, body) = tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| ApiError::Timeout)??;
        let result = parse_response(status, &body);

        match &result {
            Ok(page_data) => tracing::info!(
                page,
                articles = page_data.articles.len(),
                total = page_data.total_results.unwrap_or(0),
                "News page loaded"
            ),
            Err(e) => tracing::warn!(page, error = %e, "News fetch failed"),
        }
        result
    }
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Category, SortBy};
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn key() -> SecretString {
        SecretString::from("test-key".to_string())
    }

    fn article_json(n: usize) -> serde_json::Value {
        serde_json::json!({
            "source": { "id": null, "name": "Wire" },
            "author": "Reporter",
            "title": format!("Story {}", n),
            "description": "Something happened",
            "url": format!("https://example.com/story/{}", n),
            "urlToImage": null,
            "publishedAt": "2024-05-01T12:30:00Z",
            "content": "..."
        })
    }

    #[test]
    fn parse_ok_payload() {
        let body = serde_json::json!({
            "status": "ok",
            "totalResults": 2,
            "articles": [article_json(1), article_json(2)]
        });
        let page = parse_response(200, body.to_string().as_bytes()).unwrap();
        assert_eq!(page.received, 2);
        assert_eq!(page.total_results, Some(2));
        assert_eq!(page.articles[0].title, "Story 1");
        assert_eq!(page.articles[0].source_name, "Wire");
        assert_eq!(page.articles[0].author.as_deref(), Some("Reporter"));
        assert!(page.articles[0].published_at.is_some());
        assert_eq!(page.articles[1].url, "https://example.com/story/2");
    }

    #[test]
    fn parse_error_status_uses_message() {
        let body = r#"{"status":"error","code":"rateLimited","message":"Rate limit"}"#;
        let err = parse_response(429, body.as_bytes()).unwrap_err();
        assert!(matches!(err, ApiError::Api(_)));
        assert_eq!(err.to_string(), "Rate limit");
    }

    #[test]
    fn parse_error_status_without_message_uses_fallback() {
        let err = parse_response(200, br#"{"status":"error"}"#).unwrap_err();
        assert_eq!(err.to_string(), FALLBACK_ERROR_MESSAGE);

        let err = parse_response(200, br#"{"status":"error","message":"  "}"#).unwrap_err();
        assert_eq!(err.to_string(), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn parse_missing_or_null_articles_is_empty() {
        let page = parse_response(200, br#"{"status":"ok"}"#).unwrap();
        assert!(page.articles.is_empty());
        assert_eq!(page.received, 0);

        let page = parse_response(200, br#"{"status":"ok","articles":null}"#).unwrap();
        assert!(page.articles.is_empty());

        let page = parse_response(200, br#"{"status":"ok","articles":"nope"}"#).unwrap();
        assert!(page.articles.is_empty());
    }

    #[test]
    fn parse_drops_entries_without_url() {
        let body = serde_json::json!({
            "status": "ok",
            "articles": [article_json(1), { "title": "no link" }, 42, article_json(3)]
        });
        let page = parse_response(200, body.to_string().as_bytes()).unwrap();
        assert_eq!(page.received, 4);
        let urls: Vec<&str> = page.articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://example.com/story/1", "https://example.com/story/3"]
        );
    }

    #[test]
    fn parse_bad_timestamp_becomes_none() {
        let body = serde_json::json!({
            "status": "ok",
            "articles": [{ "url": "https://example.com/x", "publishedAt": "yesterday" }]
        });
        let page = parse_response(200, body.to_string().as_bytes()).unwrap();
        assert_eq!(page.articles[0].published_at, None);
        assert_eq!(page.articles[0].title, "");
    }

    #[test]
    fn parse_rejects_unknown_or_missing_status() {
        assert!(matches!(
            parse_response(200, br#"{"articles":[]}"#),
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_response(200, br#"{"status":"maybe","articles":[]}"#),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn parse_non_json() {
        assert!(matches!(
            parse_response(200, b"<html>oops</html>"),
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_response(502, b"Bad Gateway"),
            Err(ApiError::HttpStatus(502))
        ));
    }

    #[test]
    fn insecure_base_url_rejected() {
        assert!(matches!(
            NewsClient::new("http://evil.example.com/v2", key()),
            Err(ApiError::InsecureBaseUrl)
        ));
        assert!(NewsClient::new("http://127.0.0.1:9999", key()).is_ok());
        assert!(NewsClient::new(DEFAULT_BASE_URL, key()).is_ok());
        assert!(matches!(
            NewsClient::new("not a url", key()),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            NewsClient::new("ftp://newsapi.org", key()),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn debug_masks_key() {
        let client = NewsClient::new(DEFAULT_BASE_URL, key()).unwrap();
        let shown = format!("{:?}", client);
        assert!(!shown.contains("test-key"));
        assert!(shown.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn fetch_top_headlines_sends_expected_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .and(query_param("country", "us"))
            .and(query_param("category", "technology"))
            .and(query_param("pageSize", "20"))
            .and(query_param("page", "1"))
            .and(query_param("apiKey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "totalResults": 1,
                "articles": [article_json(1)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsClient::new(&server.uri(), key()).unwrap();
        let query = Query::TopHeadlines {
            category: Category::Technology,
            country: "us".parse().unwrap(),
        };
        let page = client.fetch_page(&query, 1).await.unwrap();
        assert_eq!(page.articles.len(), 1);
    }

    #[tokio::test]
    async fn fetch_search_sends_expected_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/everything"))
            .and(query_param("q", "election"))
            .and(query_param("sortBy", "popularity"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "ok", "articles": [] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsClient::new(&server.uri(), key()).unwrap();
        let query = Query::Search {
            text: "election".to_string(),
            sort_by: SortBy::Popularity,
        };
        let page = client.fetch_page(&query, 2).await.unwrap();
        assert!(page.articles.is_empty());
    }

    #[tokio::test]
    async fn fetch_surfaces_error_body_on_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid"
            })))
            .mount(&server)
            .await;

        let client = NewsClient::new(&server.uri(), key()).unwrap();
        let err = client.fetch_page(&Query::default(), 1).await.unwrap_err();
        assert_eq!(err.to_string(), "Your API key is invalid");
    }

    #[tokio::test]
    async fn fetch_transport_failure() {
        // Nothing listens on port 9 (discard) on loopback in test environments.
        let client = NewsClient::new("http://127.0.0.1:9", key()).unwrap();
        let err = client.fetch_page(&Query::default(), 1).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_) | ApiError::Timeout));
    }

    #[tokio::test]
    async fn fetch_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "ok", "articles": [] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = NewsClient::new(&server.uri(), key())
            .unwrap()
            .with_request_timeout(Duration::from_millis(50));
        let err = client.fetch_page(&Query::default(), 1).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout));
    }

    #[tokio::test]
    async fn fetch_rejects_oversized_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(MAX_RESPONSE_SIZE + 1)))
            .mount(&server)
            .await;

        let client = NewsClient::new(&server.uri(), key()).unwrap();
        let err = client.fetch_page(&Query::default(), 1).await.unwrap_err();
        assert!(matches!(err, ApiError::ResponseTooLarge(_)));
    }
}
