//! Wire types and the HTTP transport for the news server.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outbound query payload, built fresh from form state on every submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub category: String,
    /// Serialized as "YYYY-MM-DD".
    pub date: NaiveDate,
    pub translation: bool,
    pub translation_language: String,
}

/// One article record as returned by the server. Every field except the
/// title and URL is optional; display fallbacks live in the card builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub url: String,
    /// Some server versions emit `published` instead of `published_date`.
    #[serde(default, alias = "published", skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    /// Kept as the raw wire string; only known values get a badge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_language: Option<String>,
}

/// Success response body. A missing `news` field counts as an empty result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("news server returned {0}")]
    Http(reqwest::StatusCode),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Seam over the `/get_news` call so the submission pipeline can be
/// exercised without a live server.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch_news(&self, request: &QueryRequest) -> Result<NewsResponse, TransportError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(server_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/get_news", server_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_news(&self, request: &QueryRequest) -> Result<NewsResponse, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, category = %request.category, "fetching news");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http(status));
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str(&body)?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_snake_case_with_iso_date() {
        let request = QueryRequest {
            category: "tech".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            translation: false,
            translation_language: String::new(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "category": "tech",
                "date": "2024-01-15",
                "translation": false,
                "translation_language": "",
            })
        );
    }

    #[test]
    fn test_response_minimal_item() {
        let body = r#"{"news": [{"title": "A", "url": "http://x", "source": "S"}]}"#;
        let response: NewsResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.news.len(), 1);
        let item = &response.news[0];
        assert_eq!(item.title, "A");
        assert_eq!(item.url, "http://x");
        assert_eq!(item.source.as_deref(), Some("S"));
        assert!(item.summary.is_none());
        assert!(item.sentiment.is_none());
        assert!(item.translated_summary.is_none());
    }

    #[test]
    fn test_response_accepts_legacy_published_field() {
        let body = r#"{"news": [{"title": "A", "url": "u", "published": "2024-01-15"}]}"#;
        let response: NewsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.news[0].published_date.as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn test_response_missing_news_field_is_empty() {
        let response: NewsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.news.is_empty());
    }

    #[test]
    fn test_response_unknown_sentiment_does_not_fail_parse() {
        let body = r#"{"news": [{"title": "A", "url": "u", "sentiment": "mixed"}]}"#;
        let response: NewsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.news[0].sentiment.as_deref(), Some("mixed"));
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let result: Result<NewsResponse, _> = serde_json::from_str("not json");
        assert!(result.is_err());
    }
}
