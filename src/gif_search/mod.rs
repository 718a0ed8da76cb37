//! GIF search proxy
//!
//! One outbound GET per validated search against a Tenor v2 compatible
//! endpoint. No retries, no caching.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::GifSearchConfig;
use crate::forms::GifSearchRequest;
use crate::logger;

/// Largest number of GIFs one search may ask for
pub const MAX_GIFS: usize = 10;

/// Number of GIFs requested when the form omits `quantity`
pub const DEFAULT_GIFS: usize = 10;

/// Preferred media formats for the preview, best first
const PREVIEW_FORMATS: [&str; 2] = ["gif", "tinygif"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Failed to fetch GIFs: {0}")]
    Transport(String),

    #[error("Error decoding the API response.")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<GifResult>,
}

/// One search hit, trimmed to the fields the page shows
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GifResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content_description: String,
    #[serde(default)]
    pub itemurl: String,
    #[serde(default)]
    pub media_formats: HashMap<String, MediaFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaFormat {
    pub url: String,
    #[serde(default)]
    pub dims: Vec<u32>,
}

impl GifResult {
    /// URL of the animation to embed
    pub fn preview_url(&self) -> Option<&str> {
        PREVIEW_FORMATS
            .iter()
            .find_map(|f| self.media_formats.get(*f))
            .map(|m| m.url.as_str())
    }
}

/// Successful search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Vec<GifResult>),
    NoResults,
}

/// HTTP client for the search endpoint
#[derive(Debug, Clone)]
pub struct GifSearchClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GifSearchClient {
    pub fn new(config: &GifSearchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                logger::log_warning(&format!(
                    "Failed to build search client with {}s timeout, using defaults: {e}",
                    config.timeout_secs
                ));
                reqwest::Client::new()
            });

        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        }
    }

    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run one search. The returned list never exceeds `request.quantity`.
    pub async fn search(&self, request: &GifSearchRequest) -> Result<SearchOutcome, SearchError> {
        let limit = request.quantity.to_string();
        let mut params = vec![("q", request.query.as_str()), ("limit", limit.as_str())];
        if let Some(key) = &self.api_key {
            params.push(("key", key.as_str()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| SearchError::Transport(e.without_url().to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| SearchError::Transport(e.without_url().to_string()))?;

        let parsed: SearchResponse =
            serde_json::from_slice(&body).map_err(|e| SearchError::Decode(e.to_string()))?;

        let mut results = parsed.results;
        results.truncate(request.quantity);
        logger::log_debug(&format!(
            "GIF search {:?} returned {} result(s)",
            request.query,
            results.len()
        ));

        if results.is_empty() {
            Ok(SearchOutcome::NoResults)
        } else {
            Ok(SearchOutcome::Found(results))
        }
    }
}
