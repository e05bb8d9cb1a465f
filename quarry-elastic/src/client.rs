use std::time::Duration;

use quarry_core::SearchError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{check_response, ReqwestErrorExt};

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    hits: Hits<T>,
}

#[derive(Debug, Deserialize)]
struct Hits<T> {
    hits: Vec<Hit<T>>,
}

#[derive(Debug, Deserialize)]
struct Hit<T> {
    #[serde(rename = "_source")]
    source: T,
}

/// Thin HTTP client for the `_count` and `_search` endpoints of an
/// Elasticsearch-compatible engine.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    http: reqwest::Client,
    endpoint: Url,
    max_window: u64,
}

impl ElasticClient {
    /// The engine's default `index.max_result_window`.
    pub const DEFAULT_MAX_WINDOW: u64 = 10_000;

    /// Client with default HTTP settings.
    pub fn new(endpoint: &str) -> Result<Self, SearchError> {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Client with a per-request timeout.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| e.into_search_error())?;
        Self::with_client(http, endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: &str) -> Result<Self, SearchError> {
        let endpoint = Url::parse(endpoint).map_err(SearchError::backend)?;
        Ok(Self {
            http,
            endpoint,
            max_window: Self::DEFAULT_MAX_WINDOW,
        })
    }

    /// Largest window requested when a search has no explicit size.
    pub fn with_max_window(mut self, max_window: u64) -> Self {
        self.max_window = max_window;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn max_window(&self) -> u64 {
        self.max_window
    }

    /// Number of documents in `index` matching `body`.
    pub async fn count(&self, index: &str, body: &Value) -> Result<u64, SearchError> {
        let response: CountResponse = self.post(index, "_count", body).await?;
        Ok(response.count)
    }

    /// Matching documents in `index`, decoded from each hit's `_source`.
    pub async fn search<T: DeserializeOwned>(
        &self,
        index: &str,
        body: &Value,
    ) -> Result<Vec<T>, SearchError> {
        let response: SearchResponse<T> = self.post(index, "_search", body).await?;
        Ok(response.hits.hits.into_iter().map(|hit| hit.source).collect())
    }

    fn url(&self, index: &str, operation: &str) -> String {
        format!(
            "{}/{index}/{operation}",
            self.endpoint.as_str().trim_end_matches('/')
        )
    }

    async fn post<R: DeserializeOwned>(
        &self,
        index: &str,
        operation: &str,
        body: &Value,
    ) -> Result<R, SearchError> {
        let url = self.url(index, operation);
        tracing::debug!(url = %url, body = %body, "sending index request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.into_search_error())?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| e.into_search_error())?;

        check_response(status, &text)?;
        serde_json::from_str(&text).map_err(SearchError::decode)
    }
}
