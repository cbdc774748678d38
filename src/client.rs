use std::future::Future;

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::{ApiEnvelope, PkdCode, SearchResults};

/// Failures of a single lookup attempt. There is no retry and no timeout;
/// a hung request stays in its slot until a newer search cancels it.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned status {0}")]
    Status(StatusCode),
}

/// Seam between the search controller and the network, so tests can
/// substitute a scripted transport for the real backend.
pub trait SearchTransport: Send + Sync + 'static {
    fn fetch(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<SearchResults, SearchError>> + Send;
}

/// HTTP client for the PKD classification backend.
#[derive(Debug, Clone)]
pub struct PkdClient {
    http: reqwest::Client,
    base_url: String,
}

impl PkdClient {
    pub fn new(base_url: impl Into<String>) -> PkdClient {
        let base_url = base_url.into();
        PkdClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up classification codes for a business description. Issues one
    /// GET to `{base}/process?serviceDescription=...`.
    pub async fn search(&self, query: &str) -> Result<SearchResults, SearchError> {
        let response = self
            .http
            .get(format!("{}/process", self.base_url))
            .query(&[("serviceDescription", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let envelope: ApiEnvelope<SearchResults> = response.json().await?;
        Ok(envelope.data)
    }

    /// Fetch up to `limit` sample PKD codes from `{base}/samples`.
    pub async fn samples(&self, limit: usize) -> Result<Vec<PkdCode>, SearchError> {
        let response = self
            .http
            .get(format!("{}/samples", self.base_url))
            .query(&[("limit", limit)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let envelope: ApiEnvelope<Vec<PkdCode>> = response.json().await?;
        Ok(envelope.data)
    }
}

impl SearchTransport for PkdClient {
    fn fetch(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<SearchResults, SearchError>> + Send {
        self.search(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let client = PkdClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");

        let client = PkdClient::new("http://localhost:3000");
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn unreachable_backend_surfaces_a_transport_error() {
        // Port 9 (discard) is closed on any sane host; the connection is
        // refused immediately, no external network involved.
        let client = PkdClient::new("http://127.0.0.1:9");
        let err = client.search("fryzjerstwo").await.unwrap_err();
        assert!(matches!(err, SearchError::Transport(_)));
    }
}
