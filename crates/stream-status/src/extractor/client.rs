//! HTTP transport used by the extractors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::debug;

use super::error::ExtractorError;

pub const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Fetches raw response bodies.
///
/// Success responses and `404 Not Found` are successful fetches: platforms
/// encode "not found" in the body, and the extractors are responsible for
/// recognising it. Every other status is an error, as are transport
/// failures such as timeouts and connection errors.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ExtractorError>;
}

/// Client builder with the defaults shared by every fetcher.
pub fn create_client_builder(timeout: Option<Duration>) -> ClientBuilder {
    let builder = Client::builder().user_agent(DEFAULT_UA);
    match timeout {
        Some(timeout) if !timeout.is_zero() => builder.timeout(timeout),
        _ => builder,
    }
}

/// Reject statuses whose body is not a platform record.
pub fn accept_status(status: StatusCode) -> Result<(), ExtractorError> {
    if status.is_success() || status == StatusCode::NOT_FOUND {
        Ok(())
    } else {
        Err(ExtractorError::UnexpectedStatus(status))
    }
}

/// [`HttpFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a fetcher whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ExtractorError> {
        let client = create_client_builder(Some(timeout)).build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractorError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.twitchtv.v3+json")
            .send()
            .await?;

        let status = response.status();
        if let Err(e) = accept_status(status) {
            debug!(url, %status, "rejected response");
            return Err(e);
        }

        let body = response.text().await?;
        debug!(url, %status, len = body.len(), "fetched");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_not_found_are_fetched() {
        assert!(accept_status(StatusCode::OK).is_ok());
        assert!(accept_status(StatusCode::NO_CONTENT).is_ok());
        assert!(accept_status(StatusCode::NOT_FOUND).is_ok());
    }

    #[test]
    fn test_other_statuses_are_rejected() {
        for status in [
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::BAD_GATEWAY,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::FORBIDDEN,
            StatusCode::MOVED_PERMANENTLY,
        ] {
            let err = accept_status(status).unwrap_err();
            assert!(
                matches!(err, ExtractorError::UnexpectedStatus(s) if s == status),
                "{status}"
            );
        }
    }
}
