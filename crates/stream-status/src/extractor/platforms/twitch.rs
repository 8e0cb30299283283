use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::extractor::client::HttpFetcher;
use crate::extractor::error::ExtractorError;
use crate::extractor::metadata::extract_game;
use crate::extractor::status::{Classification, classify_status};

/// Endpoint layout of the Twitch API for status and channel lookups.
pub struct TwitchApi {
    base: Url,
    fetcher: Arc<dyn HttpFetcher>,
}

impl TwitchApi {
    pub const DEFAULT_API_BASE: &'static str = "https://api.twitch.tv/kraken";
    const CHANNEL_PAGE_BASE: &'static str = "https://www.twitch.tv";

    pub fn new(base_url: &str, fetcher: Arc<dyn HttpFetcher>) -> Result<Self, ExtractorError> {
        let base = Url::parse(base_url)
            .map_err(|e| ExtractorError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ExtractorError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { base, fetcher })
    }

    pub fn with_default_base(fetcher: Arc<dyn HttpFetcher>) -> Result<Self, ExtractorError> {
        Self::new(Self::DEFAULT_API_BASE, fetcher)
    }

    fn endpoint(&self, resource: &str, id: &str) -> Result<Url, ExtractorError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ExtractorError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(resource)
            .push(id);
        Ok(url)
    }

    /// `{base}/streams/{id}`
    pub fn status_url(&self, id: &str) -> Result<Url, ExtractorError> {
        self.endpoint("streams", id)
    }

    /// `{base}/channels/{id}`
    pub fn channel_url(&self, id: &str) -> Result<Url, ExtractorError> {
        self.endpoint("channels", id)
    }

    /// Public channel page, opened by notification actions.
    pub fn channel_page_url(id: &str) -> String {
        format!("{}/{}", Self::CHANNEL_PAGE_BASE, id)
    }

    pub async fn stream_status(&self, id: &str) -> Result<Classification, ExtractorError> {
        let url = self.status_url(id)?;
        let body = self.fetcher.fetch(url.as_str()).await?;
        let classification = classify_status(&body);
        debug!(stream = id, %classification, "classified status payload");
        Ok(classification)
    }

    pub async fn current_game(&self, id: &str) -> Result<String, ExtractorError> {
        let url = self.channel_url(id)?;
        let body = self.fetcher.fetch(url.as_str()).await?;
        Ok(extract_game(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedFetcher;

    fn api(fetcher: Arc<ScriptedFetcher>) -> TwitchApi {
        TwitchApi::with_default_base(fetcher).unwrap()
    }

    #[test]
    fn test_urls() {
        let api = api(Arc::new(ScriptedFetcher::new()));
        assert_eq!(
            api.status_url("bob").unwrap().as_str(),
            "https://api.twitch.tv/kraken/streams/bob"
        );
        assert_eq!(
            api.channel_url("bob").unwrap().as_str(),
            "https://api.twitch.tv/kraken/channels/bob"
        );
    }

    #[test]
    fn test_base_with_trailing_slash() {
        let api = TwitchApi::new("http://127.0.0.1:8080/api/", Arc::new(ScriptedFetcher::new()))
            .unwrap();
        assert_eq!(
            api.status_url("bob").unwrap().as_str(),
            "http://127.0.0.1:8080/api/streams/bob"
        );
    }

    #[test]
    fn test_identifier_is_a_single_segment() {
        let api = api(Arc::new(ScriptedFetcher::new()));
        let url = api.status_url("a/b?c").unwrap();
        assert_eq!(url.path(), "/kraken/streams/a%2Fb%3Fc");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_invalid_base() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        assert!(TwitchApi::new("not a url", fetcher.clone()).is_err());
        assert!(TwitchApi::new("mailto:someone@example.com", fetcher).is_err());
    }

    #[test]
    fn test_channel_page_url() {
        assert_eq!(TwitchApi::channel_page_url("bob"), "https://www.twitch.tv/bob");
    }

    #[tokio::test]
    async fn test_stream_status_and_game() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let api = api(fetcher.clone());
        fetcher.push_body(
            api.status_url("bob").unwrap().as_str(),
            r#"{"stream":{"_id":1,"game":"Tetris"},"_links":{}}"#,
        );
        fetcher.push_body(
            api.channel_url("bob").unwrap().as_str(),
            r#"{"name":"bob","game":"Tetris: The Grand Master"}"#,
        );

        assert_eq!(api.stream_status("bob").await.unwrap(), Classification::Online);
        assert_eq!(
            api.current_game("bob").await.unwrap(),
            "Tetris: The Grand Master"
        );
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let api = api(fetcher.clone());
        fetcher.push_error(api.status_url("bob").unwrap().as_str(), "connection refused");

        assert!(api.stream_status("bob").await.is_err());
    }
}
