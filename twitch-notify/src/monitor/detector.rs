//! Individual stream detection.
//!
//! This module handles polling the status of a single stream and looking
//! up its current game.

use std::sync::Arc;

use stream_status_parser::Classification;
use stream_status_parser::extractor::ReqwestFetcher;
use stream_status_parser::extractor::platforms::twitch::TwitchApi;
use tracing::{debug, warn};

use crate::Result;
use crate::config::AppConfig;
use crate::streamer::StreamEntity;

/// Status poller for tracked streams.
pub struct StreamDetector {
    api: TwitchApi,
}

impl StreamDetector {
    pub fn new(api: TwitchApi) -> Self {
        Self { api }
    }

    /// Create a detector backed by a real HTTP client.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = ReqwestFetcher::with_timeout(config.request_timeout())?;
        let api = TwitchApi::new(&config.api_base_url, Arc::new(fetcher))?;
        Ok(Self::new(api))
    }

    pub fn api(&self) -> &TwitchApi {
        &self.api
    }

    /// Poll the status endpoint, surfacing transport failures.
    pub async fn try_check_status(&self, stream: &StreamEntity) -> Result<Classification> {
        debug!("Checking status for stream: {}", stream.identifier());
        Ok(self.api.stream_status(stream.identifier()).await?)
    }

    /// Poll the status endpoint.
    ///
    /// A transport failure carries no new information, so the stream's
    /// confirmed status is returned unchanged instead of an offline verdict.
    pub async fn check_status(&self, stream: &StreamEntity) -> Classification {
        match self.try_check_status(stream).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!(
                    stream = stream.identifier(),
                    error = %e,
                    "Status poll failed, keeping confirmed status"
                );
                stream.confirmed_status().into()
            }
        }
    }

    /// Current game of a channel. Empty if unknown or the lookup failed.
    pub async fn current_game(&self, identifier: &str) -> String {
        match self.api.current_game(identifier).await {
            Ok(game) => game,
            Err(e) => {
                warn!(stream = identifier, error = %e, "Failed to fetch channel metadata");
                String::new()
            }
        }
    }
}
