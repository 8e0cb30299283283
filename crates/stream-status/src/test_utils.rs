//! Test doubles for the HTTP transport.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::extractor::{ExtractorError, HttpFetcher};

/// A scripted response for one request.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Body(String),
    TransportError(String),
}

/// [`HttpFetcher`] that replays scripted responses per URL.
///
/// Each request pops the next response queued for its URL. Once the queue
/// is drained the last response is repeated. Requesting a URL that was
/// never scripted is a transport error.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    queues: Mutex<HashMap<String, VecDeque<ScriptedResponse>>>,
    last: Mutex<HashMap<String, ScriptedResponse>>,
    requests: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, url: &str, response: ScriptedResponse) {
        self.queues
            .lock()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn push_body(&self, url: &str, body: impl Into<String>) {
        self.push(url, ScriptedResponse::Body(body.into()));
    }

    pub fn push_bodies<I, S>(&self, url: &str, bodies: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for body in bodies {
            self.push_body(url, body);
        }
    }

    pub fn push_error(&self, url: &str, message: impl Into<String>) {
        self.push(url, ScriptedResponse::TransportError(message.into()));
    }

    /// Number of requests made for `url` so far.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl HttpFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractorError> {
        *self.requests.lock().entry(url.to_string()).or_default() += 1;

        let next = self
            .queues
            .lock()
            .get_mut(url)
            .and_then(|queue| queue.pop_front());

        let response = match next {
            Some(response) => {
                self.last.lock().insert(url.to_string(), response.clone());
                response
            }
            None => self
                .last
                .lock()
                .get(url)
                .cloned()
                .ok_or_else(|| ExtractorError::Other(format!("no scripted response for {url}")))?,
        };

        match response {
            ScriptedResponse::Body(body) => Ok(body),
            ScriptedResponse::TransportError(message) => Err(ExtractorError::Other(message)),
        }
    }
}
