//! # Stream Status Parser
//!
//! Live status and channel metadata extraction for streaming platforms that
//! are watched by polling a status endpoint and a channel endpoint.
//!
//! ## Features
//!
//! - Purpose-built token scanning of the status payload into a
//!   [`Classification`](extractor::Classification)
//! - Single-field extraction from the channel payload (e.g. current game)
//! - Pluggable HTTP transport through the [`HttpFetcher`](extractor::HttpFetcher) trait
//! - Twitch endpoint layout via [`TwitchApi`](extractor::platforms::twitch::TwitchApi)
//!
//! The scanners are intentionally not a JSON parser. They understand the
//! flat, single-level records the endpoints return and fall back to a
//! conservative answer for anything else.

pub mod extractor;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use extractor::{Classification, ExtractorError, HttpFetcher};
