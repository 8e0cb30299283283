pub mod client;
pub mod error;
pub mod metadata;
pub mod platforms;
pub mod status;
pub mod tokens;

pub use client::{DEFAULT_UA, HttpFetcher, ReqwestFetcher, create_client_builder};
pub use error::ExtractorError;
pub use metadata::{MAX_SCANNED_SEGMENTS, extract_field, extract_game};
pub use status::{Classification, NOT_FOUND_MARKER, NULL_STREAM_MARKER, classify_status};
