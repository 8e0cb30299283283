//! Tracked stream records.
//!
//! This module provides the per-stream state record and the ordered
//! registry the scheduler walks on every tick.

pub mod entity;
pub mod registry;

pub use entity::{StreamEntity, StreamStatus};
pub use registry::{MAX_TRACKED_STREAMS, StreamRegistry, validate_stream_name};
