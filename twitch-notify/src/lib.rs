//! twitch-notify library crate.
//!
//! Watches a set of Twitch streams by polling their status endpoint and
//! raises a desktop notification once per sustained offline to online
//! transition. The binary in `main.rs` wires these modules together.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod notification;
pub mod streamer;

pub use error::{Error, Result};
