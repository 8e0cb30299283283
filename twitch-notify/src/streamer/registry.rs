//! Ordered registry of tracked streams.

use std::collections::HashSet;

use tracing::warn;

use super::entity::StreamEntity;
use crate::{Error, Result};

/// Upper bound on the number of streams one process tracks.
pub const MAX_TRACKED_STREAMS: usize = 100;

/// Check that a stream name is an alphabetic-leading token of ASCII
/// letters, digits and underscores.
pub fn validate_stream_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(Error::validation("stream name is empty")),
        Some(c) if !c.is_ascii_alphabetic() => {
            return Err(Error::validation(format!(
                "stream name '{}' must start with a letter",
                name
            )));
        }
        Some(_) => {}
    }

    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(Error::validation(format!(
            "stream name '{}' contains invalid character '{}'",
            name, bad
        )));
    }

    Ok(())
}

/// Streams in registration order.
///
/// Iteration order is stable for the life of the registry; the scheduler
/// relies on it to process streams in the order they were given.
#[derive(Debug, Clone, Default)]
pub struct StreamRegistry {
    streams: Vec<StreamEntity>,
}

impl StreamRegistry {
    /// Build a registry from stream names.
    ///
    /// Names are validated, duplicates are dropped (first occurrence wins)
    /// and at most [`MAX_TRACKED_STREAMS`] distinct names are accepted.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut streams = Vec::new();

        for name in names {
            let name = name.as_ref();
            validate_stream_name(name)?;

            let key = name.to_ascii_lowercase();
            if !seen.insert(key) {
                warn!(stream = name, "Ignoring duplicate stream");
                continue;
            }

            if streams.len() == MAX_TRACKED_STREAMS {
                return Err(Error::validation(format!(
                    "at most {} streams can be tracked",
                    MAX_TRACKED_STREAMS
                )));
            }
            streams.push(StreamEntity::new(name));
        }

        if streams.is_empty() {
            return Err(Error::validation("at least one stream name is required"));
        }

        Ok(Self { streams })
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamEntity> {
        self.streams.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StreamEntity> {
        self.streams.iter_mut()
    }

    pub fn get(&self, identifier: &str) -> Option<&StreamEntity> {
        self.streams.iter().find(|s| s.identifier() == identifier)
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.streams.iter().map(StreamEntity::identifier).collect()
    }

    /// Stop tracking a stream. Returns the removed record.
    pub fn remove(&mut self, identifier: &str) -> Option<StreamEntity> {
        let index = self
            .streams
            .iter()
            .position(|s| s.identifier() == identifier)?;
        Some(self.streams.remove(index))
    }
}
