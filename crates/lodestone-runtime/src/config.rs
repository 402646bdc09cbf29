use std::fs;
use std::path::Path;
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for the chunk pipeline, loaded from the `[video]`-style TOML
/// the launcher writes.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct VideoOptions {
    /// Chebyshev radius, in chunks, of the loaded/rendered shell.
    pub render_distance: i32,
    /// Worker budget for concurrent column rebuilds.
    pub chunk_threads: usize,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            render_distance: 8,
            chunk_threads: default_chunk_threads(),
        }
    }
}

fn default_chunk_threads() -> usize {
    thread::available_parallelism()
        .map(|n| (n.get() / 2).max(1))
        .unwrap_or(1)
}

impl VideoOptions {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let opts: VideoOptions = toml::from_str("render_distance = 12").unwrap();
        assert_eq!(opts.render_distance, 12);
        assert!(opts.chunk_threads >= 1);
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let opts: VideoOptions = toml::from_str("").unwrap();
        assert_eq!(opts, VideoOptions::default());
    }
}
