//! Worker pool configuration

use crate::error::BatchResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizing of a [`WorkerPool`](crate::WorkerPool)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads
    pub threads: usize,

    /// Jobs that may wait for a free worker before `submit` blocks
    pub queue_depth: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            queue_depth: 4,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set how many jobs may queue behind busy workers
    #[must_use]
    pub const fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth;
        self
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(text: &str) -> BatchResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> BatchResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
