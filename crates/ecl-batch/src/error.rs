//! Error types for batch loading

use ecl_formats::FileError;
use ecl_grid::GridError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running or configuring a worker pool
#[derive(Debug, Error)]
pub enum BatchError {
    /// A pool needs at least one worker thread
    #[error("Worker pool needs at least one thread")]
    NoThreads,

    /// The operating system refused to start a worker
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Jobs can no longer be submitted
    #[error("Worker pool is shut down")]
    Closed,

    /// The job loading this path panicked
    #[error("Job loading {} panicked", .0.display())]
    JobPanicked(PathBuf),

    /// Reading a configuration file failed
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document could not be parsed
    #[error("Invalid pool configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Keyword file error
    #[error(transparent)]
    File(#[from] FileError),

    /// Grid construction error
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;
