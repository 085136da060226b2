//! Error types for keyword file access

use crate::block::BlockError;
use crate::record_io::RecordIoError;
use thiserror::Error;

/// Errors that can occur when opening, reading or writing keyword files
#[derive(Debug, Error)]
pub enum FileError {
    /// No block with this name and occurrence
    #[error("Keyword {name} occurrence {occurrence} not found")]
    NotFound {
        /// Keyword name
        name: String,
        /// Requested occurrence
        occurrence: usize,
    },

    /// Positional index past the last block
    #[error("Block index {index} out of range (file holds {len} blocks)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of blocks
        len: usize,
    },

    /// A lazily loaded block does not match the header seen at open time
    #[error("Block at offset {offset} changed on disk: expected {expected}, found {found}")]
    HeaderChanged {
        /// Offset of the block
        offset: u64,
        /// Name recorded at open time
        expected: String,
        /// Name found now
        found: String,
    },

    /// The block was never loaded and the reader has been released
    #[error("Block {0} is not loaded and the file reader is closed")]
    ReaderClosed(usize),

    /// Block level error
    #[error(transparent)]
    Block(#[from] BlockError),

    /// Framed record error
    #[error(transparent)]
    RecordIo(#[from] RecordIoError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FileError {
    /// True for framing or truncation defects in the underlying file
    pub const fn is_framing(&self) -> bool {
        match self {
            Self::Block(e) => e.is_framing(),
            Self::RecordIo(e) => e.is_framing(),
            _ => false,
        }
    }
}

/// Type alias for keyword file results
pub type FileResult<T> = Result<T, FileError>;
