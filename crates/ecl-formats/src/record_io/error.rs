//! RecordIO error types

use thiserror::Error;

/// Errors raised while reading or writing Fortran framed records
#[derive(Debug, Error)]
pub enum RecordIoError {
    /// Clean end of stream at a record boundary
    #[error("end of file")]
    EndOfFile,

    /// Fewer than four bytes were available for a record marker
    #[error("truncated record marker at offset {offset}: {available} of 4 bytes available")]
    TruncatedMarker {
        /// Offset of the marker
        offset: u64,
        /// Bytes that could be read
        available: usize,
    },

    /// The head marker holds a negative length
    #[error("negative record length {length} at offset {offset}")]
    NegativeLength {
        /// Offset of the head marker
        offset: u64,
        /// Decoded marker value
        length: i32,
    },

    /// The head marker declares more bytes than the stream holds
    #[error("record at offset {offset} declares {declared} bytes but only {available} remain")]
    TruncatedRecord {
        /// Offset of the head marker
        offset: u64,
        /// Declared payload length
        declared: u64,
        /// Bytes remaining after the head marker
        available: u64,
    },

    /// Head and tail markers disagree
    #[error("record marker mismatch at offset {offset}: head {head}, tail {tail}")]
    MarkerMismatch {
        /// Offset of the head marker
        offset: u64,
        /// Head marker value
        head: i32,
        /// Tail marker value
        tail: i32,
    },

    /// Payload does not fit in a signed 32-bit marker
    #[error("record of {0} bytes exceeds the Fortran record limit")]
    RecordTooLarge(usize),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordIoError {
    /// True for every corruption variant (head/tail mismatch, truncation)
    pub const fn is_framing(&self) -> bool {
        matches!(
            self,
            Self::TruncatedMarker { .. }
                | Self::NegativeLength { .. }
                | Self::TruncatedRecord { .. }
                | Self::MarkerMismatch { .. }
        )
    }

    /// True for a clean end of stream
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }
}

/// Result type for RecordIO operations
pub type RecordIoResult<T> = Result<T, RecordIoError>;
