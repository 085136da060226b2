//! Error types for typed block parsing and building

use crate::record_io::RecordIoError;
use thiserror::Error;

/// Errors that can occur when reading, writing or constructing a block
#[derive(Debug, Error)]
pub enum BlockError {
    /// Name longer than 8 characters or not ASCII
    #[error("Invalid block name: {0:?}")]
    InvalidName(String),

    /// Unrecognized 4-byte type tag
    #[error("Unknown element type tag: {0:?}")]
    UnknownType(String),

    /// `C0nn` width outside `1..=999`
    #[error("Invalid string width: {0}")]
    InvalidStringWidth(usize),

    /// A string value does not fit the element width
    #[error("String value {value:?} exceeds element width {width}")]
    StringTooWide {
        /// Element width in bytes
        width: usize,
        /// Offending value
        value: String,
    },

    /// Header record is not 16 bytes long
    #[error("Invalid header record length: {0} (expected 16)")]
    InvalidHeaderLength(usize),

    /// Header carries a negative element count
    #[error("Block {name} has negative element count {count}")]
    NegativeCount {
        /// Block name
        name: String,
        /// Decoded count
        count: i32,
    },

    /// A data record holds more elements than the header declared
    #[error("Block {name}: data record overflows declared count {count} (got {received})")]
    DataOverflow {
        /// Block name
        name: String,
        /// Declared element count
        count: usize,
        /// Elements received including the overflowing record
        received: usize,
    },

    /// A data record length is not a multiple of the element size
    #[error("Block {name}: record of {length} bytes is not a multiple of element size {element_size}")]
    RaggedRecord {
        /// Block name
        name: String,
        /// Record payload length
        length: usize,
        /// Element size in bytes
        element_size: usize,
    },

    /// Formatted text that cannot be decoded
    #[error("Formatted block error: {0}")]
    Formatted(String),

    /// Requested element range is outside the block
    #[error("Range {offset}..{end} outside block of {count} elements")]
    OutOfRange {
        /// First requested element
        offset: usize,
        /// One past the last requested element
        end: usize,
        /// Number of elements in the block
        count: usize,
    },

    /// Block count does not fit a signed 32-bit header field
    #[error("Block of {0} elements cannot be written")]
    TooManyElements(usize),

    /// Framed record error
    #[error(transparent)]
    RecordIo(#[from] RecordIoError),

    /// `BinRW` parsing/writing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

impl BlockError {
    /// True when the underlying stream ended cleanly before a header
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::RecordIo(RecordIoError::EndOfFile))
    }

    /// True for corruption of the record framing or chunk layout
    pub const fn is_framing(&self) -> bool {
        match self {
            Self::RecordIo(e) => e.is_framing(),
            Self::DataOverflow { .. } | Self::RaggedRecord { .. } => true,
            _ => false,
        }
    }
}

/// Type alias for block operation results
pub type BlockResult<T> = Result<T, BlockError>;
