//! Error types for grdecl text parsing

use crate::block::{BlockError, ElementType};
use thiserror::Error;

/// Errors that can occur when parsing grdecl keyword text
#[derive(Debug, Error)]
pub enum GrdeclError {
    /// Expanded element count differs from the expected count
    #[error("Keyword {name}: expected {expected} values, found {actual}")]
    SizeMismatch {
        /// Keyword name
        name: String,
        /// Expected element count
        expected: usize,
        /// Elements found before the terminator
        actual: usize,
    },

    /// A token is not a valid value for the element type
    #[error("Keyword {name}: invalid token {token:?}")]
    InvalidToken {
        /// Keyword name
        name: String,
        /// Offending token
        token: String,
    },

    /// The text ends before the `/` that closes the keyword
    #[error("Keyword {0}: missing '/' terminator")]
    MissingTerminator(String),

    /// The keyword does not occur in the document
    #[error("Keyword {0} not found")]
    KeywordNotFound(String),

    /// The element type has no grdecl representation
    #[error("Keyword {name}: grdecl does not support element type {element_type}")]
    UnsupportedType {
        /// Keyword name
        name: String,
        /// Requested element type
        element_type: ElementType,
    },

    /// Block construction failed
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// Type alias for grdecl operation results
pub type GrdeclResult<T> = Result<T, GrdeclError>;
