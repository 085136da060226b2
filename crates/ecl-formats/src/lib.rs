//! File format readers and writers for ECLIPSE reservoir simulation data
//!
#![allow(clippy::cast_possible_wrap)] // Fortran markers are signed 32-bit
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::cast_precision_loss)] // Element counts reported as f64
#![allow(clippy::float_cmp)] // Bitwise comparisons are intended
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::redundant_closure_for_method_calls)] // Iterator chains
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate provides symmetric (reader and writer) implementations of the
//! file layers used by ECLIPSE and compatible simulators.
//!
//! # Layers
//!
//! - **RecordIO**: Fortran sequential records framed by 4-byte length markers
//! - **Block**: named, typed, counted arrays (`INTEHEAD`, `COORD`, `PORO`, ...)
//!   with binary and formatted codecs
//! - **Grdecl**: the keyword/value text format of input decks
//! - **KeywordFile**: an indexed sequence of blocks loaded lazily on demand
//!
//! # Byte order
//!
//! ECLIPSE writes big-endian files. Every handle carries an `endian_flip`
//! flag that is `true` when the file byte order differs from the host's;
//! [`record_io::ECLIPSE_ENDIAN_FLIP`] is the value for ECLIPSE files on the
//! current host.

#![warn(missing_docs)]

/// Typed blocks and their binary and formatted codecs
pub mod block;
/// Keyword files
///
/// Indexed, lazily materialized collections of blocks backed by a single
/// file. Safe to share between threads once opened.
pub mod file;
/// Grdecl keyword/value text codec
pub mod grdecl;
pub mod record_io;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use block::{BlockData, BlockError, BlockName, ElementType, TypedBlock};
pub use file::{FileError, KeywordFile, OpenOptions};
pub use grdecl::GrdeclError;
pub use record_io::{RecordIo, RecordIoError};

use record_io::ECLIPSE_ENDIAN_FLIP;
use std::io::Cursor;

/// Common format trait implemented by the byte-level formats
///
/// Bytes are unformatted and in ECLIPSE (big-endian) byte order.
pub trait EclFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>>;

    /// Build to bytes
    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;

    /// Verify round-trip correctness
    fn verify_round_trip(data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data != rebuilt.as_slice() {
            return Err("Round-trip verification failed".into());
        }
        Ok(())
    }
}

impl EclFormat for TypedBlock {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        let mut io = RecordIo::new(Cursor::new(data), false, ECLIPSE_ENDIAN_FLIP);
        let block = Self::read(&mut io)?;
        if !io.at_eof()? {
            return Err(format!("trailing bytes after block {}", block.name()).into());
        }
        Ok(block)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let mut io = RecordIo::new(Cursor::new(Vec::new()), false, ECLIPSE_ENDIAN_FLIP);
        self.write(&mut io)?;
        Ok(io.into_inner().into_inner())
    }
}

impl EclFormat for KeywordFile {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::from_bytes(data.to_vec(), ECLIPSE_ENDIAN_FLIP)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let mut io = RecordIo::new(Cursor::new(Vec::new()), false, ECLIPSE_ENDIAN_FLIP);
        self.write_to(&mut io)?;
        Ok(io.into_inner().into_inner())
    }
}
