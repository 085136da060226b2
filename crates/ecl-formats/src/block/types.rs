//! Block names and element types

use crate::block::error::{BlockError, BlockResult};
use std::fmt;
use std::str::FromStr;

/// On-disk width of a block name
pub const NAME_LENGTH: usize = 8;

/// Elements per data record for numeric and logical blocks
pub const BLOCKSIZE_NUMERIC: usize = 1000;

/// Elements per data record for character blocks
pub const BLOCKSIZE_CHAR: usize = 105;

/// Keyword name, at most 8 ASCII characters
///
/// Stored space padded; two names are equal when their padded forms are.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockName([u8; NAME_LENGTH]);

impl BlockName {
    /// Create a name, padding it with spaces
    pub fn new(name: &str) -> BlockResult<Self> {
        if name.len() > NAME_LENGTH || !name.is_ascii() {
            return Err(BlockError::InvalidName(name.to_string()));
        }
        let mut padded = [b' '; NAME_LENGTH];
        padded[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self(padded))
    }

    /// Build from the raw padded header bytes
    pub fn from_padded(bytes: [u8; NAME_LENGTH]) -> BlockResult<Self> {
        if !bytes.is_ascii() {
            return Err(BlockError::InvalidName(
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }
        Ok(Self(bytes))
    }

    /// Name with trailing padding removed
    pub fn as_str(&self) -> &str {
        // ASCII was checked on construction
        std::str::from_utf8(&self.0)
            .unwrap_or_default()
            .trim_end_matches(' ')
    }

    /// Space padded form, as written in the header record
    pub const fn padded(&self) -> &[u8; NAME_LENGTH] {
        &self.0
    }

    /// Compare against a plain string using the padded form
    pub fn matches(&self, name: &str) -> bool {
        Self::new(name).is_ok_and(|other| other == *self)
    }
}

impl fmt::Display for BlockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for BlockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockName({:?})", self.as_str())
    }
}

impl FromStr for BlockName {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for BlockName {
    type Error = BlockError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

/// Element type of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// `INTE`: 32-bit signed integer
    Int,
    /// `REAL`: 32-bit float
    Float,
    /// `DOUB`: 64-bit float
    Double,
    /// `LOGI`: 32-bit logical, `-1` true and `0` false on disk
    Bool,
    /// `CHAR`: 8-character string
    Char,
    /// `MESS`: message marker without payload
    Mess,
    /// `C0nn`: fixed width string of `nn` characters
    String(u16),
}

impl ElementType {
    /// Largest `C0nn` width
    pub const MAX_STRING_WIDTH: usize = 999;

    /// Fixed width string type, validating the width
    pub fn string(width: usize) -> BlockResult<Self> {
        if width == 0 || width > Self::MAX_STRING_WIDTH {
            return Err(BlockError::InvalidStringWidth(width));
        }
        Ok(Self::String(width as u16))
    }

    /// Parse a 4-byte type tag
    pub fn from_tag(tag: &[u8]) -> BlockResult<Self> {
        let unknown = || BlockError::UnknownType(String::from_utf8_lossy(tag).into_owned());
        match tag {
            b"INTE" => Ok(Self::Int),
            b"REAL" => Ok(Self::Float),
            b"DOUB" => Ok(Self::Double),
            b"LOGI" => Ok(Self::Bool),
            b"CHAR" => Ok(Self::Char),
            b"MESS" => Ok(Self::Mess),
            [b'C', digits @ ..] if digits.len() == 3 && digits.iter().all(u8::is_ascii_digit) => {
                let width = digits
                    .iter()
                    .fold(0usize, |acc, d| acc * 10 + usize::from(d - b'0'));
                Self::string(width).map_err(|_| unknown())
            }
            _ => Err(unknown()),
        }
    }

    /// 4-byte type tag
    pub fn tag(&self) -> [u8; 4] {
        match self {
            Self::Int => *b"INTE",
            Self::Float => *b"REAL",
            Self::Double => *b"DOUB",
            Self::Bool => *b"LOGI",
            Self::Char => *b"CHAR",
            Self::Mess => *b"MESS",
            Self::String(width) => {
                let mut tag = *b"C000";
                let digits = format!("{width:03}");
                tag[1..].copy_from_slice(&digits.as_bytes()[..3]);
                tag
            }
        }
    }

    /// Bytes per element on disk
    pub const fn element_size(&self) -> usize {
        match self {
            Self::Int | Self::Float | Self::Bool => 4,
            Self::Double | Self::Char => 8,
            Self::Mess => 0,
            Self::String(width) => *width as usize,
        }
    }

    /// Elements per data record
    pub const fn block_size(&self) -> usize {
        if self.is_alpha() {
            BLOCKSIZE_CHAR
        } else {
            BLOCKSIZE_NUMERIC
        }
    }

    /// Values per line in formatted files
    pub const fn columns(&self) -> usize {
        match self {
            Self::Int => 6,
            Self::Float => 4,
            Self::Double => 3,
            Self::Bool => 25,
            Self::Char | Self::String(_) => 7,
            Self::Mess => 1,
        }
    }

    /// Character-like types
    pub const fn is_alpha(&self) -> bool {
        matches!(self, Self::Char | Self::Mess | Self::String(_))
    }

    /// Integer and floating point types
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Double)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.tag();
        f.write_str(std::str::from_utf8(&tag).unwrap_or("????"))
    }
}
