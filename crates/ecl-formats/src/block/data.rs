//! Typed payload of a block

use crate::block::error::{BlockError, BlockResult};
use crate::block::types::ElementType;
use binrw::{BinRead, BinWrite, Endian};
use std::io::Cursor;

/// Block payload, one variant per element type
///
/// The element count is the length of the owned vector, so the byte size
/// of a block always equals `count * element_size`.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockData {
    /// `INTE`
    Int(Vec<i32>),
    /// `REAL`
    Float(Vec<f32>),
    /// `DOUB`
    Double(Vec<f64>),
    /// `LOGI`
    Bool(Vec<bool>),
    /// `CHAR`, right-trimmed
    Char(Vec<String>),
    /// `MESS`, element count only
    Mess(usize),
    /// `C0nn`, right-trimmed
    String {
        /// Element width
        width: u16,
        /// Values
        values: Vec<String>,
    },
}

/// On-disk encoding of `LOGI` true
pub const BOOL_TRUE: i32 = -1;

/// On-disk encoding of `LOGI` false
pub const BOOL_FALSE: i32 = 0;

impl BlockData {
    /// Empty payload of the given type with room for `capacity` elements
    pub fn with_capacity(element_type: ElementType, capacity: usize) -> Self {
        match element_type {
            ElementType::Int => Self::Int(Vec::with_capacity(capacity)),
            ElementType::Float => Self::Float(Vec::with_capacity(capacity)),
            ElementType::Double => Self::Double(Vec::with_capacity(capacity)),
            ElementType::Bool => Self::Bool(Vec::with_capacity(capacity)),
            ElementType::Char => Self::Char(Vec::with_capacity(capacity)),
            ElementType::Mess => Self::Mess(0),
            ElementType::String(width) => Self::String {
                width,
                values: Vec::with_capacity(capacity),
            },
        }
    }

    /// Element type of the payload
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Int(_) => ElementType::Int,
            Self::Float(_) => ElementType::Float,
            Self::Double(_) => ElementType::Double,
            Self::Bool(_) => ElementType::Bool,
            Self::Char(_) => ElementType::Char,
            Self::Mess(_) => ElementType::Mess,
            Self::String { width, .. } => ElementType::String(*width),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Char(v) | Self::String { values: v, .. } => v.len(),
            Self::Mess(n) => *n,
        }
    }

    /// True when there are no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check string widths and trim trailing blanks
    pub(crate) fn normalized(self) -> BlockResult<Self> {
        fn trim_all(values: Vec<String>, width: usize) -> BlockResult<Vec<String>> {
            values
                .into_iter()
                .map(|value| {
                    let trimmed = value.trim_end_matches(' ');
                    if trimmed.len() > width || !trimmed.is_ascii() {
                        Err(BlockError::StringTooWide { width, value })
                    } else {
                        Ok(trimmed.to_string())
                    }
                })
                .collect()
        }

        match self {
            Self::Char(values) => Ok(Self::Char(trim_all(values, 8)?)),
            Self::String { width, values } => {
                ElementType::string(usize::from(width))?;
                Ok(Self::String {
                    width,
                    values: trim_all(values, usize::from(width))?,
                })
            }
            other => Ok(other),
        }
    }

    /// Element-wise bit equality
    ///
    /// Floating point values are compared by bit pattern, so `NaN` equals
    /// an identical `NaN` and `0.0` differs from `-0.0`.
    pub fn bitwise_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Self::Double(a), Self::Double(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (a, b) => a == b,
        }
    }

    /// Element `index` converted to `f64` for numeric and logical types
    pub fn get_as_f64(&self, index: usize) -> Option<f64> {
        match self {
            Self::Int(v) => v.get(index).map(|x| f64::from(*x)),
            Self::Float(v) => v.get(index).map(|x| f64::from(*x)),
            Self::Double(v) => v.get(index).copied(),
            Self::Bool(v) => v.get(index).map(|b| if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Copy of elements `offset..offset + count`
    pub fn slice(&self, offset: usize, count: usize) -> BlockResult<Self> {
        let end = offset
            .checked_add(count)
            .filter(|end| *end <= self.len())
            .ok_or(BlockError::OutOfRange {
                offset,
                end: offset.saturating_add(count),
                count: self.len(),
            })?;
        Ok(match self {
            Self::Int(v) => Self::Int(v[offset..end].to_vec()),
            Self::Float(v) => Self::Float(v[offset..end].to_vec()),
            Self::Double(v) => Self::Double(v[offset..end].to_vec()),
            Self::Bool(v) => Self::Bool(v[offset..end].to_vec()),
            Self::Char(v) => Self::Char(v[offset..end].to_vec()),
            Self::Mess(_) => Self::Mess(count),
            Self::String { width, values } => Self::String {
                width: *width,
                values: values[offset..end].to_vec(),
            },
        })
    }

    /// Decode one data record and append its elements
    ///
    /// `payload.len()` must be a multiple of the element size; this is
    /// checked by the caller.
    pub(crate) fn extend_from_record(
        &mut self,
        payload: &[u8],
        endian: Endian,
    ) -> BlockResult<()> {
        let mut cursor = Cursor::new(payload);
        match self {
            Self::Int(v) => {
                for _ in 0..payload.len() / 4 {
                    v.push(i32::read_options(&mut cursor, endian, ())?);
                }
            }
            Self::Float(v) => {
                for _ in 0..payload.len() / 4 {
                    v.push(f32::read_options(&mut cursor, endian, ())?);
                }
            }
            Self::Double(v) => {
                for _ in 0..payload.len() / 8 {
                    v.push(f64::read_options(&mut cursor, endian, ())?);
                }
            }
            Self::Bool(v) => {
                for _ in 0..payload.len() / 4 {
                    v.push(i32::read_options(&mut cursor, endian, ())? != BOOL_FALSE);
                }
            }
            Self::Char(v) => v.extend(payload.chunks_exact(8).map(decode_string)),
            Self::String { width, values } => values.extend(
                payload
                    .chunks_exact(usize::from(*width))
                    .map(decode_string),
            ),
            Self::Mess(_) => {}
        }
        Ok(())
    }

    /// Encode elements `range` into one data record payload
    pub(crate) fn encode_range(
        &self,
        range: std::ops::Range<usize>,
        endian: Endian,
    ) -> BlockResult<Vec<u8>> {
        let element_size = self.element_type().element_size();
        let mut cursor = Cursor::new(Vec::with_capacity(range.len() * element_size));
        match self {
            Self::Int(v) => {
                for x in &v[range] {
                    x.write_options(&mut cursor, endian, ())?;
                }
            }
            Self::Float(v) => {
                for x in &v[range] {
                    x.write_options(&mut cursor, endian, ())?;
                }
            }
            Self::Double(v) => {
                for x in &v[range] {
                    x.write_options(&mut cursor, endian, ())?;
                }
            }
            Self::Bool(v) => {
                for b in &v[range] {
                    let raw = if *b { BOOL_TRUE } else { BOOL_FALSE };
                    raw.write_options(&mut cursor, endian, ())?;
                }
            }
            Self::Char(v) | Self::String { values: v, .. } => {
                let buf = cursor.get_mut();
                for s in &v[range] {
                    buf.extend_from_slice(s.as_bytes());
                    buf.resize(buf.len() + element_size - s.len(), b' ');
                }
            }
            Self::Mess(_) => {}
        }
        Ok(cursor.into_inner())
    }
}

fn decode_string(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches([' ', '\0'])
        .to_string()
}

impl From<Vec<i32>> for BlockData {
    fn from(v: Vec<i32>) -> Self {
        Self::Int(v)
    }
}

impl From<Vec<f32>> for BlockData {
    fn from(v: Vec<f32>) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<f64>> for BlockData {
    fn from(v: Vec<f64>) -> Self {
        Self::Double(v)
    }
}

impl From<Vec<bool>> for BlockData {
    fn from(v: Vec<bool>) -> Self {
        Self::Bool(v)
    }
}
