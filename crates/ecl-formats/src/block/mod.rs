//! Typed blocks (keywords) of ECLIPSE output files
//!
//! Every keyword in an ECLIPSE file is a named, typed, counted array. On
//! disk a block is one 16-byte header record followed by the data split
//! over several records:
//!
//! ```text
//! [header record: name[8] count:i32 type[4]]
//! [data record: <= 1000 numeric or <= 105 character elements]
//! [data record: ...]
//! ```
//!
//! # Example
//!
//! ```
//! use ecl_formats::block::{BlockData, TypedBlock};
//! use ecl_formats::record_io::RecordIo;
//! use std::io::Cursor;
//!
//! let poro = TypedBlock::new("PORO", BlockData::Float(vec![0.25; 1500])).expect("block");
//!
//! let mut io = RecordIo::new(Cursor::new(Vec::new()), false, true);
//! poro.write(&mut io).expect("write");
//! io.rewind().expect("rewind");
//!
//! let back = TypedBlock::read(&mut io).expect("read");
//! assert!(back.equal(&poro));
//! ```

mod data;
mod error;
mod formatted;
mod types;

pub use data::{BOOL_FALSE, BOOL_TRUE, BlockData};
pub use error::{BlockError, BlockResult};
pub use types::{BLOCKSIZE_CHAR, BLOCKSIZE_NUMERIC, BlockName, ElementType, NAME_LENGTH};

use crate::record_io::{MARKER_SIZE, RecordIo};
use binrw::{BinRead, BinWrite};
use std::io::{BufRead, Cursor, Seek, Write};

/// Size of the binary header record payload
pub const HEADER_RECORD_SIZE: usize = 16;

/// Raw binary header record
///
/// Byte order is supplied by the record handle at read/write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
pub(crate) struct HeaderRecord {
    /// Space padded keyword name
    pub name: [u8; NAME_LENGTH],
    /// Element count
    pub count: i32,
    /// Type tag
    pub tag: [u8; 4],
}

/// Decoded block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Keyword name
    pub name: BlockName,
    /// Element type
    pub element_type: ElementType,
    /// Element count
    pub count: usize,
}

impl BlockHeader {
    /// Number of data records used for this block in a binary file
    pub fn num_data_records(&self) -> usize {
        self.count.div_ceil(self.element_type.block_size())
    }

    /// Bytes the block occupies in a binary file, markers included
    pub fn fortio_size(&self) -> u64 {
        let marker_pair = 2 * MARKER_SIZE;
        let header = HEADER_RECORD_SIZE as u64 + marker_pair;
        let data = (self.count * self.element_type.element_size()) as u64;
        header + data + self.num_data_records() as u64 * marker_pair
    }

    fn to_record(self) -> BlockResult<HeaderRecord> {
        let count =
            i32::try_from(self.count).map_err(|_| BlockError::TooManyElements(self.count))?;
        Ok(HeaderRecord {
            name: *self.name.padded(),
            count,
            tag: self.element_type.tag(),
        })
    }
}

/// Named, typed, counted data block
#[derive(Debug, Clone, PartialEq)]
pub struct TypedBlock {
    name: BlockName,
    data: BlockData,
}

impl TypedBlock {
    /// Create a block, validating the name and string widths
    pub fn new(name: &str, data: BlockData) -> BlockResult<Self> {
        Ok(Self {
            name: BlockName::new(name)?,
            data: data.normalized()?,
        })
    }

    /// Create a block without elements
    pub fn empty(name: &str, element_type: ElementType) -> BlockResult<Self> {
        Self::new(name, BlockData::with_capacity(element_type, 0))
    }

    /// Block with `CHAR` values
    pub fn from_strings<I, T>(name: &str, values: I) -> BlockResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::new(
            name,
            BlockData::Char(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Keyword name without padding
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Keyword name
    pub const fn block_name(&self) -> &BlockName {
        &self.name
    }

    /// Element type
    pub const fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Number of elements
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Typed payload
    pub const fn data(&self) -> &BlockData {
        &self.data
    }

    /// Consume the block, returning its payload
    pub fn into_data(self) -> BlockData {
        self.data
    }

    /// Header describing this block
    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            name: self.name,
            element_type: self.element_type(),
            count: self.count(),
        }
    }

    /// `INTE` values
    pub fn as_int(&self) -> Option<&[i32]> {
        match &self.data {
            BlockData::Int(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// `REAL` values
    pub fn as_float(&self) -> Option<&[f32]> {
        match &self.data {
            BlockData::Float(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// `DOUB` values
    pub fn as_double(&self) -> Option<&[f64]> {
        match &self.data {
            BlockData::Double(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// `LOGI` values
    pub fn as_bool(&self) -> Option<&[bool]> {
        match &self.data {
            BlockData::Bool(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// `CHAR` or `C0nn` values, right-trimmed
    pub fn as_strings(&self) -> Option<&[String]> {
        match &self.data {
            BlockData::Char(v) | BlockData::String { values: v, .. } => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Element `index` as `f64`; `None` for character types or out of range
    pub fn get_as_f64(&self, index: usize) -> Option<f64> {
        self.data.get_as_f64(index)
    }

    /// Read the next block from a record handle
    ///
    /// A clean end of stream before the header surfaces as an error for
    /// which [`BlockError::is_eof`] is true.
    pub fn read<S: BufRead + Seek>(io: &mut RecordIo<S>) -> BlockResult<Self> {
        let header = Self::read_header(io)?;
        let data = Self::read_data(io, &header)?;
        Ok(Self {
            name: header.name,
            data,
        })
    }

    /// Read only the header of the next block
    pub fn read_header<S: BufRead + Seek>(io: &mut RecordIo<S>) -> BlockResult<BlockHeader> {
        if io.is_formatted() {
            return formatted::read_header(io);
        }

        let record = io.read_record()?;
        if record.len() != HEADER_RECORD_SIZE {
            return Err(BlockError::InvalidHeaderLength(record.len()));
        }
        let raw = HeaderRecord::read_options(&mut Cursor::new(&record), io.endian(), ())?;
        let name = BlockName::from_padded(raw.name)?;
        if raw.count < 0 {
            return Err(BlockError::NegativeCount {
                name: name.to_string(),
                count: raw.count,
            });
        }
        Ok(BlockHeader {
            name,
            element_type: ElementType::from_tag(&raw.tag)?,
            count: raw.count as usize,
        })
    }

    /// Read the data records following `header`
    pub fn read_data<S: BufRead + Seek>(
        io: &mut RecordIo<S>,
        header: &BlockHeader,
    ) -> BlockResult<BlockData> {
        if io.is_formatted() {
            return formatted::read_data(io, header);
        }

        let element_type = header.element_type;
        if element_type == ElementType::Mess {
            for _ in 0..header.num_data_records() {
                io.skip_record()?;
            }
            return Ok(BlockData::Mess(header.count));
        }
        // The count is untrusted until the records arrive
        let mut data =
            BlockData::with_capacity(element_type, header.count.min(element_type.block_size()));

        let element_size = element_type.element_size();
        while data.len() < header.count {
            let record = io.read_record()?;
            if record.len() % element_size != 0 {
                return Err(BlockError::RaggedRecord {
                    name: header.name.to_string(),
                    length: record.len(),
                    element_size,
                });
            }
            let received = data.len() + record.len() / element_size;
            if received > header.count || record.is_empty() {
                return Err(BlockError::DataOverflow {
                    name: header.name.to_string(),
                    count: header.count,
                    received,
                });
            }
            data.extend_from_record(&record, io.endian())?;
        }
        Ok(data)
    }

    /// Skip the data records following `header`, verifying their framing
    pub fn skip_data<S: BufRead + Seek>(
        io: &mut RecordIo<S>,
        header: &BlockHeader,
    ) -> BlockResult<()> {
        if io.is_formatted() {
            formatted::read_data(io, header)?;
            return Ok(());
        }

        let element_size = header.element_type.element_size();
        if element_size == 0 {
            for _ in 0..header.num_data_records() {
                io.skip_record()?;
            }
            return Ok(());
        }

        let mut received = 0;
        while received < header.count {
            let length = io.skip_record()?;
            if length % element_size != 0 {
                return Err(BlockError::RaggedRecord {
                    name: header.name.to_string(),
                    length,
                    element_size,
                });
            }
            received += length / element_size;
            if received > header.count || length == 0 {
                return Err(BlockError::DataOverflow {
                    name: header.name.to_string(),
                    count: header.count,
                    received,
                });
            }
        }
        Ok(())
    }

    /// Write the block to a record handle
    pub fn write<S: Write + Seek>(&self, io: &mut RecordIo<S>) -> BlockResult<()> {
        if io.is_formatted() {
            return formatted::write_block(self, io);
        }

        let raw = self.header().to_record()?;
        let mut header = Cursor::new(Vec::with_capacity(HEADER_RECORD_SIZE));
        raw.write_options(&mut header, io.endian(), ())?;
        io.write_record(header.get_ref())?;

        let count = self.count();
        let block_size = self.element_type().block_size();
        for start in (0..count).step_by(block_size) {
            let end = (start + block_size).min(count);
            let payload = self.data.encode_range(start..end, io.endian())?;
            io.write_record(&payload)?;
        }
        Ok(())
    }

    /// Bytes the block occupies in a binary file
    pub fn fortio_size(&self) -> u64 {
        self.header().fortio_size()
    }

    /// Name, type and data are all equal
    pub fn equal(&self, other: &Self) -> bool {
        self.name == other.name && self.content_equal(other)
    }

    /// Type and data are equal; the name is ignored
    pub fn content_equal(&self, other: &Self) -> bool {
        self.data.bitwise_eq(&other.data)
    }

    /// Tolerance comparison for floating point blocks
    ///
    /// Two values `a`, `b` are close when `|a - b| <= abs_tol` or
    /// `|a - b| <= rel_tol * max(|a|, |b|)`. Other types compare exactly.
    /// Names are not compared.
    pub fn numeric_equal(&self, other: &Self, abs_tol: f64, rel_tol: f64) -> bool {
        fn close(a: f64, b: f64, abs_tol: f64, rel_tol: f64) -> bool {
            let diff = (a - b).abs();
            diff <= abs_tol || diff <= rel_tol * a.abs().max(b.abs())
        }

        match (&self.data, &other.data) {
            (BlockData::Float(a), BlockData::Float(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| close(f64::from(*x), f64::from(*y), abs_tol, rel_tol))
            }
            (BlockData::Double(a), BlockData::Double(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| close(*x, *y, abs_tol, rel_tol))
            }
            _ => self.content_equal(other),
        }
    }

    /// Sum of all elements as `f64`; `None` for character types
    pub fn sum_as_f64(&self) -> Option<f64> {
        match &self.data {
            BlockData::Int(v) => Some(v.iter().map(|x| f64::from(*x)).sum()),
            BlockData::Float(v) => Some(v.iter().map(|x| f64::from(*x)).sum()),
            BlockData::Double(v) => Some(v.iter().sum()),
            BlockData::Bool(v) => Some(v.iter().filter(|b| **b).count() as f64),
            _ => None,
        }
    }

    /// `(max, min)` of a numeric block; `None` when empty or not numeric
    pub fn max_min_as_f64(&self) -> Option<(f64, f64)> {
        if !self.element_type().is_numeric() {
            return None;
        }
        (0..self.count())
            .filter_map(|i| self.get_as_f64(i))
            .fold(None, |acc, x| match acc {
                None => Some((x, x)),
                Some((max, min)) => Some((max.max(x), min.min(x))),
            })
    }

    /// New block holding elements `offset..offset + count` under `new_name`
    pub fn sub_copy(&self, new_name: &str, offset: usize, count: usize) -> BlockResult<Self> {
        Self::new(new_name, self.data.slice(offset, count)?)
    }
}
