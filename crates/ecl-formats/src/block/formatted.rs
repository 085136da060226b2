//! Formatted (ASCII) block codec used by `.FEGRID`, `.FUNRST` and friends
//!
//! ```text
//!  'COORD   '          36 'REAL'
//!    0.10000000E+01   0.20000000E+01   0.00000000E+00   0.10000000E+01
//! ```
//!
//! Values are written in chunks of the binary block size, each chunk laid
//! out in lines of a type-specific column count. Floating point values use
//! the normalized `0.dddd` mantissa with an `E` (REAL) or `D` (DOUB)
//! exponent marker.

use crate::block::data::BlockData;
use crate::block::error::{BlockError, BlockResult};
use crate::block::types::{BlockName, ElementType};
use crate::block::{BlockHeader, TypedBlock};
use crate::record_io::RecordIo;
use std::fmt::Write as _;
use std::io::{BufRead, Seek, Write};

const TRUE_CHAR: &str = "T";
const FALSE_CHAR: &str = "F";

/// Split `x` into a mantissa in `[0.1, 1)` and a decimal exponent
fn scientific_split(x: f64) -> (f64, i32) {
    if x == 0.0 || !x.is_finite() {
        return (if x == 0.0 { 0.0 } else { x }, 0);
    }
    let mut pow = x.abs().log10().ceil() as i32;
    let mut arg = x / 10f64.powi(pow);
    if arg.abs() >= 1.0 {
        arg *= 0.1;
        pow += 1;
    }
    (arg, pow)
}

fn push_value(line: &mut String, data: &BlockData, index: usize) {
    // Writing into a String cannot fail
    let _ = match data {
        BlockData::Int(v) => write!(line, " {:>11}", v[index]),
        BlockData::Float(v) => {
            let (arg, pow) = scientific_split(f64::from(v[index]));
            write!(line, "  {arg:11.8}E{pow:+03}")
        }
        BlockData::Double(v) => {
            let (arg, pow) = scientific_split(v[index]);
            write!(line, "  {arg:17.14}D{pow:+03}")
        }
        BlockData::Bool(v) => write!(
            line,
            "  {}",
            if v[index] { TRUE_CHAR } else { FALSE_CHAR }
        ),
        BlockData::Char(v) => write!(line, " '{:<8}'", v[index]),
        BlockData::String { width, values } => {
            write!(line, " '{:<width$}'", values[index], width = usize::from(*width))
        }
        BlockData::Mess(_) => Ok(()),
    };
}

/// Header line for a block
pub(crate) fn header_line(header: &BlockHeader) -> String {
    let tag = header.element_type.tag();
    format!(
        " '{:<8}' {:>11} '{:<4}'",
        header.name.as_str(),
        header.count,
        String::from_utf8_lossy(&tag)
    )
}

pub(crate) fn write_block<S: Write + Seek>(
    block: &TypedBlock,
    io: &mut RecordIo<S>,
) -> BlockResult<()> {
    io.write_record(header_line(&block.header()).as_bytes())?;

    let data = block.data();
    if matches!(data, BlockData::Mess(_)) {
        return Ok(());
    }
    let element_type = data.element_type();
    let columns = element_type.columns();
    let count = data.len();
    let mut line = String::new();
    for chunk_start in (0..count).step_by(element_type.block_size()) {
        let chunk_end = (chunk_start + element_type.block_size()).min(count);
        for line_start in (chunk_start..chunk_end).step_by(columns) {
            line.clear();
            for index in line_start..(line_start + columns).min(chunk_end) {
                push_value(&mut line, data, index);
            }
            io.write_record(line.as_bytes())?;
        }
    }
    Ok(())
}

/// Split a formatted line into tokens; quoted tokens keep inner blanks
fn tokenize(line: &str) -> BlockResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut rest = line.trim_start();
    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('\'') {
            let end = quoted
                .find('\'')
                .ok_or_else(|| BlockError::Formatted(format!("unterminated quote in {line:?}")))?;
            tokens.push(quoted[..end].to_string());
            rest = quoted[end + 1..].trim_start();
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            tokens.push(rest[..end].to_string());
            rest = rest[end..].trim_start();
        }
    }
    Ok(tokens)
}

fn next_line<S: BufRead + Seek>(io: &mut RecordIo<S>) -> BlockResult<String> {
    let record = io.read_record()?;
    String::from_utf8(record).map_err(|e| BlockError::Formatted(e.to_string()))
}

pub(crate) fn read_header<S: BufRead + Seek>(io: &mut RecordIo<S>) -> BlockResult<BlockHeader> {
    let line = next_line(io)?;
    let tokens = tokenize(&line)?;
    let [name, count, tag] = tokens.as_slice() else {
        return Err(BlockError::Formatted(format!("malformed header line {line:?}")));
    };
    let name = BlockName::new(name.trim_end())?;
    let count: i64 = count
        .parse()
        .map_err(|_| BlockError::Formatted(format!("invalid element count {count:?}")))?;
    if count < 0 {
        return Err(BlockError::NegativeCount {
            name: name.to_string(),
            count: count as i32,
        });
    }
    let element_type = ElementType::from_tag(tag.as_bytes())?;
    Ok(BlockHeader {
        name,
        element_type,
        count: count as usize,
    })
}

fn parse_token(data: &mut BlockData, token: &str) -> BlockResult<()> {
    let kind = data.element_type();
    let bad = || BlockError::Formatted(format!("cannot parse {token:?} as {kind}"));
    match data {
        BlockData::Int(v) => v.push(token.parse().map_err(|_| bad())?),
        BlockData::Float(v) => {
            let value: f64 = token.parse().map_err(|_| bad())?;
            v.push(value as f32);
        }
        BlockData::Double(v) => {
            let value: f64 = token.replace(['D', 'd'], "E").parse().map_err(|_| bad())?;
            v.push(value);
        }
        BlockData::Bool(v) => v.push(match token {
            TRUE_CHAR => true,
            FALSE_CHAR => false,
            _ => return Err(bad()),
        }),
        BlockData::Char(v) | BlockData::String { values: v, .. } => {
            v.push(token.trim_end().to_string());
        }
        BlockData::Mess(n) => *n += 1,
    }
    Ok(())
}

pub(crate) fn read_data<S: BufRead + Seek>(
    io: &mut RecordIo<S>,
    header: &BlockHeader,
) -> BlockResult<BlockData> {
    if header.element_type == ElementType::Mess {
        return Ok(BlockData::Mess(header.count));
    }
    let element_type = header.element_type;
    let mut data =
        BlockData::with_capacity(element_type, header.count.min(element_type.block_size()));
    while data.len() < header.count {
        let line = next_line(io)?;
        for token in tokenize(&line)? {
            if data.len() == header.count {
                return Err(BlockError::DataOverflow {
                    name: header.name.to_string(),
                    count: header.count,
                    received: header.count + 1,
                });
            }
            parse_token(&mut data, &token)?;
        }
    }
    data.normalized()
}
