//! Grdecl text codec
//!
//! Grdecl is the keyword/value text format of ECLIPSE input decks:
//!
//! ```text
//! -- porosity of the top layer
//! PORO
//!   3*0.25 0.30
//!   0.18 /
//! ```
//!
//! Values are whitespace separated, `--` starts a comment, `N*value`
//! repeats a value `N` times and `/` ends the keyword. The terminator may
//! be glued to the last value (`0.18/`) and must be present. Logical values
//! are `1`/`0` or `T`/`F`; string values are quoted (`2*'PROD 1'`).
//!
//! # Example
//!
//! ```
//! use ecl_formats::block::{ElementType, TypedBlock};
//!
//! let poro = TypedBlock::from_grdecl("PORO\n 3*0.25 0.3 /\n", "PORO", 4, ElementType::Float)
//!     .expect("parse");
//! assert_eq!(poro.as_float(), Some(&[0.25f32, 0.25, 0.25, 0.3][..]));
//!
//! let text = poro.to_grdecl();
//! let back = TypedBlock::from_grdecl(&text, "PORO", 4, ElementType::Float).expect("parse");
//! assert!(back.content_equal(&poro));
//! ```

mod error;

pub use error::{GrdeclError, GrdeclResult};

use crate::block::{BlockData, ElementType, TypedBlock};
use std::fmt::Write as _;

const COMMENT: &str = "--";
const TERMINATOR: char = '/';
const QUOTE: char = '\'';

/// Values per line in generated text
const COLUMNS: usize = 6;

/// Largest element count a block header can carry
const MAX_VALUES: usize = i32::MAX as usize;

fn strip_comment(line: &str) -> &str {
    line.find(COMMENT).map_or(line, |pos| &line[..pos])
}

/// Byte length of the token opening `text`
///
/// Whitespace, a terminator or a comment outside quotes ends the token.
/// `None` when a quote is left open.
fn token_len(text: &str) -> Option<usize> {
    let mut quoted = false;
    for (pos, c) in text.char_indices() {
        if c == QUOTE {
            quoted = !quoted;
        } else if !quoted
            && (c == TERMINATOR || c.is_whitespace() || text[pos..].starts_with(COMMENT))
        {
            return Some(pos);
        }
    }
    (!quoted).then_some(text.len())
}

/// Value tokens of one keyword, up to its terminator
///
/// A leading token equal to `name` is skipped. Quoted tokens keep their
/// quotes. Text without a `/` outside quotes and comments is rejected.
fn value_tokens<'a>(text: &'a str, name: &str) -> GrdeclResult<Vec<&'a str>> {
    let mut tokens = Vec::new();
    let mut first = true;
    for line in text.lines() {
        let mut rest = line.trim_start();
        while !rest.is_empty() && !rest.starts_with(COMMENT) {
            if rest.starts_with(TERMINATOR) {
                return Ok(tokens);
            }
            let len = token_len(rest).ok_or_else(|| invalid(name, rest))?;
            let token = &rest[..len];
            rest = rest[len..].trim_start();
            if std::mem::take(&mut first) && token == name {
                continue;
            }
            tokens.push(token);
        }
    }
    Err(GrdeclError::MissingTerminator(name.to_string()))
}

fn invalid(name: &str, token: &str) -> GrdeclError {
    GrdeclError::InvalidToken {
        name: name.to_string(),
        token: token.to_string(),
    }
}

/// Split `N*value` into its repeat count and value
fn split_repeat<'a>(name: &str, token: &'a str) -> GrdeclResult<(usize, &'a str)> {
    match token.split_once('*') {
        Some((count, value)) if !count.starts_with(QUOTE) => {
            let count: usize = count.parse().map_err(|_| invalid(name, token))?;
            if count == 0 || value.is_empty() {
                return Err(invalid(name, token));
            }
            Ok((count, value))
        }
        _ => Ok((1, token)),
    }
}

/// Expand repeats, refusing to grow past `limit` values
fn expand<T, F>(name: &str, tokens: &[&str], limit: usize, parse: F) -> GrdeclResult<Vec<T>>
where
    T: Clone,
    F: Fn(&str) -> Option<T>,
{
    let mut values = Vec::new();
    let mut total = 0usize;
    for token in tokens {
        let (repeat, value) = split_repeat(name, token)?;
        let value = parse(value).ok_or_else(|| invalid(name, token))?;
        total = total.saturating_add(repeat);
        if total > limit {
            return Err(GrdeclError::SizeMismatch {
                name: name.to_string(),
                expected: limit,
                actual: total,
            });
        }
        values.extend(std::iter::repeat_n(value, repeat));
    }
    Ok(values)
}

fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "1" | "T" | "t" => Some(true),
        "0" | "F" | "f" => Some(false),
        _ => None,
    }
}

/// Contents of a quoted string token; bare words are taken as they are
fn parse_string(token: &str) -> Option<String> {
    match token.strip_prefix(QUOTE) {
        Some(quoted) => quoted
            .strip_suffix(QUOTE)
            .filter(|inner| !inner.contains(QUOTE))
            .map(str::to_string),
        None => (!token.contains(QUOTE)).then(|| token.to_string()),
    }
}

fn parse_values(
    text: &str,
    name: &str,
    element_type: ElementType,
    limit: usize,
) -> GrdeclResult<BlockData> {
    let tokens = value_tokens(text, name)?;
    let numeric = |t: &str| t.replace(['D', 'd'], "E");
    match element_type {
        ElementType::Int => Ok(BlockData::Int(expand(name, &tokens, limit, |t| {
            t.parse().ok()
        })?)),
        ElementType::Float => Ok(BlockData::Float(expand(name, &tokens, limit, |t| {
            numeric(t).parse().ok()
        })?)),
        ElementType::Double => Ok(BlockData::Double(expand(name, &tokens, limit, |t| {
            numeric(t).parse().ok()
        })?)),
        ElementType::Bool => Ok(BlockData::Bool(expand(name, &tokens, limit, parse_bool)?)),
        ElementType::Char => Ok(BlockData::Char(expand(name, &tokens, limit, parse_string)?)),
        ElementType::String(width) => Ok(BlockData::String {
            width,
            values: expand(name, &tokens, limit, parse_string)?,
        }),
        ElementType::Mess => Err(GrdeclError::UnsupportedType {
            name: name.to_string(),
            element_type,
        }),
    }
}

/// Locate keyword `name` in a multi-keyword document
///
/// The keyword must be the first token on its line. Returns the text from
/// the keyword token to the end of the document.
pub fn find_keyword<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let content = strip_comment(line);
        if content.split_whitespace().next() == Some(name) {
            let start = offset + (content.len() - content.trim_start().len());
            return Some(&text[start..]);
        }
        offset += line.len();
    }
    None
}

/// Find and parse keyword `name`, taking the count from the data
pub fn parse_keyword(text: &str, name: &str, element_type: ElementType) -> GrdeclResult<TypedBlock> {
    let section =
        find_keyword(text, name).ok_or_else(|| GrdeclError::KeywordNotFound(name.to_string()))?;
    let data = parse_values(section, name, element_type, MAX_VALUES)?;
    Ok(TypedBlock::new(name, data)?)
}

fn push_line<T, F>(out: &mut String, values: &[T], fmt: F)
where
    F: Fn(&mut String, &T),
{
    for chunk in values.chunks(COLUMNS) {
        for value in chunk {
            fmt(out, value);
        }
        out.push('\n');
    }
}

impl TypedBlock {
    /// Parse grdecl text holding exactly `count` values of `element_type`
    ///
    /// A leading keyword token equal to `name` is optional.
    pub fn from_grdecl(
        text: &str,
        name: &str,
        count: usize,
        element_type: ElementType,
    ) -> GrdeclResult<Self> {
        let data = parse_values(text, name, element_type, count)?;
        if data.len() != count {
            return Err(GrdeclError::SizeMismatch {
                name: name.to_string(),
                expected: count,
                actual: data.len(),
            });
        }
        Ok(Self::new(name, data)?)
    }

    /// Render as grdecl text
    ///
    /// Floating point values use the shortest representation that parses
    /// back to the same bits.
    pub fn to_grdecl(&self) -> String {
        let mut out = String::new();
        out.push_str(self.name());
        out.push('\n');
        // Writing into a String cannot fail
        match self.data() {
            BlockData::Int(v) => push_line(&mut out, v, |o, x| {
                let _ = write!(o, " {x:>11}");
            }),
            BlockData::Float(v) => push_line(&mut out, v, |o, x| {
                let _ = write!(o, " {x:>15e}");
            }),
            BlockData::Double(v) => push_line(&mut out, v, |o, x| {
                let _ = write!(o, " {x:>23e}");
            }),
            BlockData::Bool(v) => push_line(&mut out, v, |o, x| {
                let _ = write!(o, " {:>2}", i32::from(*x));
            }),
            BlockData::Char(v) | BlockData::String { values: v, .. } => {
                push_line(&mut out, v, |o, x| {
                    let _ = write!(o, " '{x}'");
                });
            }
            BlockData::Mess(_) => {}
        }
        out.push(TERMINATOR);
        out.push('\n');
        out
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_repeat_and_comments() {
        let text = "-- header comment\nPERMX -- trailing\n 2*100 50\n\n 3*1.5/\n";
        let block = TypedBlock::from_grdecl(text, "PERMX", 6, ElementType::Double).unwrap();
        assert_eq!(
            block.as_double().unwrap(),
            &[100.0, 100.0, 50.0, 1.5, 1.5, 1.5]
        );
    }

    #[test]
    fn test_without_keyword_line() {
        let block = TypedBlock::from_grdecl("1 2 3 /", "ACTNUM", 3, ElementType::Int).unwrap();
        assert_eq!(block.as_int().unwrap(), &[1, 2, 3]);
        assert_eq!(block.name(), "ACTNUM");
    }

    #[test]
    fn test_size_mismatch() {
        let err = TypedBlock::from_grdecl("PORO\n 4*0.2 /", "PORO", 5, ElementType::Float)
            .unwrap_err();
        assert!(matches!(
            err,
            GrdeclError::SizeMismatch {
                expected: 5,
                actual: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_tokens() {
        for text in ["1 x 3 /", "0*4 /", "3* /", "1.5 /"] {
            let err = TypedBlock::from_grdecl(text, "ACTNUM", 3, ElementType::Int).unwrap_err();
            assert!(matches!(err, GrdeclError::InvalidToken { .. }), "{text}: {err}");
        }
    }

    #[test]
    fn test_find_in_document() {
        let doc = "SPECGRID\n 2 1 1 1 F /\n\nPORO\n 0.1 0.2 /\n  NTG\n 1*1.0 0.5/\n";
        let ntg = parse_keyword(doc, "NTG", ElementType::Float).unwrap();
        assert_eq!(ntg.as_float().unwrap(), &[1.0, 0.5]);
        let poro = parse_keyword(doc, "PORO", ElementType::Float).unwrap();
        assert_eq!(poro.count(), 2);
        assert!(matches!(
            parse_keyword(doc, "PERMX", ElementType::Float),
            Err(GrdeclError::KeywordNotFound(_))
        ));
        assert!(find_keyword(doc, "PORO").unwrap().starts_with("PORO\n"));
    }

    #[test]
    fn test_layout() {
        let block = TypedBlock::new("ACTNUM", BlockData::Int((0..8).collect())).unwrap();
        let text = block.to_grdecl();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "ACTNUM");
        assert_eq!(lines[1].len(), 6 * 12);
        assert_eq!(lines[3], "/");
    }

    #[test]
    fn test_float_round_trip_is_exact() {
        let values = vec![0.1f32, -2.5e-7, 3.402_823_5e38, 1.0 / 3.0, -0.0];
        let block = TypedBlock::new("SWL", BlockData::Float(values)).unwrap();
        let back = TypedBlock::from_grdecl(&block.to_grdecl(), "SWL", 5, ElementType::Float)
            .unwrap();
        assert!(back.content_equal(&block));
    }

    #[test]
    fn test_missing_terminator() {
        for text in ["PORO\n 0.1 0.2 0.3\n", "PORO\n 0.1 0.2 0.3 -- no end /\n", ""] {
            let err = TypedBlock::from_grdecl(text, "PORO", 3, ElementType::Float).unwrap_err();
            assert!(matches!(err, GrdeclError::MissingTerminator(_)), "{text:?}: {err}");
        }
        let doc = "PORO\n 0.1 0.2\nNTG\n 1.0 1.0 /\n";
        let block = parse_keyword(doc, "NTG", ElementType::Float).unwrap();
        assert_eq!(block.count(), 2);
        assert!(matches!(
            parse_keyword("NTG\n 1.0 1.0\n", "NTG", ElementType::Float),
            Err(GrdeclError::MissingTerminator(_))
        ));
    }

    #[test]
    fn test_repeat_is_bounded_by_count() {
        let err = TypedBlock::from_grdecl("PORO\n 4000000000000*1 /", "PORO", 3, ElementType::Int)
            .unwrap_err();
        assert!(matches!(
            err,
            GrdeclError::SizeMismatch {
                expected: 3,
                actual: 4_000_000_000_000,
                ..
            }
        ));

        let err = TypedBlock::from_grdecl(
            &format!("PORO\n 2*1 {}*1 /", usize::MAX),
            "PORO",
            3,
            ElementType::Int,
        )
        .unwrap_err();
        assert!(matches!(err, GrdeclError::SizeMismatch { expected: 3, .. }));

        let err = parse_keyword("ACTNUM\n 9000000000*1 /", "ACTNUM", ElementType::Int).unwrap_err();
        assert!(matches!(err, GrdeclError::SizeMismatch { .. }));
    }

    #[test]
    fn test_logical_values() {
        let block =
            TypedBlock::from_grdecl("FLAGS\n 1 0 T F 2*1 t /", "FLAGS", 7, ElementType::Bool)
                .unwrap();
        assert_eq!(
            block.data(),
            &BlockData::Bool(vec![true, false, true, false, true, true, true])
        );
        let err = TypedBlock::from_grdecl("2 /", "FLAGS", 1, ElementType::Bool).unwrap_err();
        assert!(matches!(err, GrdeclError::InvalidToken { .. }));
    }

    #[test]
    fn test_quoted_strings() {
        let text = "WELLS\n 'PROD 1' 2*'INJ/2' -- wells\n 'A--B' '' BARE/\n";
        let block = TypedBlock::from_grdecl(text, "WELLS", 6, ElementType::Char).unwrap();
        assert_eq!(
            block.data(),
            &BlockData::Char(
                ["PROD 1", "INJ/2", "INJ/2", "A--B", "", "BARE"]
                    .map(String::from)
                    .to_vec()
            )
        );

        let text = "NAMES\n 'a*b   ' 'long name' /";
        let block = TypedBlock::from_grdecl(text, "NAMES", 2, ElementType::String(12)).unwrap();
        assert_eq!(
            block.data(),
            &BlockData::String {
                width: 12,
                values: vec!["a*b".to_string(), "long name".to_string()],
            }
        );
    }

    #[test]
    fn test_bad_strings() {
        let err = TypedBlock::from_grdecl("WELLS 'open /", "WELLS", 1, ElementType::Char)
            .unwrap_err();
        assert!(matches!(err, GrdeclError::InvalidToken { .. }), "{err}");

        let err = TypedBlock::from_grdecl("'TOO LONG NAME' /", "WELLS", 1, ElementType::Char)
            .unwrap_err();
        assert!(matches!(err, GrdeclError::Block(_)), "{err}");
    }

    #[test]
    fn test_string_round_trip() {
        let block = TypedBlock::from_strings("WELLS", ["P1", "INJ 2", "", "A/B"]).unwrap();
        let back =
            TypedBlock::from_grdecl(&block.to_grdecl(), "WELLS", 4, ElementType::Char).unwrap();
        assert!(back.content_equal(&block));
    }

    #[test]
    fn test_unsupported_type() {
        assert!(matches!(
            TypedBlock::from_grdecl("1 /", "MESS", 1, ElementType::Mess),
            Err(GrdeclError::UnsupportedType { .. })
        ));
    }
}
