//! Test utilities for format round-trip testing
//!
//! Shared helpers for the block and keyword file test modules.

use crate::EclFormat;
use crate::block::{BlockData, TypedBlock};
use std::fmt::Debug;

/// Build, parse and compare a format instance
pub fn test_round_trip<T>(original: &T) -> Result<(), Box<dyn std::error::Error>>
where
    T: EclFormat + Debug,
    T: RoundTripEq,
{
    let data = original.build()?;
    let parsed = T::parse(&data)?;

    if !original.round_trip_eq(&parsed) {
        return Err(format!(
            "Round-trip verification failed:\nOriginal: {:?}\nParsed: {:?}",
            original, parsed
        )
        .into());
    }

    // Building the parsed value again must reproduce the same bytes
    T::verify_round_trip(&data)
}

/// Equality used by [`test_round_trip`]
pub trait RoundTripEq {
    /// True when `other` is an exact copy
    fn round_trip_eq(&self, other: &Self) -> bool;
}

impl RoundTripEq for TypedBlock {
    fn round_trip_eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl RoundTripEq for crate::KeywordFile {
    fn round_trip_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && (0..self.len()).all(|i| match (self.iget(i), other.iget(i)) {
                (Ok(a), Ok(b)) => a.equal(b),
                _ => false,
            })
    }
}

/// A block of every element type
pub fn one_of_each_type() -> Vec<TypedBlock> {
    vec![
        TypedBlock::new("INTEHEAD", BlockData::Int((0..95).collect())).unwrap(),
        TypedBlock::new("PORO", BlockData::Float(vec![0.2; 1001])).unwrap(),
        TypedBlock::new("DEPTH", BlockData::Double(vec![1000.5, 1001.5])).unwrap(),
        TypedBlock::new("LOGIHEAD", BlockData::Bool(vec![true, false, false, true])).unwrap(),
        TypedBlock::from_strings("KEYWORDS", ["PORO", "PERMX", "", "NTG"]).unwrap(),
        TypedBlock::new(
            "LGRNAMES",
            BlockData::String {
                width: 12,
                values: vec!["LGR_NORTH".into(), "CARFIN".into()],
            },
        )
        .unwrap(),
        TypedBlock::empty("ENDSOL", crate::ElementType::Mess).unwrap(),
    ]
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::KeywordFile;

    #[test]
    fn test_every_type_round_trips() {
        for block in one_of_each_type() {
            test_round_trip(&block).expect("Test operation should succeed");
        }
    }

    #[test]
    fn test_keyword_file_round_trips() {
        let file = KeywordFile::from_blocks(one_of_each_type());
        test_round_trip(&file).expect("Test operation should succeed");
    }
}
