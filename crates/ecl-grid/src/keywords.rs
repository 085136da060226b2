//! Keyword names and layout constants of grid and INIT files

use crate::error::{GridError, GridResult};
use ecl_formats::block::{ElementType, TypedBlock};
use ecl_formats::file::KeywordView;

pub const FILEHEAD: &str = "FILEHEAD";
pub const GRIDHEAD: &str = "GRIDHEAD";
pub const COORD: &str = "COORD";
pub const ZCORN: &str = "ZCORN";
pub const ACTNUM: &str = "ACTNUM";
pub const MAPAXES: &str = "MAPAXES";
pub const LGR: &str = "LGR";
pub const LGRPARNT: &str = "LGRPARNT";
pub const HOSTNUM: &str = "HOSTNUM";

pub const NNCHEAD: &str = "NNCHEAD";
pub const NNCHEADA: &str = "NNCHEADA";
pub const NNC1: &str = "NNC1";
pub const NNC2: &str = "NNC2";
pub const NNCG: &str = "NNCG";
pub const NNCL: &str = "NNCL";
pub const NNA1: &str = "NNA1";
pub const NNA2: &str = "NNA2";

pub const TRANNNC: &str = "TRANNNC";
pub const TRANGL: &str = "TRANGL";
pub const TRANLL: &str = "TRANLL";

pub const FILEHEAD_DUALP_INDEX: usize = 5;

pub const GRIDHEAD_TYPE_INDEX: usize = 0;
pub const GRIDHEAD_NX_INDEX: usize = 1;
pub const GRIDHEAD_NY_INDEX: usize = 2;
pub const GRIDHEAD_NZ_INDEX: usize = 3;
pub const GRIDHEAD_LGR_INDEX: usize = 4;
pub const GRIDHEAD_CORNERPOINT: i32 = 1;

pub const NNCHEAD_LGR_INDEX: usize = 1;
pub const NNCHEADA_ILOC1_INDEX: usize = 0;
pub const NNCHEADA_ILOC2_INDEX: usize = 1;

/// Integer payload of a block
pub fn int_values(block: &TypedBlock) -> GridResult<&[i32]> {
    block.as_int().ok_or_else(|| GridError::WrongType {
        name: block.name().to_string(),
        expected: ElementType::Int,
        found: block.element_type(),
    })
}

/// Float or double payload of a block widened to f64
pub fn real_values(block: &TypedBlock) -> GridResult<Vec<f64>> {
    if let Some(values) = block.as_float() {
        Ok(values.iter().map(|&v| f64::from(v)).collect())
    } else if let Some(values) = block.as_double() {
        Ok(values.to_vec())
    } else {
        Err(GridError::WrongType {
            name: block.name().to_string(),
            expected: ElementType::Float,
            found: block.element_type(),
        })
    }
}

/// Element `index` of an integer header block
pub fn header_item(block: &TypedBlock, index: usize) -> GridResult<i32> {
    let values = int_values(block)?;
    values
        .get(index)
        .copied()
        .ok_or_else(|| GridError::SizeMismatch {
            name: block.name().to_string(),
            expected: index + 1,
            actual: values.len(),
        })
}

/// First occurrence of `name` in a view, as a grid error when absent
pub fn required<'a>(view: &KeywordView<'a>, name: &str, grid: usize) -> GridResult<&'a TypedBlock> {
    if view.has(name) {
        Ok(view.get(name, 0)?)
    } else {
        Err(GridError::MissingKeyword {
            name: name.to_string(),
            grid,
        })
    }
}

/// First occurrence of `name` in a view, if present
pub fn optional<'a>(view: &KeywordView<'a>, name: &str) -> GridResult<Option<&'a TypedBlock>> {
    if view.has(name) {
        Ok(Some(view.get(name, 0)?))
    } else {
        Ok(None)
    }
}
