//! Error types for grid construction and queries

use ecl_formats::block::ElementType;
use ecl_formats::file::FileError;
use thiserror::Error;

/// Errors that can occur when building or querying grids
#[derive(Debug, Error)]
pub enum GridError {
    /// A keyword required to build the grid is absent
    #[error("Required keyword {name} missing for grid {grid}")]
    MissingKeyword {
        /// Keyword name
        name: String,
        /// Grid number in file order (0 for the main grid)
        grid: usize,
    },

    /// Array length does not match the grid dimensions
    #[error("Size mismatch for {name}: expected {expected} elements, got {actual}")]
    SizeMismatch {
        /// Keyword or argument name
        name: String,
        /// Expected element count
        expected: usize,
        /// Actual element count
        actual: usize,
    },

    /// Keyword has an element type the grid cannot use
    #[error("Keyword {name} has type {found}, expected {expected}")]
    WrongType {
        /// Keyword name
        name: String,
        /// Type the grid needs
        expected: ElementType,
        /// Type found in the file
        found: ElementType,
    },

    /// Grid dimensions are negative
    #[error("Invalid grid dimensions {nx}x{ny}x{nz}")]
    InvalidDimensions {
        /// Cells along x
        nx: i32,
        /// Cells along y
        ny: i32,
        /// Cells along z
        nz: i32,
    },

    /// GRIDHEAD describes a grid type other than corner point
    #[error("Unsupported grid type {0}: only corner point grids are supported")]
    UnsupportedGridType(i32),

    /// An LGR with this number already exists in the tree
    #[error("Duplicate LGR number {0}")]
    DuplicateLgrNumber(i32),

    /// An LGR with this name already exists in the tree
    #[error("Duplicate LGR name {0}")]
    DuplicateLgrName(String),

    /// Refinements are numbered from 1; 0 is the host grid
    #[error("Invalid LGR number {0}: refinements are numbered from 1")]
    ReservedLgrNumber(i32),

    /// LGRPARNT names a grid that has not been loaded
    #[error("LGR {lgr} refers to unknown parent {parent}")]
    UnknownLgrParent {
        /// Name of the refinement
        lgr: String,
        /// Parent name
        parent: String,
    },

    /// A connection refers to an LGR number not present in the tree
    #[error("Unknown LGR number {0}")]
    UnknownLgr(i32),

    /// Index out of range
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Keyword file access failed
    #[error(transparent)]
    File(#[from] FileError),
}

/// Out-of-bounds cell addressing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// `(i, j, k)` lies outside the grid
    #[error("Cell ({i}, {j}, {k}) outside grid of {nx}x{ny}x{nz}")]
    Ijk {
        /// Requested i
        i: usize,
        /// Requested j
        j: usize,
        /// Requested k
        k: usize,
        /// Cells along x
        nx: usize,
        /// Cells along y
        ny: usize,
        /// Cells along z
        nz: usize,
    },

    /// Lower bound above upper bound
    #[error("Reversed {axis} range: {lower} > {upper}")]
    Reversed {
        /// Axis name
        axis: char,
        /// Lower bound
        lower: usize,
        /// Upper bound
        upper: usize,
    },

    /// Active index outside `[0, nactive)`
    #[error("Active index {index} outside [0, {nactive})")]
    Active {
        /// Requested active index
        index: u64,
        /// Number of active cells
        nactive: usize,
    },

    /// Global or file index outside `[0, size)`
    #[error("Cell index {index} outside grid of {size} cells")]
    Global {
        /// Requested index
        index: i64,
        /// Grid size
        size: usize,
    },
}

/// Type alias for grid results
pub type GridResult<T> = Result<T, GridError>;
