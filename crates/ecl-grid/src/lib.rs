//! Corner-point grids and their connections for ECLIPSE reservoir models
//!
#![allow(clippy::cast_possible_wrap)] // Cell counts fit in i64
#![allow(clippy::cast_precision_loss)] // Cell indices scaled to coordinates
#![allow(clippy::float_cmp)] // Exact transmissibility comparisons are intended
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::too_many_arguments)] // ijk box bounds
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate builds [`CornerPointGrid`]s from geometry keywords or from
//! EGRID keyword files read with `ecl-formats`.
//!
//! # Components
//!
//! - **grid**: cell corners, activity flags, the active/global bijection
//!   for matrix and fracture cells, and the tree of local refinements
//! - **egrid**: loading a whole grid tree (and its connections) from an
//!   EGRID file
//! - **nnc**: non-neighbour connections as per-grid cell lists plus the
//!   exportable physical connection pairs
//! - **region**: read-only cell selections
//!
//! # Example
//!
//! ```no_run
//! use ecl_grid::{CornerPointGrid, GridOptions, RegionSelector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grid = CornerPointGrid::open("CASE.EGRID", &GridOptions::default())?;
//! let mut region = RegionSelector::new(&grid, false);
//! region.select_ijk_range(0, 9, 0, 9, 0, 0)?;
//! println!("{} active cells in the top layer box", region.active_list().len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod egrid;
pub mod error;
pub mod grid;
mod keywords;
pub mod nnc;
pub mod region;

pub use error::{GridError, GridResult, RangeError};
pub use grid::{ActiveFlag, CornerPointGrid, GridOptions, MapAxes, Point, Porosity};
pub use nnc::{Connection, ConnectionGraph, IndexList, NncVector};
pub use region::RegionSelector;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_shared_types_are_thread_safe() {
        assert_send_sync::<CornerPointGrid>();
        assert_send_sync::<ConnectionGraph>();
    }
}
