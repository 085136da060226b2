//! Physical connections between two cells

use crate::keywords;
use std::cmp::Ordering;

/// One non-neighbour connection
///
/// Direction matters: `(a, b)` and `(b, a)` are different connections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Grid number of the first cell
    pub grid_nr1: i32,
    /// Global index of the first cell in its grid
    pub global_index1: u64,
    /// Grid number of the second cell
    pub grid_nr2: i32,
    /// Global index of the second cell in its grid
    pub global_index2: u64,
    /// Transmissibility, 0.0 until assigned
    pub transmissibility: f64,
    /// Position of the connection in its source keyword pair
    pub input_order: u32,
}

impl Connection {
    /// Connection with zero transmissibility
    pub const fn new(
        (grid_nr1, global_index1): (i32, u64),
        (grid_nr2, global_index2): (i32, u64),
        input_order: u32,
    ) -> Self {
        Self {
            grid_nr1,
            global_index1,
            grid_nr2,
            global_index2,
            transmissibility: 0.0,
            input_order,
        }
    }

    /// Key used to order exported connections
    pub const fn sort_key(&self) -> (i32, i32, u64, u64, u32) {
        (
            self.grid_nr1,
            self.grid_nr2,
            self.global_index1,
            self.global_index2,
            self.input_order,
        )
    }

    /// Export ordering: grids first, then cells, then input position
    pub fn export_cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Source keyword family of a group of connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NncKind {
    /// NNC1/NNC2: both cells in the same grid
    Normal,
    /// NNCG/NNCL: host grid to refinement
    GlobalToLocal,
    /// NNA1/NNA2: between two refinements
    Amalgamated,
}

impl NncKind {
    /// INIT keyword holding the transmissibilities of this family
    pub const fn transmissibility_keyword(self) -> &'static str {
        match self {
            Self::Normal => keywords::TRANNNC,
            Self::GlobalToLocal => keywords::TRANGL,
            Self::Amalgamated => keywords::TRANLL,
        }
    }
}
