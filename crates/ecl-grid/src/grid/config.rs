//! Grid loading options

use serde::{Deserialize, Serialize};

/// Options for building a grid from a keyword file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOptions {
    /// Transform corners to map coordinates with MAPAXES when present
    pub apply_mapaxes: bool,

    /// Read non-neighbour connections (NNCHEAD/NNCHEADA sections)
    pub load_nnc: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            apply_mapaxes: true,
            load_nnc: true,
        }
    }
}

impl GridOptions {
    /// Create options with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the MAPAXES transform
    #[must_use]
    pub const fn with_mapaxes(mut self, apply: bool) -> Self {
        self.apply_mapaxes = apply;
        self
    }

    /// Enable or disable loading of connections
    #[must_use]
    pub const fn with_nnc(mut self, load: bool) -> Self {
        self.load_nnc = load;
        self
    }
}
