//! Non-neighbour connections
//!
//! A [`ConnectionGraph`] keeps two views of the connections of a grid
//! tree:
//!
//! - the physical connections, one [`Connection`] per pair read, which
//!   [`ConnectionGraph::export_pairs`] returns in a stable order
//! - one [`NncVector`] per grid number listing the cells reached by those
//!   connections in insertion order, from which
//!   [`ConnectionGraph::finalize`] derives the sorted, deduplicated
//!   [`IndexList`]
//!
//! The graph refers to grids by number only and holds no reference to the
//! grid it was built from.

mod connection;
mod load;
mod vector;

pub use connection::{Connection, NncKind};
pub use vector::{IndexList, NncVector};

use std::collections::BTreeMap;
use std::ops::Range;

/// Connections read from one keyword pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment {
    pub(crate) kind: NncKind,
    pub(crate) pairs: Range<usize>,
    pub(crate) source_len: usize,
}

/// Connection graph of a grid tree
#[derive(Debug, Clone, Default)]
pub struct ConnectionGraph {
    vectors: BTreeMap<i32, NncVector>,
    pairs: Vec<Connection>,
    segments: Vec<Segment>,
}

impl ConnectionGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that cell `global_index` of grid `grid_nr` takes part in
    /// connection `nnc_index`
    pub fn add_connection(&mut self, grid_nr: i32, global_index: u64, nnc_index: u32) {
        self.vectors
            .entry(grid_nr)
            .or_default()
            .add(global_index, nnc_index);
    }

    /// Record a physical connection
    ///
    /// Both endpoints are appended to the lists of their grids, the first
    /// endpoint ahead of the second.
    pub fn add_pair(&mut self, connection: Connection) {
        self.add_connection(
            connection.grid_nr1,
            connection.global_index1,
            connection.input_order,
        );
        self.add_connection(
            connection.grid_nr2,
            connection.global_index2,
            connection.input_order,
        );
        self.pairs.push(connection);
    }

    /// Sorted, deduplicated cells of one grid, `None` if it has no entries
    pub fn finalize(&self, lgr_nr: i32) -> Option<IndexList> {
        self.vectors.get(&lgr_nr).map(NncVector::index_list)
    }

    /// Raw endpoint list of one grid
    pub fn raw(&self, lgr_nr: i32) -> Option<&NncVector> {
        self.vectors.get(&lgr_nr)
    }

    /// Grid numbers with at least one entry, ascending
    pub fn grid_numbers(&self) -> impl Iterator<Item = i32> + '_ {
        self.vectors.keys().copied()
    }

    /// Number of physical connections
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no connection has been recorded
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.vectors.is_empty()
    }

    /// Physical connections in insertion order
    pub fn pairs(&self) -> &[Connection] {
        &self.pairs
    }

    /// Physical connections ordered by grids, cells and input position
    pub fn export_pairs(&self) -> Vec<Connection> {
        let mut pairs = self.pairs.clone();
        pairs.sort_by(Connection::export_cmp);
        pairs
    }

    /// Structural equality
    ///
    /// Every grid must have the same finalized list and the same number of
    /// raw entries, and the exported connections must match exactly,
    /// including transmissibilities.
    pub fn equal(&self, other: &Self) -> bool {
        let same_grids = self.vectors.len() == other.vectors.len()
            && self.vectors.iter().all(|(nr, vector)| {
                other.vectors.get(nr).is_some_and(|theirs| {
                    vector.len() == theirs.len() && vector.index_list() == theirs.index_list()
                })
            });
        same_grids && self.export_pairs() == other.export_pairs()
    }

    /// Start a group of pairs read from one keyword pair
    pub(crate) fn begin_segment(&mut self, kind: NncKind, source_len: usize) {
        let start = self.pairs.len();
        self.segments.push(Segment {
            kind,
            pairs: start..start,
            source_len,
        });
    }

    /// Close the group opened by the last `begin_segment`
    pub(crate) fn end_segment(&mut self) {
        let end = self.pairs.len();
        if let Some(segment) = self.segments.last_mut() {
            segment.pairs.end = end;
        }
    }
}

impl PartialEq for ConnectionGraph {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}
