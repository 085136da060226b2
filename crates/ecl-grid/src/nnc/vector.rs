//! Per-grid connection endpoint lists

/// Sorted, duplicate-free list of cell indices
pub type IndexList = Vec<u64>;

/// Raw endpoint list of one grid
///
/// Entries stay in insertion order; `grid_index_list[n]` is the cell that
/// took part in connection `nnc_index_list[n]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NncVector {
    grid_index_list: Vec<u64>,
    nnc_index_list: Vec<u32>,
}

impl NncVector {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence
    pub fn add(&mut self, global_index: u64, nnc_index: u32) {
        self.grid_index_list.push(global_index);
        self.nnc_index_list.push(nnc_index);
    }

    /// Number of recorded occurrences
    pub fn len(&self) -> usize {
        self.grid_index_list.len()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.grid_index_list.is_empty()
    }

    /// Cell of every occurrence
    pub fn grid_index_list(&self) -> &[u64] {
        &self.grid_index_list
    }

    /// Connection number of every occurrence
    pub fn nnc_index_list(&self) -> &[u32] {
        &self.nnc_index_list
    }

    /// Participating cells, sorted and deduplicated
    pub fn index_list(&self) -> IndexList {
        let mut list = self.grid_index_list.clone();
        list.sort_unstable();
        list.dedup();
        list
    }
}
