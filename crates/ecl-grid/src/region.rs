//! Cell subsets of a grid
//!
//! A [`RegionSelector`] is a boolean mask over the global cells of one
//! grid. It never modifies the grid. Index lists are built on first use
//! and dropped by every mutation.

use crate::error::{GridError, GridResult, RangeError};
use crate::grid::CornerPointGrid;
use ecl_formats::block::TypedBlock;
use std::cell::OnceCell;

/// Selection of cells of one grid
#[derive(Debug, Clone)]
pub struct RegionSelector<'a> {
    grid: &'a CornerPointGrid,
    selected: Vec<bool>,
    global_list: OnceCell<Vec<u64>>,
    active_list: OnceCell<Vec<u64>>,
    global_active_list: OnceCell<Vec<u64>>,
}

impl<'a> RegionSelector<'a> {
    /// Region over `grid` with every cell selected or none
    pub fn new(grid: &'a CornerPointGrid, preselect: bool) -> Self {
        Self {
            grid,
            selected: vec![preselect; grid.size()],
            global_list: OnceCell::new(),
            active_list: OnceCell::new(),
            global_active_list: OnceCell::new(),
        }
    }

    /// Grid the region belongs to
    pub const fn grid(&self) -> &'a CornerPointGrid {
        self.grid
    }

    fn invalidate(&mut self) {
        self.global_list.take();
        self.active_list.take();
        self.global_active_list.take();
    }

    fn set_where<F>(&mut self, value: bool, mut predicate: F)
    where
        F: FnMut(u64) -> bool,
    {
        for (global, selected) in self.selected.iter_mut().enumerate() {
            if predicate(global as u64) {
                *selected = value;
            }
        }
        self.invalidate();
    }

    /// Select every cell
    pub fn select_all(&mut self) {
        self.set_where(true, |_| true);
    }

    /// Deselect every cell
    pub fn deselect_all(&mut self) {
        self.set_where(false, |_| true);
    }

    /// Flip the selection of every cell
    pub fn invert(&mut self) {
        for selected in &mut self.selected {
            *selected = !*selected;
        }
        self.invalidate();
    }

    /// Select the box `[i1, i2] x [j1, j2] x [k1, k2]`, bounds inclusive
    pub fn select_ijk_range(
        &mut self,
        i1: usize,
        i2: usize,
        j1: usize,
        j2: usize,
        k1: usize,
        k2: usize,
    ) -> Result<&mut Self, RangeError> {
        let inside = ijk_box(self.grid, (i1, i2), (j1, j2), (k1, k2))?;
        self.set_where(true, inside);
        Ok(self)
    }

    /// Deselect the box `[i1, i2] x [j1, j2] x [k1, k2]`, bounds inclusive
    pub fn deselect_ijk_range(
        &mut self,
        i1: usize,
        i2: usize,
        j1: usize,
        j2: usize,
        k1: usize,
        k2: usize,
    ) -> Result<&mut Self, RangeError> {
        let inside = ijk_box(self.grid, (i1, i2), (j1, j2), (k1, k2))?;
        self.set_where(false, inside);
        Ok(self)
    }

    /// Select every active cell
    pub fn select_active(&mut self) {
        let grid = self.grid;
        self.set_where(true, |global| grid.is_active(global));
    }

    /// Select every inactive cell
    pub fn select_inactive(&mut self) {
        let grid = self.grid;
        self.set_where(true, |global| !grid.is_active(global));
    }

    /// Select cells for which `predicate(global)` holds
    pub fn select_by<F: FnMut(u64) -> bool>(&mut self, predicate: F) {
        self.set_where(true, predicate);
    }

    /// Deselect cells for which `predicate(global)` holds
    pub fn deselect_by<F: FnMut(u64) -> bool>(&mut self, predicate: F) {
        self.set_where(false, predicate);
    }

    /// Per-cell values of a block sized to the grid or its active cells
    ///
    /// Inactive cells of an active-sized block read as `None`.
    fn cell_values<T: Copy>(&self, name: &str, values: &[T]) -> GridResult<Vec<Option<T>>> {
        let grid = self.grid;
        if values.len() == grid.size() {
            Ok(values.iter().copied().map(Some).collect())
        } else if values.len() == grid.nactive() {
            Ok((0..grid.size() as u64)
                .map(|global| {
                    grid.active_index(global)
                        .map(|active| values[active as usize])
                })
                .collect())
        } else {
            Err(GridError::SizeMismatch {
                name: name.to_string(),
                expected: grid.size(),
                actual: values.len(),
            })
        }
    }

    /// Select cells where an integer block equals `value`
    pub fn select_int_equal(&mut self, block: &TypedBlock, value: i32) -> GridResult<()> {
        let values = crate::keywords::int_values(block)?;
        let per_cell = self.cell_values(block.name(), values)?;
        self.set_where(true, |global| per_cell[global as usize] == Some(value));
        Ok(())
    }

    /// Select cells where a numeric block lies in `[lower, upper)`
    pub fn select_in_range(&mut self, block: &TypedBlock, lower: f64, upper: f64) -> GridResult<()> {
        let values: Vec<f64> = match block.as_int() {
            Some(ints) => ints.iter().map(|&v| f64::from(v)).collect(),
            None => crate::keywords::real_values(block)?,
        };
        let per_cell = self.cell_values(block.name(), &values)?;
        self.set_where(true, |global| {
            per_cell[global as usize].is_some_and(|v| v >= lower && v < upper)
        });
        Ok(())
    }

    fn check_same_grid(&self, other: &Self) -> GridResult<()> {
        if self.selected.len() == other.selected.len() {
            Ok(())
        } else {
            Err(GridError::SizeMismatch {
                name: "region".to_string(),
                expected: self.selected.len(),
                actual: other.selected.len(),
            })
        }
    }

    /// Add every cell selected in `other`
    pub fn union(&mut self, other: &Self) -> GridResult<()> {
        self.check_same_grid(other)?;
        self.set_where(true, |global| other.selected[global as usize]);
        Ok(())
    }

    /// Keep only cells also selected in `other`
    pub fn intersect(&mut self, other: &Self) -> GridResult<()> {
        self.check_same_grid(other)?;
        self.set_where(false, |global| !other.selected[global as usize]);
        Ok(())
    }

    /// True when the cell is selected; out-of-range cells are not
    pub fn contains(&self, global: u64) -> bool {
        usize::try_from(global)
            .ok()
            .and_then(|g| self.selected.get(g))
            .copied()
            .unwrap_or(false)
    }

    /// True when cell `(i, j, k)` is selected
    pub fn contains_ijk(&self, i: usize, j: usize, k: usize) -> Result<bool, RangeError> {
        Ok(self.contains(self.grid.global_index(i, j, k)?))
    }

    /// Number of selected cells
    pub fn len(&self) -> usize {
        self.global_list().len()
    }

    /// True when nothing is selected
    pub fn is_empty(&self) -> bool {
        self.global_list().is_empty()
    }

    /// Global indices of the selected cells
    pub fn global_list(&self) -> &[u64] {
        self.global_list.get_or_init(|| {
            self.selected
                .iter()
                .enumerate()
                .filter(|(_, selected)| **selected)
                .map(|(global, _)| global as u64)
                .collect()
        })
    }

    /// Active indices of the selected active cells
    pub fn active_list(&self) -> &[u64] {
        self.active_list.get_or_init(|| {
            self.global_list()
                .iter()
                .filter_map(|&global| self.grid.active_index(global))
                .collect()
        })
    }

    /// Global indices of the selected active cells
    pub fn global_active_list(&self) -> &[u64] {
        self.global_active_list.get_or_init(|| {
            self.global_list()
                .iter()
                .copied()
                .filter(|&global| self.grid.is_active(global))
                .collect()
        })
    }
}

/// Membership test for an inclusive ijk box, checked against the grid
fn ijk_box(
    grid: &CornerPointGrid,
    (i1, i2): (usize, usize),
    (j1, j2): (usize, usize),
    (k1, k2): (usize, usize),
) -> Result<impl Fn(u64) -> bool + '_, RangeError> {
    for (axis, lower, upper) in [('i', i1, i2), ('j', j1, j2), ('k', k1, k2)] {
        if lower > upper {
            return Err(RangeError::Reversed { axis, lower, upper });
        }
    }
    grid.global_index(i1, j1, k1)?;
    grid.global_index(i2, j2, k2)?;

    Ok(move |global| {
        grid.ijk(global).is_ok_and(|(i, j, k)| {
            (i1..=i2).contains(&i) && (j1..=j2).contains(&j) && (k1..=k2).contains(&k)
        })
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use ecl_formats::block::BlockData;

    fn grid() -> CornerPointGrid {
        // 3x2x2 with the middle column of the top layer inactive
        let actnum = [1, 0, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1];
        CornerPointGrid::rectangular(3, 2, 2, (1.0, 1.0, 1.0), Some(&actnum))
            .expect("Test operation should succeed")
    }

    #[test]
    fn test_ijk_range_is_inclusive() {
        let grid = grid();
        let mut region = RegionSelector::new(&grid, false);
        region
            .select_ijk_range(1, 2, 0, 1, 0, 0)
            .expect("Test operation should succeed");
        assert_eq!(region.global_list(), &[1, 2, 4, 5]);
        assert_eq!(region.global_active_list(), &[2, 5]);
        assert_eq!(region.active_list(), &[1, 3]);
    }

    #[test]
    fn test_ranges_are_checked() {
        let grid = grid();
        let mut region = RegionSelector::new(&grid, false);
        assert!(matches!(
            region.select_ijk_range(0, 3, 0, 0, 0, 0),
            Err(RangeError::Ijk { i: 3, .. })
        ));
        assert!(matches!(
            region.deselect_ijk_range(0, 0, 1, 0, 0, 0),
            Err(RangeError::Reversed { axis: 'j', .. })
        ));
        assert!(region.is_empty());
    }

    #[test]
    fn test_mutation_invalidates_lists() {
        let grid = grid();
        let mut region = RegionSelector::new(&grid, true);
        assert_eq!(region.len(), 12);
        region.deselect_all();
        assert!(region.global_list().is_empty());
        region.select_inactive();
        assert_eq!(region.global_list(), &[1, 4]);
        region.invert();
        assert_eq!(region.len(), 10);
        assert_eq!(region.active_list().len(), grid.nactive());
    }

    #[test]
    fn test_select_by_block_values() {
        let grid = grid();
        let fipnum = TypedBlock::new("FIPNUM", BlockData::Int(vec![1, 2, 1, 2, 1, 2, 1, 2, 1, 2]))
            .expect("Test operation should succeed");
        let mut region = RegionSelector::new(&grid, false);
        region
            .select_int_equal(&fipnum, 2)
            .expect("Test operation should succeed");
        // Active cells 1, 3, 5, 7, 9 are globals 2, 5, 7, 9, 11
        assert_eq!(region.global_list(), &[2, 5, 7, 9, 11]);

        let poro = TypedBlock::new("PORO", BlockData::Float(vec![0.1; 12]))
            .expect("Test operation should succeed");
        let mut region = RegionSelector::new(&grid, false);
        region
            .select_in_range(&poro, 0.05, 0.2)
            .expect("Test operation should succeed");
        assert_eq!(region.len(), 12);

        let short = TypedBlock::new("PORO", BlockData::Float(vec![0.1; 5]))
            .expect("Test operation should succeed");
        assert!(matches!(
            region.select_in_range(&short, 0.0, 1.0),
            Err(GridError::SizeMismatch { actual: 5, .. })
        ));
    }

    #[test]
    fn test_union_and_intersect() {
        let grid = grid();
        let mut top = RegionSelector::new(&grid, false);
        top.select_ijk_range(0, 2, 0, 1, 0, 0)
            .expect("Test operation should succeed");
        let mut left = RegionSelector::new(&grid, false);
        left.select_ijk_range(0, 0, 0, 1, 0, 1)
            .expect("Test operation should succeed");

        let mut both = top.clone();
        both.intersect(&left).expect("Test operation should succeed");
        assert_eq!(both.global_list(), &[0, 3]);

        let mut either = top.clone();
        either.union(&left).expect("Test operation should succeed");
        assert_eq!(either.global_list(), &[0, 1, 2, 3, 4, 5, 6, 9]);
        assert!(either.contains_ijk(0, 1, 1).expect("Test operation should succeed"));
        assert!(!either.contains(7));
        assert!(!either.contains(99));
    }
}
