//! Active/global index bijection

use super::cell::ActiveFlag;

/// Two-way map between global cell indices and active indices
///
/// Active indices are handed out while scanning global cells in storage
/// order (i fastest), so `active_to_global` is strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveMap {
    active_to_global: Vec<u64>,
    global_to_active: Vec<Option<u64>>,
}

impl ActiveMap {
    /// Build the map for every flag containing `bit`
    pub fn build<I>(flags: I, bit: ActiveFlag) -> Self
    where
        I: IntoIterator<Item = ActiveFlag>,
    {
        let mut active_to_global = Vec::new();
        let global_to_active = flags
            .into_iter()
            .enumerate()
            .map(|(global, flag)| {
                flag.contains(bit).then(|| {
                    let active = active_to_global.len() as u64;
                    active_to_global.push(global as u64);
                    active
                })
            })
            .collect();
        Self {
            active_to_global,
            global_to_active,
        }
    }

    /// Map covering `size` cells with nothing active
    pub fn inactive(size: usize) -> Self {
        Self {
            active_to_global: Vec::new(),
            global_to_active: vec![None; size],
        }
    }

    /// Number of active cells
    pub fn len(&self) -> usize {
        self.active_to_global.len()
    }

    /// True when no cell is active
    pub fn is_empty(&self) -> bool {
        self.active_to_global.is_empty()
    }

    /// Active index of a global cell, `None` when inactive or out of range
    pub fn active_index(&self, global: u64) -> Option<u64> {
        self.global_to_active
            .get(usize::try_from(global).ok()?)
            .copied()
            .flatten()
    }

    /// Global index of an active cell, `None` when out of range
    pub fn global_index(&self, active: u64) -> Option<u64> {
        self.active_to_global
            .get(usize::try_from(active).ok()?)
            .copied()
    }

    /// Global indices of all active cells in increasing order
    pub fn active_to_global(&self) -> &[u64] {
        &self.active_to_global
    }
}
