//! Reading connections from EGRID sections and INIT transmissibilities

use super::{Connection, ConnectionGraph, NncKind};
use crate::error::{GridError, GridResult};
use crate::grid::{CornerPointGrid, MAIN_GRID_NR};
use crate::keywords::{self, header_item, int_values, real_values};
use ecl_formats::block::TypedBlock;
use ecl_formats::file::KeywordFile;
use std::collections::HashMap;
use tracing::{debug, info};

impl ConnectionGraph {
    /// Read the NNCHEAD and NNCHEADA sections of an EGRID file
    ///
    /// Each NNCHEAD section belongs to grid `NNCHEAD[1]` and may carry
    /// NNC1/NNC2 (connections inside that grid) and NNCG/NNCL (host grid
    /// to that refinement). Each NNCHEADA pairs with the matching NNA1/NNA2
    /// occurrence and connects the refinements named by its first two items.
    /// Cell numbers in the file are 1-based. Connections that reach into
    /// the fracture half of a dual porosity grid are skipped.
    pub fn from_keyword_file(grid: &CornerPointGrid, file: &KeywordFile) -> GridResult<Self> {
        let mut graph = Self::new();

        for occurrence in 0..file.num_named(keywords::NNCHEAD) {
            let view = file.block_view(keywords::NNCHEAD, occurrence)?;
            let head = view.get(keywords::NNCHEAD, 0)?;
            let lgr_nr = header_item(head, keywords::NNCHEAD_LGR_INDEX)?;
            let local = lookup(grid, lgr_nr)?;

            if let Some(nnc1) = keywords::optional(&view, keywords::NNC1)? {
                let nnc2 = keywords::required(&view, keywords::NNC2, occurrence)?;
                graph.add_keyword_pair(NncKind::Normal, (local, nnc1), (local, nnc2))?;
            }
            if let Some(nncl) = keywords::optional(&view, keywords::NNCL)? {
                let nncg = keywords::required(&view, keywords::NNCG, occurrence)?;
                graph.add_keyword_pair(NncKind::GlobalToLocal, (grid, nncg), (local, nncl))?;
            }
        }

        let amalgamated = file.num_named(keywords::NNCHEADA);
        for occurrence in 0..amalgamated {
            let head = file.get(keywords::NNCHEADA, occurrence)?;
            let lgr1 = lookup(grid, header_item(head, keywords::NNCHEADA_ILOC1_INDEX)?)?;
            let lgr2 = lookup(grid, header_item(head, keywords::NNCHEADA_ILOC2_INDEX)?)?;
            let nna1 = file.get(keywords::NNA1, occurrence)?;
            let nna2 = file.get(keywords::NNA2, occurrence)?;
            graph.add_keyword_pair(NncKind::Amalgamated, (lgr1, nna1), (lgr2, nna2))?;
        }

        info!(
            "Loaded {} non-neighbour connections from {} sections",
            graph.len(),
            graph.segments.len()
        );
        Ok(graph)
    }

    fn add_keyword_pair(
        &mut self,
        kind: NncKind,
        (grid1, block1): (&CornerPointGrid, &TypedBlock),
        (grid2, block2): (&CornerPointGrid, &TypedBlock),
    ) -> GridResult<()> {
        let cells1 = int_values(block1)?;
        let cells2 = int_values(block2)?;
        if cells1.len() != cells2.len() {
            return Err(GridError::SizeMismatch {
                name: block1.name().to_string(),
                expected: cells2.len(),
                actual: cells1.len(),
            });
        }

        let dual = grid1.porosity().is_dual();
        let mut skipped = 0usize;
        self.begin_segment(kind, cells2.len());
        for (nnc_index, (&c1, &c2)) in cells1.iter().zip(cells2).enumerate() {
            let index1 = i64::from(c1) - 1;
            let index2 = i64::from(c2) - 1;
            if dual && (index1 >= grid1.size() as i64 || index2 >= grid2.size() as i64) {
                skipped += 1;
                continue;
            }
            let global1 = grid1.check_global(index1)?;
            let global2 = grid2.check_global(index2)?;
            self.add_pair(Connection::new(
                (grid1.lgr_nr(), global1),
                (grid2.lgr_nr(), global2),
                nnc_index as u32,
            ));
        }
        self.end_segment();

        debug!(
            "{kind:?} connections {}->{}: {} read, {skipped} fracture links skipped",
            grid1.lgr_nr(),
            grid2.lgr_nr(),
            cells2.len() - skipped
        );
        Ok(())
    }

    /// Assign transmissibilities from an INIT file
    ///
    /// The n-th section of each kind takes the n-th occurrence of its
    /// keyword (TRANNNC, TRANGL or TRANLL). Sections without a matching
    /// occurrence keep zero transmissibility.
    pub fn with_transmissibility(mut self, init: &KeywordFile) -> GridResult<Self> {
        let mut seen: HashMap<NncKind, usize> = HashMap::new();
        for segment in &self.segments {
            let occurrence = seen.entry(segment.kind).or_default();
            let name = segment.kind.transmissibility_keyword();
            let current = *occurrence;
            *occurrence += 1;
            if init.num_named(name) <= current {
                continue;
            }

            let values = real_values(init.get(name, current)?)?;
            if values.len() != segment.source_len {
                return Err(GridError::SizeMismatch {
                    name: name.to_string(),
                    expected: segment.source_len,
                    actual: values.len(),
                });
            }
            for pair in &mut self.pairs[segment.pairs.clone()] {
                pair.transmissibility = values[pair.input_order as usize];
            }
        }
        Ok(self)
    }
}

fn lookup(grid: &CornerPointGrid, lgr_nr: i32) -> GridResult<&CornerPointGrid> {
    if lgr_nr == MAIN_GRID_NR {
        Ok(grid)
    } else {
        grid.lgr_by_number(lgr_nr)
            .ok_or(GridError::UnknownLgr(lgr_nr))
    }
}
