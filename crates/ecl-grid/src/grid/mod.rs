//! Corner-point grids
//!
//! A [`CornerPointGrid`] stores eight explicit corners per cell plus the
//! cell's activity flag. Cells are addressed by global index
//! `i + j*nx + k*nx*ny`; active cells additionally carry an active index
//! assigned in global order. Dual porosity grids keep a second bijection
//! for fracture cells.
//!
//! Local grid refinements form a tree: every grid owns its refinements
//! and lookups by name or number search the whole subtree.

mod actnum;
mod cell;
mod config;
mod geometry;

pub use actnum::ActiveMap;
pub use cell::{ActiveFlag, Cell, NUM_CORNERS, Point, Porosity};
pub use config::GridOptions;
pub use geometry::{MAPAXES_LEN, MapAxes, coord_len, pillar_corners, zcorn_len};

use crate::error::{GridError, GridResult, RangeError};
use crate::nnc::ConnectionGraph;
use std::collections::HashSet;
use tracing::debug;

/// Host grid number
pub const MAIN_GRID_NR: i32 = 0;

/// A cell whose computed size disagrees with a reference array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionMismatch {
    /// Global index of the cell
    pub global_index: u64,
    /// `'x'`, `'y'` or `'z'`
    pub axis: char,
    /// Value computed from the corners
    pub computed: f64,
    /// Value from the reference array
    pub expected: f64,
}

/// Corner-point grid with its refinement tree
#[derive(Debug, Clone)]
pub struct CornerPointGrid {
    nx: usize,
    ny: usize,
    nz: usize,
    cells: Vec<Cell>,
    porosity: Porosity,
    matrix: ActiveMap,
    fracture: ActiveMap,
    lgr_nr: i32,
    name: String,
    parent_name: Option<String>,
    host_cells: Vec<u64>,
    lgrs: Vec<CornerPointGrid>,
    mapaxes: Option<MapAxes>,
    connections: ConnectionGraph,
}

impl CornerPointGrid {
    fn from_cells(nx: usize, ny: usize, nz: usize, cells: Vec<Cell>, porosity: Porosity) -> Self {
        let mut grid = Self {
            nx,
            ny,
            nz,
            cells,
            porosity,
            matrix: ActiveMap::default(),
            fracture: ActiveMap::default(),
            lgr_nr: MAIN_GRID_NR,
            name: String::new(),
            parent_name: None,
            host_cells: Vec::new(),
            lgrs: Vec::new(),
            mapaxes: None,
            connections: ConnectionGraph::new(),
        };
        grid.update_index();
        grid
    }

    /// Rebuild both bijections from the cell flags
    fn update_index(&mut self) {
        self.matrix = ActiveMap::build(self.cells.iter().map(Cell::active), ActiveFlag::MATRIX);
        self.fracture = if self.porosity.is_dual() {
            ActiveMap::build(self.cells.iter().map(Cell::active), ActiveFlag::FRACTURE)
        } else {
            ActiveMap::inactive(self.cells.len())
        };
        debug!(
            "Indexed {}x{}x{} grid {:?}: {} active, {} fracture",
            self.nx,
            self.ny,
            self.nz,
            self.name,
            self.matrix.len(),
            self.fracture.len()
        );
    }

    /// Build a grid from a per-cell corner generator, every cell active
    ///
    /// `corner_fn(i, j, k)` is called once per cell in storage order.
    pub fn from_corner_points<F>(nx: usize, ny: usize, nz: usize, mut corner_fn: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> [Point; NUM_CORNERS],
    {
        let mut cells = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    cells.push(Cell::new(corner_fn(i, j, k), ActiveFlag::MATRIX));
                }
            }
        }
        Self::from_cells(nx, ny, nz, cells, Porosity::Single)
    }

    /// Build a grid from a corner generator and ACTNUM codes
    ///
    /// Codes with the fracture bit make the grid dual porosity.
    pub fn from_corner_points_with_actnum<F>(
        nx: usize,
        ny: usize,
        nz: usize,
        actnum: &[i32],
        mut corner_fn: F,
    ) -> GridResult<Self>
    where
        F: FnMut(usize, usize, usize) -> [Point; NUM_CORNERS],
    {
        check_len("ACTNUM", nx * ny * nz, actnum.len())?;
        let mut codes = actnum.iter().map(|&code| ActiveFlag::from_code(code));
        let mut cells = Vec::with_capacity(actnum.len());
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let active = codes.next().unwrap_or_default();
                    cells.push(Cell::new(corner_fn(i, j, k), active));
                }
            }
        }
        let porosity = infer_porosity(actnum);
        Ok(Self::from_cells(nx, ny, nz, cells, porosity))
    }

    /// Axis-aligned grid with constant cell size, origin at `(0, 0, 0)`
    pub fn rectangular(
        nx: usize,
        ny: usize,
        nz: usize,
        (dx, dy, dz): (f64, f64, f64),
        actnum: Option<&[i32]>,
    ) -> GridResult<Self> {
        let corners = |i: usize, j: usize, k: usize| -> [Point; NUM_CORNERS] {
            std::array::from_fn(|c| {
                [
                    (i + (c & 1)) as f64 * dx,
                    (j + ((c >> 1) & 1)) as f64 * dy,
                    (k + ((c >> 2) & 1)) as f64 * dz,
                ]
            })
        };
        match actnum {
            Some(actnum) => Self::from_corner_points_with_actnum(nx, ny, nz, actnum, corners),
            None => Ok(Self::from_corner_points(nx, ny, nz, corners)),
        }
    }

    /// Build a grid from COORD pillars and ZCORN depths
    ///
    /// A missing ACTNUM makes every cell active. MAPAXES, when given, is
    /// applied to the corners.
    pub fn from_coord_zcorn(
        nx: usize,
        ny: usize,
        nz: usize,
        coord: &[f64],
        zcorn: &[f64],
        actnum: Option<&[i32]>,
        mapaxes: Option<&[f64]>,
    ) -> GridResult<Self> {
        let mapaxes = mapaxes.map(MapAxes::new).transpose()?;
        Self::from_pillars((nx, ny, nz), coord, zcorn, actnum, mapaxes.as_ref())
    }

    pub(crate) fn from_pillars(
        (nx, ny, nz): (usize, usize, usize),
        coord: &[f64],
        zcorn: &[f64],
        actnum: Option<&[i32]>,
        transform: Option<&MapAxes>,
    ) -> GridResult<Self> {
        check_len("COORD", coord_len(nx, ny), coord.len())?;
        check_len("ZCORN", zcorn_len(nx, ny, nz), zcorn.len())?;
        let corners = |i: usize, j: usize, k: usize| {
            let corners = pillar_corners(nx, ny, (i, j, k), coord, zcorn);
            match transform {
                Some(axes) => corners.map(|p| axes.transform(p)),
                None => corners,
            }
        };
        let mut grid = match actnum {
            Some(actnum) => Self::from_corner_points_with_actnum(nx, ny, nz, actnum, corners)?,
            None => Self::from_corner_points(nx, ny, nz, corners),
        };
        grid.mapaxes = transform.copied();
        Ok(grid)
    }

    /// Same grid with a different porosity model
    #[must_use]
    pub fn with_porosity(mut self, porosity: Porosity) -> Self {
        if self.porosity != porosity {
            self.porosity = porosity;
            self.update_index();
        }
        self
    }

    pub(crate) fn set_mapaxes(&mut self, mapaxes: Option<MapAxes>) {
        self.mapaxes = mapaxes;
    }

    pub(crate) fn set_connections(&mut self, connections: ConnectionGraph) {
        self.connections = connections;
    }

    /// Attach HOSTNUM data: the host grid cell of every cell of this LGR
    pub fn with_host_cells(mut self, host_cells: Vec<u64>) -> GridResult<Self> {
        check_len("HOSTNUM", self.size(), host_cells.len())?;
        self.host_cells = host_cells;
        Ok(self)
    }

    /// Copy of this grid with activity restricted by an external mask
    ///
    /// A mask of `size` entries gates whole cells. Dual porosity grids also
    /// accept `2 * size` entries: the lower half gates matrix cells and the
    /// upper half gates fracture cells. Refinements are left unchanged.
    pub fn with_external_actnum(&self, mask: &[bool]) -> GridResult<Self> {
        let size = self.size();
        let split = self.porosity.is_dual() && mask.len() == 2 * size;
        if mask.len() != size && !split {
            return Err(GridError::SizeMismatch {
                name: "external ACTNUM".to_string(),
                expected: size,
                actual: mask.len(),
            });
        }

        let mut grid = self.clone();
        for (global, cell) in grid.cells.iter_mut().enumerate() {
            let gate = if split {
                let matrix = if mask[global] { ActiveFlag::MATRIX } else { ActiveFlag::NONE };
                let fracture = if mask[size + global] {
                    ActiveFlag::FRACTURE
                } else {
                    ActiveFlag::NONE
                };
                matrix | fracture
            } else if mask[global] {
                ActiveFlag::BOTH
            } else {
                ActiveFlag::NONE
            };
            cell.active = cell.active & gate;
        }
        grid.update_index();
        Ok(grid)
    }

    /// Cells along x
    pub const fn nx(&self) -> usize {
        self.nx
    }

    /// Cells along y
    pub const fn ny(&self) -> usize {
        self.ny
    }

    /// Cells along z
    pub const fn nz(&self) -> usize {
        self.nz
    }

    /// `(nx, ny, nz)`
    pub const fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// Total number of cells
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Porosity model
    pub const fn porosity(&self) -> Porosity {
        self.porosity
    }

    /// Global index of `(i, j, k)`
    pub fn global_index(&self, i: usize, j: usize, k: usize) -> Result<u64, RangeError> {
        if i < self.nx && j < self.ny && k < self.nz {
            Ok((i + j * self.nx + k * self.nx * self.ny) as u64)
        } else {
            Err(RangeError::Ijk {
                i,
                j,
                k,
                nx: self.nx,
                ny: self.ny,
                nz: self.nz,
            })
        }
    }

    /// `(i, j, k)` of a global index
    pub fn ijk(&self, global: u64) -> Result<(usize, usize, usize), RangeError> {
        let g = self.slot(global)?;
        let layer = self.nx * self.ny;
        Ok((g % self.nx, (g % layer) / self.nx, g / layer))
    }

    fn slot(&self, global: u64) -> Result<usize, RangeError> {
        let size = self.cells.len();
        match usize::try_from(global) {
            Ok(g) if g < size => Ok(g),
            _ => Err(RangeError::Global {
                index: i64::try_from(global).unwrap_or(i64::MAX),
                size,
            }),
        }
    }

    /// Check a global index against the grid size
    pub fn check_global(&self, global: i64) -> Result<u64, RangeError> {
        match u64::try_from(global) {
            Ok(g) if (g as usize) < self.cells.len() => Ok(g),
            _ => Err(RangeError::Global {
                index: global,
                size: self.cells.len(),
            }),
        }
    }

    /// Cell record
    pub fn cell(&self, global: u64) -> Result<&Cell, RangeError> {
        Ok(&self.cells[self.slot(global)?])
    }

    /// All cells in storage order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Activity flag of a cell
    pub fn active_flag(&self, global: u64) -> Result<ActiveFlag, RangeError> {
        Ok(self.cell(global)?.active)
    }

    /// True when the matrix part of the cell is active
    pub fn is_active(&self, global: u64) -> bool {
        self.matrix.active_index(global).is_some()
    }

    /// True when the fracture part of the cell is active
    pub fn is_fracture_active(&self, global: u64) -> bool {
        self.fracture.active_index(global).is_some()
    }

    /// Number of active matrix cells
    pub fn nactive(&self) -> usize {
        self.matrix.len()
    }

    /// Number of active fracture cells (0 for single porosity)
    pub fn nactive_fracture(&self) -> usize {
        self.fracture.len()
    }

    /// Active index of a global cell
    pub fn active_index(&self, global: u64) -> Option<u64> {
        self.matrix.active_index(global)
    }

    /// Global index of an active cell
    pub fn global_of_active(&self, active: u64) -> Result<u64, RangeError> {
        self.matrix
            .global_index(active)
            .ok_or(RangeError::Active {
                index: active,
                nactive: self.matrix.len(),
            })
    }

    /// Fracture active index of a global cell
    pub fn active_fracture_index(&self, global: u64) -> Option<u64> {
        self.fracture.active_index(global)
    }

    /// Global index of an active fracture cell
    pub fn global_of_active_fracture(&self, active: u64) -> Result<u64, RangeError> {
        self.fracture
            .global_index(active)
            .ok_or(RangeError::Active {
                index: active,
                nactive: self.fracture.len(),
            })
    }

    /// Matrix bijection
    pub const fn matrix_map(&self) -> &ActiveMap {
        &self.matrix
    }

    /// Fracture bijection
    pub const fn fracture_map(&self) -> &ActiveMap {
        &self.fracture
    }

    /// One corner of a cell
    ///
    /// # Panics
    ///
    /// Panics if `corner >= 8`.
    pub fn cell_corner_xyz(&self, global: u64, corner: usize) -> Result<Point, RangeError> {
        assert!(corner < NUM_CORNERS, "corner {corner} outside [0, 8)");
        Ok(self.cell(global)?.corners[corner])
    }

    /// All eight corners of a cell
    pub fn export_cell_corners(&self, global: u64) -> Result<[Point; NUM_CORNERS], RangeError> {
        Ok(self.cell(global)?.corners)
    }

    /// Cell center as the mean of its corners
    pub fn cell_center(&self, global: u64) -> Result<Point, RangeError> {
        Ok(self.cell(global)?.center())
    }

    /// Cell size along i
    pub fn cell_dx(&self, global: u64) -> Result<f64, RangeError> {
        Ok(self.cell(global)?.dx())
    }

    /// Cell size along j
    pub fn cell_dy(&self, global: u64) -> Result<f64, RangeError> {
        Ok(self.cell(global)?.dy())
    }

    /// Cell thickness
    pub fn cell_dz(&self, global: u64) -> Result<f64, RangeError> {
        Ok(self.cell(global)?.dz())
    }

    /// Compare computed cell sizes with reference DX/DY/DZ arrays
    ///
    /// Each array holds one value per cell or one per active cell. Returns
    /// the first cell outside `rel_tol`.
    pub fn verify_cell_dimensions(
        &self,
        dx: &[f64],
        dy: &[f64],
        dz: &[f64],
        rel_tol: f64,
    ) -> GridResult<Option<DimensionMismatch>> {
        let checks: [(char, &[f64], fn(&Cell) -> f64); 3] =
            [('x', dx, Cell::dx), ('y', dy, Cell::dy), ('z', dz, Cell::dz)];
        for (axis, values, measure) in checks {
            let globals: Box<dyn Iterator<Item = u64>> = if values.len() == self.size() {
                Box::new(0..self.size() as u64)
            } else if values.len() == self.nactive() {
                Box::new(self.matrix.active_to_global().iter().copied())
            } else {
                return Err(GridError::SizeMismatch {
                    name: format!("D{}", axis.to_ascii_uppercase()),
                    expected: self.size(),
                    actual: values.len(),
                });
            };
            for (global, &expected) in globals.zip(values) {
                let computed = measure(self.cell(global)?);
                if !geometry::within_tolerance(computed, expected, rel_tol) {
                    return Ok(Some(DimensionMismatch {
                        global_index: global,
                        axis,
                        computed,
                        expected,
                    }));
                }
            }
        }
        Ok(None)
    }

    /// MAPAXES read with the grid, if any
    pub const fn mapaxes(&self) -> Option<&MapAxes> {
        self.mapaxes.as_ref()
    }

    /// Non-neighbour connections loaded with the grid
    pub const fn connections(&self) -> &ConnectionGraph {
        &self.connections
    }

    /// LGR number, 0 for the host grid
    pub const fn lgr_nr(&self) -> i32 {
        self.lgr_nr
    }

    /// LGR name, empty for the host grid
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the parent refinement; `None` when the parent is the host
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// Host cell of every cell of this refinement (empty for the host grid)
    pub fn host_cells(&self) -> &[u64] {
        &self.host_cells
    }

    /// Host cell of one cell of this refinement
    pub fn host_cell(&self, global: u64) -> Option<u64> {
        self.host_cells.get(usize::try_from(global).ok()?).copied()
    }

    /// Direct refinements
    pub fn lgrs(&self) -> &[Self] {
        &self.lgrs
    }

    /// Number of refinements in the whole subtree
    pub fn num_lgr(&self) -> usize {
        self.lgrs.iter().map(|lgr| 1 + lgr.num_lgr()).sum()
    }

    /// Every refinement in the subtree, depth first
    pub fn all_lgrs(&self) -> Vec<&Self> {
        let mut all = Vec::new();
        for lgr in &self.lgrs {
            all.push(lgr);
            all.extend(lgr.all_lgrs());
        }
        all
    }

    /// Refinement by name anywhere in the subtree
    pub fn lgr_by_name(&self, name: &str) -> Option<&Self> {
        self.lgrs.iter().find_map(|lgr| {
            if lgr.name == name {
                Some(lgr)
            } else {
                lgr.lgr_by_name(name)
            }
        })
    }

    fn lgr_by_name_mut(&mut self, name: &str) -> Option<&mut Self> {
        for lgr in &mut self.lgrs {
            if lgr.name == name {
                return Some(lgr);
            }
            if let Some(found) = lgr.lgr_by_name_mut(name) {
                return Some(found);
            }
        }
        None
    }

    /// Refinement by number anywhere in the subtree
    pub fn lgr_by_number(&self, lgr_nr: i32) -> Option<&Self> {
        self.lgrs.iter().find_map(|lgr| {
            if lgr.lgr_nr == lgr_nr {
                Some(lgr)
            } else {
                lgr.lgr_by_number(lgr_nr)
            }
        })
    }

    /// This grid when `grid_nr` is its own number, otherwise a refinement
    pub fn grid_by_number(&self, grid_nr: i32) -> Option<&Self> {
        if grid_nr == self.lgr_nr {
            Some(self)
        } else {
            self.lgr_by_number(grid_nr)
        }
    }

    /// Check that `sub_grid`, named `name` and numbered `lgr_nr`, can join
    /// the tree together with every refinement it already carries
    fn check_new_lgr(&self, name: &str, lgr_nr: i32, sub_grid: &Self) -> GridResult<()> {
        let incoming = std::iter::once((name, lgr_nr)).chain(
            sub_grid
                .all_lgrs()
                .into_iter()
                .map(|lgr| (lgr.name.as_str(), lgr.lgr_nr)),
        );
        let mut numbers = HashSet::new();
        let mut names = HashSet::new();
        for (name, lgr_nr) in incoming {
            if lgr_nr <= MAIN_GRID_NR || lgr_nr == self.lgr_nr {
                return Err(GridError::ReservedLgrNumber(lgr_nr));
            }
            if !numbers.insert(lgr_nr) || self.lgr_by_number(lgr_nr).is_some() {
                return Err(GridError::DuplicateLgrNumber(lgr_nr));
            }
            if !names.insert(name) || self.lgr_by_name(name).is_some() {
                return Err(GridError::DuplicateLgrName(name.to_string()));
            }
        }
        Ok(())
    }

    /// Attach `sub_grid` as a direct refinement of this grid
    ///
    /// Refinements are numbered from 1; 0 belongs to the host. Numbers and
    /// names must be unique within the subtree, including the refinements
    /// `sub_grid` already carries.
    pub fn add_lgr(&mut self, name: &str, lgr_nr: i32, mut sub_grid: Self) -> GridResult<()> {
        self.check_new_lgr(name, lgr_nr, &sub_grid)?;
        sub_grid.name = name.to_string();
        sub_grid.lgr_nr = lgr_nr;
        sub_grid.parent_name = (self.lgr_nr != MAIN_GRID_NR).then(|| self.name.clone());
        for child in &mut sub_grid.lgrs {
            child.parent_name = Some(name.to_string());
        }
        debug!("Adding LGR {name} (nr {lgr_nr}) under {:?}", self.name);
        self.lgrs.push(sub_grid);
        Ok(())
    }

    /// Attach `sub_grid` under the refinement called `parent`
    pub fn add_nested_lgr(
        &mut self,
        parent: &str,
        name: &str,
        lgr_nr: i32,
        sub_grid: Self,
    ) -> GridResult<()> {
        self.check_new_lgr(name, lgr_nr, &sub_grid)?;
        let host = self
            .lgr_by_name_mut(parent)
            .ok_or_else(|| GridError::UnknownLgrParent {
                lgr: name.to_string(),
                parent: parent.to_string(),
            })?;
        host.add_lgr(name, lgr_nr, sub_grid)
    }
}

fn check_len(name: &str, expected: usize, actual: usize) -> GridResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(GridError::SizeMismatch {
            name: name.to_string(),
            expected,
            actual,
        })
    }
}

fn infer_porosity(actnum: &[i32]) -> Porosity {
    if actnum
        .iter()
        .any(|&code| ActiveFlag::from_code(code).contains(ActiveFlag::FRACTURE))
    {
        Porosity::DualPorosity
    } else {
        Porosity::Single
    }
}
