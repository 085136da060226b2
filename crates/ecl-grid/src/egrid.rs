//! Building grids from EGRID keyword files
//!
//! An EGRID file holds one section per grid, each starting at GRIDHEAD:
//!
//! ```text
//! FILEHEAD  MAPAXES  GRIDHEAD COORD ZCORN ACTNUM ENDGRID
//! LGR LGRPARNT  GRIDHEAD COORD ZCORN ACTNUM HOSTNUM ENDGRID ENDLGR
//! ...
//! NNCHEAD NNC1 NNC2 NNCL NNCG ...
//! NNCHEADA NNA1 NNA2 ...
//! ```
//!
//! The first section is the host grid; section `n > 0` is the refinement
//! named by the `n-1`-th LGR keyword.

use crate::error::{GridError, GridResult};
use crate::grid::{CornerPointGrid, GridOptions, MapAxes, Porosity};
use crate::keywords::{self, header_item, int_values, real_values};
use crate::nnc::ConnectionGraph;
use ecl_formats::file::KeywordFile;
use std::path::Path;
use tracing::{debug, info};

impl CornerPointGrid {
    /// Open an EGRID file and build its grid tree
    pub fn open<P: AsRef<Path>>(path: P, options: &GridOptions) -> GridResult<Self> {
        let file = KeywordFile::open(path)?;
        Self::from_keyword_file_with(&file, options)
    }

    /// Build the grid tree of an EGRID keyword file with default options
    pub fn from_keyword_file(file: &KeywordFile) -> GridResult<Self> {
        Self::from_keyword_file_with(file, &GridOptions::default())
    }

    /// Build the grid tree of an EGRID keyword file
    pub fn from_keyword_file_with(file: &KeywordFile, options: &GridOptions) -> GridResult<Self> {
        let num_grids = file.num_named(keywords::GRIDHEAD);
        if num_grids == 0 {
            return Err(GridError::MissingKeyword {
                name: keywords::GRIDHEAD.to_string(),
                grid: 0,
            });
        }

        let porosity = if file.has(keywords::FILEHEAD) {
            let filehead = file.get(keywords::FILEHEAD, 0)?;
            Porosity::from_filehead(header_item(filehead, keywords::FILEHEAD_DUALP_INDEX)?)
        } else {
            Porosity::Single
        };

        let mapaxes = if file.has(keywords::MAPAXES) {
            Some(MapAxes::new(&real_values(file.get(keywords::MAPAXES, 0)?)?)?)
        } else {
            None
        };
        let transform = mapaxes.filter(|_| options.apply_mapaxes);

        let (mut main, ..) = load_section(file, 0, porosity, transform.as_ref())?;
        main.set_mapaxes(mapaxes);

        for grid_nr in 1..num_grids {
            let (mut lgr, lgr_nr, hostnum) =
                load_section(file, grid_nr, porosity, transform.as_ref())?;
            lgr.set_mapaxes(None);
            let name = lgr_string(file, keywords::LGR, grid_nr - 1)?.ok_or_else(|| {
                GridError::MissingKeyword {
                    name: keywords::LGR.to_string(),
                    grid: grid_nr,
                }
            })?;
            let parent = lgr_string(file, keywords::LGRPARNT, grid_nr - 1)?;

            if let Some(hostnum) = hostnum {
                let host = match &parent {
                    Some(parent) => main.lgr_by_name(parent).ok_or_else(|| {
                        GridError::UnknownLgrParent {
                            lgr: name.clone(),
                            parent: parent.clone(),
                        }
                    })?,
                    None => &main,
                };
                let host_cells = hostnum
                    .iter()
                    .map(|&cell| host.check_global(i64::from(cell) - 1))
                    .collect::<Result<Vec<_>, _>>()?;
                lgr = lgr.with_host_cells(host_cells)?;
            }

            match parent {
                Some(parent) => main.add_nested_lgr(&parent, &name, lgr_nr, lgr)?,
                None => main.add_lgr(&name, lgr_nr, lgr)?,
            }
        }

        if options.load_nnc {
            let connections = ConnectionGraph::from_keyword_file(&main, file)?;
            main.set_connections(connections);
        }

        info!(
            "Loaded {}x{}x{} grid: {} active cells, {} LGRs, {} connections",
            main.nx(),
            main.ny(),
            main.nz(),
            main.nactive(),
            main.num_lgr(),
            main.connections().len()
        );
        Ok(main)
    }
}

/// Build the grid of section `grid_nr`
///
/// Returns the grid, its GRIDHEAD number and the raw HOSTNUM values.
fn load_section(
    file: &KeywordFile,
    grid_nr: usize,
    porosity: Porosity,
    transform: Option<&MapAxes>,
) -> GridResult<(CornerPointGrid, i32, Option<Vec<i32>>)> {
    let view = file.block_view(keywords::GRIDHEAD, grid_nr)?;
    let head = view.get(keywords::GRIDHEAD, 0)?;

    let grid_type = header_item(head, keywords::GRIDHEAD_TYPE_INDEX)?;
    if grid_type != keywords::GRIDHEAD_CORNERPOINT {
        return Err(GridError::UnsupportedGridType(grid_type));
    }
    let nx = header_item(head, keywords::GRIDHEAD_NX_INDEX)?;
    let ny = header_item(head, keywords::GRIDHEAD_NY_INDEX)?;
    let nz = header_item(head, keywords::GRIDHEAD_NZ_INDEX)?;
    let lgr_nr = header_item(head, keywords::GRIDHEAD_LGR_INDEX)?;
    let dims = match (usize::try_from(nx), usize::try_from(ny), usize::try_from(nz)) {
        (Ok(x), Ok(y), Ok(z)) => (x, y, z),
        _ => return Err(GridError::InvalidDimensions { nx, ny, nz }),
    };

    let coord = real_values(keywords::required(&view, keywords::COORD, grid_nr)?)?;
    let zcorn = real_values(keywords::required(&view, keywords::ZCORN, grid_nr)?)?;
    let actnum = keywords::optional(&view, keywords::ACTNUM)?
        .map(int_values)
        .transpose()?;
    debug!(
        "Grid section {grid_nr}: {nx}x{ny}x{nz}, lgr_nr {lgr_nr}, ACTNUM {}",
        if actnum.is_some() { "present" } else { "absent" }
    );

    let grid = CornerPointGrid::from_pillars(dims, &coord, &zcorn, actnum, transform)?
        .with_porosity(porosity);

    let hostnum = if grid_nr > 0 {
        keywords::optional(&view, keywords::HOSTNUM)?
            .map(|block| int_values(block).map(<[i32]>::to_vec))
            .transpose()?
    } else {
        None
    };
    Ok((grid, lgr_nr, hostnum))
}

/// First string of occurrence `occurrence` of a character keyword
///
/// Absent keywords and empty strings read as `None`.
fn lgr_string(file: &KeywordFile, name: &str, occurrence: usize) -> GridResult<Option<String>> {
    if file.num_named(name) <= occurrence {
        return Ok(None);
    }
    let block = file.get(name, occurrence)?;
    let value = block
        .as_strings()
        .and_then(|values| values.first())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    Ok(value)
}
