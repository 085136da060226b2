#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Loading grid trees and connections from EGRID files

use ecl_formats::block::{BlockData, TypedBlock};
use ecl_formats::file::KeywordFile;
use ecl_formats::record_io::ECLIPSE_ENDIAN_FLIP;
use ecl_grid::{CornerPointGrid, GridError, GridOptions, Porosity};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn int(name: &str, values: Vec<i32>) -> TypedBlock {
    TypedBlock::new(name, BlockData::Int(values)).unwrap()
}

fn float(name: &str, values: Vec<f32>) -> TypedBlock {
    TypedBlock::new(name, BlockData::Float(values)).unwrap()
}

fn gridhead(nx: i32, ny: i32, nz: i32, lgr_nr: i32) -> TypedBlock {
    let mut head = vec![0; 100];
    head[..5].copy_from_slice(&[1, nx, ny, nz, lgr_nr]);
    int("GRIDHEAD", head)
}

fn filehead(dual_flag: i32) -> TypedBlock {
    let mut head = vec![0; 100];
    head[0] = 3;
    head[1] = 2007;
    head[5] = dual_flag;
    int("FILEHEAD", head)
}

/// COORD and ZCORN of an axis-aligned box starting at `origin`
fn box_geometry(
    (nx, ny, nz): (usize, usize, usize),
    (dx, dy, dz): (f32, f32, f32),
    origin: [f32; 3],
) -> [TypedBlock; 2] {
    let mut coord = Vec::new();
    for j in 0..=ny {
        for i in 0..=nx {
            let x = origin[0] + i as f32 * dx;
            let y = origin[1] + j as f32 * dy;
            coord.extend_from_slice(&[x, y, origin[2], x, y, origin[2] + nz as f32 * dz]);
        }
    }
    let mut zcorn = Vec::new();
    for k in 0..nz {
        for face in 0..2 {
            let depth = origin[2] + (k + face) as f32 * dz;
            zcorn.extend(std::iter::repeat_n(depth, 4 * nx * ny));
        }
    }
    [float("COORD", coord), float("ZCORN", zcorn)]
}

/// A 4x3x2 host grid with a 2x2x2 refinement in host cell (1, 1, 0)
fn sample_egrid(with_mapaxes: bool) -> Vec<TypedBlock> {
    let mut blocks = vec![filehead(0)];
    if with_mapaxes {
        blocks.push(float(
            "MAPAXES",
            vec![1000.0, 2100.0, 1000.0, 2000.0, 1100.0, 2000.0],
        ));
    }
    blocks.push(gridhead(4, 3, 2, 0));
    blocks.extend(box_geometry((4, 3, 2), (100.0, 50.0, 10.0), [0.0, 0.0, 2000.0]));
    let mut actnum = vec![1; 24];
    actnum[23] = 0;
    blocks.push(int("ACTNUM", actnum));
    blocks.push(int("ENDGRID", vec![]));

    blocks.push(TypedBlock::from_strings("LGR", ["LGR1"]).unwrap());
    blocks.push(TypedBlock::from_strings("LGRPARNT", [""]).unwrap());
    blocks.push(gridhead(2, 2, 2, 1));
    blocks.extend(box_geometry((2, 2, 2), (50.0, 25.0, 5.0), [100.0, 50.0, 2000.0]));
    blocks.push(int("ACTNUM", vec![1; 8]));
    blocks.push(int("HOSTNUM", vec![6; 8]));
    blocks.push(int("ENDGRID", vec![]));
    blocks.push(int("ENDLGR", vec![]));

    blocks.push(int("NNCHEAD", vec![3, 0, 0, 0, 0, 0, 0, 0, 0, 0]));
    blocks.push(int("NNC1", vec![1, 2, 1]));
    blocks.push(int("NNC2", vec![10, 20, 10]));
    blocks.push(int("NNCHEAD", vec![2, 1, 0, 0, 0, 0, 0, 0, 0, 0]));
    blocks.push(int("NNCG", vec![5, 7]));
    blocks.push(int("NNCL", vec![1, 8]));
    blocks
}

fn write_egrid(dir: &TempDir, name: &str, blocks: Vec<TypedBlock>) -> std::path::PathBuf {
    let path = dir.path().join(name);
    KeywordFile::from_blocks(blocks)
        .write(&path, false, ECLIPSE_ENDIAN_FLIP)
        .unwrap();
    path
}

#[test]
fn loads_host_grid_refinement_and_connections() {
    let dir = TempDir::new().unwrap();
    let path = write_egrid(&dir, "CASE.EGRID", sample_egrid(false));
    let grid = CornerPointGrid::open(&path, &GridOptions::default()).unwrap();

    assert_eq!(grid.dims(), (4, 3, 2));
    assert_eq!(grid.nactive(), 23);
    assert_eq!(grid.porosity(), Porosity::Single);
    let corner_cell = grid.global_index(1, 2, 1).unwrap();
    assert_eq!(grid.cell_corner_xyz(corner_cell, 0), Ok([100.0, 100.0, 2010.0]));
    assert_eq!(grid.cell_dx(0), Ok(100.0));
    assert_eq!(grid.cell_dy(0), Ok(50.0));
    assert_eq!(grid.cell_dz(0), Ok(10.0));
    assert!(grid.mapaxes().is_none());

    assert_eq!(grid.num_lgr(), 1);
    let lgr = grid.lgr_by_name("LGR1").unwrap();
    assert_eq!(lgr.lgr_nr(), 1);
    assert_eq!(lgr.dims(), (2, 2, 2));
    assert_eq!(lgr.parent_name(), None);
    assert_eq!(lgr.host_cells(), &[5; 8]);
    assert_eq!(lgr.cell_corner_xyz(7, 7), Ok([200.0, 100.0, 2010.0]));
    assert!(lgr.cell_corner_xyz(8, 0).is_err());

    let nnc = grid.connections();
    assert_eq!(nnc.len(), 5);
    // Both ends of every pair are listed, host cells of NNCG included
    assert_eq!(nnc.finalize(0), Some(vec![0, 1, 4, 6, 9, 19]));
    assert_eq!(nnc.raw(0).unwrap().len(), 8);
    assert_eq!(nnc.finalize(1), Some(vec![0, 7]));
    assert_eq!(nnc.raw(1).unwrap().len(), 2);

    let exported: Vec<_> = nnc
        .export_pairs()
        .iter()
        .map(|c| (c.grid_nr1, c.global_index1, c.grid_nr2, c.global_index2, c.input_order))
        .collect();
    assert_eq!(
        exported,
        vec![
            (0, 0, 0, 9, 0),
            (0, 0, 0, 9, 2),
            (0, 1, 0, 19, 1),
            (0, 4, 1, 0, 0),
            (0, 6, 1, 7, 1),
        ]
    );
}

#[test]
fn mapaxes_is_applied_on_request() {
    let dir = TempDir::new().unwrap();
    let path = write_egrid(&dir, "MAPPED.EGRID", sample_egrid(true));
    let file = KeywordFile::open(&path).unwrap();

    let mapped = CornerPointGrid::from_keyword_file(&file).unwrap();
    assert_eq!(mapped.cell_corner_xyz(0, 0), Ok([1000.0, 2000.0, 2000.0]));
    let lgr = mapped.lgr_by_number(1).unwrap();
    assert_eq!(lgr.cell_corner_xyz(0, 0), Ok([1100.0, 2050.0, 2000.0]));

    let local =
        CornerPointGrid::from_keyword_file_with(&file, &GridOptions::new().with_mapaxes(false))
            .unwrap();
    assert_eq!(local.cell_corner_xyz(0, 0), Ok([0.0, 0.0, 2000.0]));
    let axes = local.mapaxes().expect("MAPAXES is kept even when not applied");
    assert_eq!(axes.origin(), [1000.0, 2000.0]);
}

#[test]
fn connections_are_optional() {
    let file = KeywordFile::from_blocks(sample_egrid(false));
    let grid =
        CornerPointGrid::from_keyword_file_with(&file, &GridOptions::new().with_nnc(false))
            .unwrap();
    assert!(grid.connections().is_empty());
    assert_eq!(grid.num_lgr(), 1);
}

#[test]
fn dual_porosity_grid_uses_actnum_codes() {
    let mut blocks = vec![filehead(1), gridhead(2, 1, 1, 0)];
    blocks.extend(box_geometry((2, 1, 1), (1.0, 1.0, 1.0), [0.0; 3]));
    blocks.push(int("ACTNUM", vec![3, 1]));
    blocks.push(int("ENDGRID", vec![]));
    blocks.push(int("NNCHEAD", vec![1, 0]));
    // The second pair links matrix cell 1 to its own fracture cell 3
    blocks.push(int("NNC1", vec![1, 1]));
    blocks.push(int("NNC2", vec![2, 3]));

    let grid = CornerPointGrid::from_keyword_file(&KeywordFile::from_blocks(blocks)).unwrap();
    assert_eq!(grid.porosity(), Porosity::DualPorosity);
    assert_eq!(grid.nactive(), 2);
    assert_eq!(grid.nactive_fracture(), 1);
    assert_eq!(grid.connections().len(), 1);
    assert_eq!(grid.connections().finalize(0), Some(vec![0, 1]));
}

#[test]
fn missing_geometry_is_a_grid_error() {
    let blocks = vec![filehead(0), gridhead(1, 1, 1, 0), float("ZCORN", vec![0.0; 8])];
    let err = CornerPointGrid::from_keyword_file(&KeywordFile::from_blocks(blocks)).unwrap_err();
    assert!(matches!(err, GridError::MissingKeyword { ref name, grid: 0 } if name == "COORD"));

    let err = CornerPointGrid::from_keyword_file(&KeywordFile::from_blocks(vec![filehead(0)]))
        .unwrap_err();
    assert!(matches!(err, GridError::MissingKeyword { ref name, .. } if name == "GRIDHEAD"));
}

#[test]
fn inconsistent_arrays_are_rejected() {
    let mut blocks = vec![gridhead(2, 2, 1, 0)];
    blocks.extend(box_geometry((2, 2, 1), (1.0, 1.0, 1.0), [0.0; 3]));
    blocks.push(int("ACTNUM", vec![1; 3]));
    let err = CornerPointGrid::from_keyword_file(&KeywordFile::from_blocks(blocks)).unwrap_err();
    assert!(matches!(
        err,
        GridError::SizeMismatch { expected: 4, actual: 3, .. }
    ));

    let mut head = gridhead(1, 1, 1, 0).into_data();
    if let BlockData::Int(values) = &mut head {
        values[0] = 2;
    }
    let mut blocks = vec![TypedBlock::new("GRIDHEAD", head).unwrap()];
    blocks.extend(box_geometry((1, 1, 1), (1.0, 1.0, 1.0), [0.0; 3]));
    let err = CornerPointGrid::from_keyword_file(&KeywordFile::from_blocks(blocks)).unwrap_err();
    assert!(matches!(err, GridError::UnsupportedGridType(2)));
}

#[test]
fn connection_to_unknown_refinement_fails() {
    let mut blocks = vec![gridhead(2, 1, 1, 0)];
    blocks.extend(box_geometry((2, 1, 1), (1.0, 1.0, 1.0), [0.0; 3]));
    blocks.push(int("NNCHEAD", vec![1, 4]));
    blocks.push(int("NNCG", vec![1]));
    blocks.push(int("NNCL", vec![1]));
    let err = CornerPointGrid::from_keyword_file(&KeywordFile::from_blocks(blocks)).unwrap_err();
    assert!(matches!(err, GridError::UnknownLgr(4)));
}

#[test]
fn transmissibilities_follow_keyword_position() {
    let grid = CornerPointGrid::from_keyword_file(&KeywordFile::from_blocks(sample_egrid(false)))
        .unwrap();
    let init = KeywordFile::from_blocks(vec![
        float("PORO", vec![0.25; 23]),
        float("TRANNNC", vec![0.5, 1.5, 2.5]),
        float("TRANGL", vec![10.0, 20.0]),
    ]);
    let nnc = grid.connections().clone().with_transmissibility(&init).unwrap();
    let trans: Vec<f64> = nnc.export_pairs().iter().map(|c| c.transmissibility).collect();
    assert_eq!(trans, vec![0.5, 2.5, 1.5, 10.0, 20.0]);

    let short = KeywordFile::from_blocks(vec![float("TRANNNC", vec![0.5, 1.5])]);
    let err = grid
        .connections()
        .clone()
        .with_transmissibility(&short)
        .unwrap_err();
    assert!(matches!(
        err,
        GridError::SizeMismatch { ref name, expected: 3, actual: 2 } if name == "TRANNNC"
    ));
}
