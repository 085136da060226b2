#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Loading sets of keyword files and grids on a worker pool

use ecl_batch::{BatchError, PoolConfig, load_grids, load_keyword_files};
use ecl_formats::record_io::ECLIPSE_ENDIAN_FLIP;
use ecl_formats::{BlockData, KeywordFile, TypedBlock};
use ecl_grid::GridOptions;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn int(name: &str, values: Vec<i32>) -> TypedBlock {
    TypedBlock::new(name, BlockData::Int(values)).unwrap()
}

/// Single-layer unit grid of `nx` x 1 cells
fn strip_grid(nx: usize) -> Vec<TypedBlock> {
    let mut coord = Vec::new();
    for j in 0..=1 {
        for i in 0..=nx {
            let (x, y) = (i as f32, j as f32);
            coord.extend_from_slice(&[x, y, 0.0, x, y, 1.0]);
        }
    }
    let mut zcorn = vec![0.0f32; 4 * nx];
    zcorn.extend(std::iter::repeat_n(1.0f32, 4 * nx));

    vec![
        int("GRIDHEAD", vec![1, nx as i32, 1, 1, 0]),
        TypedBlock::new("COORD", BlockData::Float(coord)).unwrap(),
        TypedBlock::new("ZCORN", BlockData::Float(zcorn)).unwrap(),
        int("ENDGRID", vec![]),
    ]
}

fn write(dir: &Path, name: &str, blocks: Vec<TypedBlock>) -> PathBuf {
    let path = dir.join(name);
    KeywordFile::from_blocks(blocks)
        .write(&path, false, ECLIPSE_ENDIAN_FLIP)
        .unwrap();
    path
}

#[test]
fn keyword_files_load_in_input_order() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let mut paths: Vec<PathBuf> = (0..12)
        .map(|n| {
            write(
                dir.path(),
                &format!("CASE{n}.UNRST"),
                vec![int("SEQNUM", vec![n]), int("INTEHEAD", vec![n; 50])],
            )
        })
        .collect();
    paths.insert(5, dir.path().join("MISSING.UNRST"));

    let config = PoolConfig::new().with_threads(3).with_queue_depth(2);
    let results = load_keyword_files(&paths, &config).unwrap();
    assert_eq!(results.len(), 13);

    assert!(matches!(results[5], Err(BatchError::File(_))));
    let seqnums: Vec<i32> = results
        .iter()
        .filter_map(|result| result.as_ref().ok())
        .map(|file| file.get("SEQNUM", 0).unwrap().as_int().unwrap()[0])
        .collect();
    assert_eq!(seqnums, (0..12).collect::<Vec<_>>());

    let first = results[0].as_ref().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first.get("INTEHEAD", 0).unwrap().as_int().unwrap(), &[0; 50]);
}

#[test]
fn grids_load_in_input_order() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (1..=6)
        .map(|nx| write(dir.path(), &format!("G{nx}.EGRID"), strip_grid(nx)))
        .collect();

    let results = load_grids(
        &paths,
        &PoolConfig::new().with_threads(2).with_queue_depth(0),
        &GridOptions::default(),
    )
    .unwrap();

    let sizes: Vec<usize> = results
        .into_iter()
        .map(|grid| grid.unwrap().nactive())
        .collect();
    assert_eq!(sizes, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn grid_errors_stay_with_their_path() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let good = write(dir.path(), "GOOD.EGRID", strip_grid(3));
    let mut broken = strip_grid(3);
    broken.remove(1);
    let bad = write(dir.path(), "BAD.EGRID", broken);

    let results = load_grids(&[&bad, &good], &PoolConfig::default(), &GridOptions::default())
        .unwrap();
    assert!(matches!(results[0], Err(BatchError::Grid(_))));
    assert_eq!(results[1].as_ref().unwrap().dims(), (3, 1, 1));
}
