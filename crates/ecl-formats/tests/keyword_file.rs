#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! On-disk keyword file tests: detection, laziness, views and sharing

use ecl_formats::block::{BlockData, ElementType, TypedBlock};
use ecl_formats::file::{FileError, KeywordFile, OpenOptions};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

fn restart_blocks() -> Vec<TypedBlock> {
    let mut blocks = Vec::new();
    for step in 0..3 {
        blocks.push(TypedBlock::new("SEQNUM", BlockData::Int(vec![step])).unwrap());
        blocks.push(
            TypedBlock::new("INTEHEAD", BlockData::Int(vec![step * 10; 95])).unwrap(),
        );
        blocks.push(
            TypedBlock::new(
                "PRESSURE",
                BlockData::Float((0..1500).map(|i| 200.0 + (i + step) as f32).collect()),
            )
            .unwrap(),
        );
        blocks.push(TypedBlock::from_strings("ZWEL", ["OP_1", "WI_2"]).unwrap());
    }
    blocks
}

#[test]
fn binary_file_auto_detects_byte_order() {
    let dir = TempDir::new().unwrap();
    for endian_flip in [false, true] {
        let path = dir.path().join(format!("CASE_{endian_flip}.UNRST"));
        KeywordFile::from_blocks(restart_blocks())
            .write(&path, false, endian_flip)
            .unwrap();

        let file = KeywordFile::open(&path).unwrap();
        assert_eq!(file.len(), 12);
        assert_eq!(file.num_named("PRESSURE"), 3);
        let pressure = file.get("PRESSURE", 2).unwrap();
        assert_eq!(pressure.count(), 1500);
        assert_eq!(pressure.as_float().unwrap()[0], 202.0);
        assert_eq!(file.path(), Some(path.as_path()));
    }
}

#[test]
fn formatted_file_is_detected_and_read_eagerly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("CASE.FUNRST");
    KeywordFile::from_blocks(restart_blocks())
        .write(&path, true, false)
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(" 'SEQNUM  '           1 'INTE'\n"));

    let file = KeywordFile::open(&path).unwrap();
    assert_eq!(file.names(), vec!["SEQNUM", "INTEHEAD", "PRESSURE", "ZWEL"]);
    let zwel = file.get("ZWEL", 1).unwrap();
    assert_eq!(zwel.as_strings().unwrap(), &["OP_1".to_string(), "WI_2".to_string()]);
    let pressure = file.get("PRESSURE", 1).unwrap();
    let expected = restart_blocks().swap_remove(6);
    assert!(pressure.numeric_equal(&expected, 0.0, 1e-7));
}

#[test]
fn eager_and_lazy_open_agree() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("CASE.INIT");
    KeywordFile::from_blocks(restart_blocks())
        .write(&path, false, true)
        .unwrap();

    let lazy = KeywordFile::open(&path).unwrap();
    let eager = KeywordFile::open_with(&path, &OpenOptions::new().with_lazy(false)).unwrap();
    for index in 0..lazy.len() {
        assert!(lazy.iget(index).unwrap().equal(eager.iget(index).unwrap()));
    }
}

#[test]
fn headers_do_not_load_data() {
    let file = KeywordFile::from_blocks(restart_blocks());
    let headers: Vec<_> = file
        .headers()
        .filter(|(h, _)| h.name.as_str() == "INTEHEAD")
        .map(|(h, occurrence)| (h.element_type, h.count, occurrence))
        .collect();
    assert_eq!(
        headers,
        vec![
            (ElementType::Int, 95, 0),
            (ElementType::Int, 95, 1),
            (ElementType::Int, 95, 2)
        ]
    );
}

#[test]
fn views_scope_occurrences() {
    let file = KeywordFile::from_blocks(restart_blocks());
    let step1 = file.block_view("SEQNUM", 1).unwrap();
    assert_eq!(step1.len(), 4);
    assert_eq!(step1.num_named("INTEHEAD"), 1);
    assert_eq!(step1.get("INTEHEAD", 0).unwrap().as_int().unwrap()[0], 10);
    assert!(matches!(
        step1.get("INTEHEAD", 1),
        Err(FileError::NotFound { occurrence: 1, .. })
    ));
    assert!(file.block_view("SEQNUM", 3).is_err());
}

#[test]
fn lazy_file_is_shareable_between_threads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("CASE.UNRST");
    KeywordFile::from_blocks(restart_blocks())
        .write(&path, false, true)
        .unwrap();
    let file = Arc::new(KeywordFile::open(&path).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let file = Arc::clone(&file);
            std::thread::spawn(move || {
                let step = t % 3;
                let block = file.get("PRESSURE", step).unwrap();
                block.as_float().unwrap()[0]
            })
        })
        .collect();
    for (t, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), 200.0 + (t % 3) as f32);
    }
}
