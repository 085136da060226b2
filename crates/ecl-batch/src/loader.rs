//! Loading many independent cases on a worker pool
//!
//! Every path becomes one job. A job owns what it builds until it hands the
//! finished value back, and results come back in the order of the input
//! paths no matter which worker finishes first.

use crate::config::PoolConfig;
use crate::error::{BatchError, BatchResult};
use crate::pool::WorkerPool;
use ecl_formats::KeywordFile;
use ecl_grid::{CornerPointGrid, GridOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use tracing::{debug, info};

/// Open every keyword file and load all its blocks
///
/// The outer error covers starting the pool; each path gets its own result.
pub fn load_keyword_files<P: AsRef<Path>>(
    paths: &[P],
    config: &PoolConfig,
) -> BatchResult<Vec<BatchResult<KeywordFile>>> {
    load_each(paths, config, |path| {
        let mut file = KeywordFile::open(path)?;
        file.load_all()?;
        Ok(file)
    })
}

/// Build the grid tree of every EGRID file
pub fn load_grids<P: AsRef<Path>>(
    paths: &[P],
    config: &PoolConfig,
    options: &GridOptions,
) -> BatchResult<Vec<BatchResult<CornerPointGrid>>> {
    let options = *options;
    load_each(paths, config, move |path| {
        Ok(CornerPointGrid::open(path, &options)?)
    })
}

/// Run `load` once per path on a fresh pool
pub fn load_each<P, T, F>(
    paths: &[P],
    config: &PoolConfig,
    load: F,
) -> BatchResult<Vec<BatchResult<T>>>
where
    P: AsRef<Path>,
    T: Send + 'static,
    F: Fn(&Path) -> BatchResult<T> + Send + Sync + 'static,
{
    let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
    let load = Arc::new(load);
    let (results, received) = mpsc::channel();

    let pool = WorkerPool::new(config)?;
    for (index, path) in paths.iter().enumerate() {
        let load = Arc::clone(&load);
        let results = results.clone();
        let path = path.clone();
        pool.submit(move || {
            debug!("Loading {}", path.display());
            let result = load(&path);
            // The receiver outlives the pool
            let _ = results.send((index, result));
        })?;
    }
    pool.join();
    let panicked = pool.panicked_jobs();
    drop(pool);
    drop(results);

    let mut slots: Vec<Option<BatchResult<T>>> = paths.iter().map(|_| None).collect();
    for (index, result) in received {
        slots[index] = Some(result);
    }
    let ok = slots.iter().filter(|slot| matches!(slot, Some(Ok(_)))).count();
    info!(
        "Loaded {ok} of {} paths ({panicked} jobs panicked)",
        paths.len()
    );

    Ok(slots
        .into_iter()
        .zip(paths)
        .map(|(slot, path)| slot.unwrap_or_else(|| Err(BatchError::JobPanicked(path))))
        .collect())
}
