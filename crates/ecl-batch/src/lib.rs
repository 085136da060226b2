//! Parallel loading of independent ECLIPSE cases
//!
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! Keyword files and grids are built single-threaded, but separate cases
//! share nothing and can be loaded side by side. This crate provides a
//! bounded [`WorkerPool`] and loaders that run one job per path on it.
//!
//! # Example
//!
//! ```no_run
//! use ecl_batch::{PoolConfig, load_grids};
//! use ecl_grid::GridOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let paths = ["A.EGRID", "B.EGRID", "C.EGRID"];
//! let config = PoolConfig::new().with_threads(2);
//! for (path, grid) in paths.iter().zip(load_grids(&paths, &config, &GridOptions::default())?) {
//!     match grid {
//!         Ok(grid) => println!("{path}: {} active cells", grid.nactive()),
//!         Err(err) => eprintln!("{path}: {err}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod loader;
pub mod pool;

pub use config::PoolConfig;
pub use error::{BatchError, BatchResult};
pub use loader::{load_each, load_grids, load_keyword_files};
pub use pool::WorkerPool;
