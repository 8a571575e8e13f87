//! A parallel statistics engine for Git object databases.
//!
//! Given an opened repository, the engine walks every object in its object
//! database with a fixed pool of worker threads, accumulates per-category
//! size and shape tables under fine-grained locks, and then aggregates a
//! single [`Report`] with four groups: repository size, biggest objects,
//! history structure, and biggest checkouts.
//!
//! ```no_run
//! let report = repo_statistics::statistics("path/to/repo.git")?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Callers with their own object-database representation can implement
//! [`ObjectStore`] and drive an [`Analyzer`] directly; `statistics` is the
//! composition of the [`GixObjectStore`] adapter with an `Analyzer` using
//! the default worker count.

pub mod accumulator;
pub mod analyzer;
pub mod commit_dag;
pub mod error;
pub mod gix_store;
pub mod memory_store;
pub mod object_store;
pub mod report;
pub mod tag_chain;
pub mod tree_rollup;
pub mod worker_pool;

use std::path::Path;

pub use analyzer::Analyzer;
pub use error::{Error, Result};
pub use gix_store::GixObjectStore;
pub use memory_store::MemoryObjectStore;
pub use object_store::{ObjectReader, ObjectStore};
pub use report::{CheckoutStats, Report};

/// Computes the statistics report for the repository at `path`.
///
/// The report is computed from scratch on every call; nothing is cached
/// between runs.
pub fn statistics(path: impl AsRef<Path>) -> Result<Report> {
    let store = GixObjectStore::open(path)?;
    Analyzer::new(store).run()
}
