//! Memoized roll-up of per-tree partial statistics into checkout statistics.

use gix::hashtable::HashMap;
use gix::ObjectId;

use crate::accumulator::{RollupState, TreeRecord};
use crate::error::{Error, Result};
use crate::report::CheckoutStats;

/// Rolls the per-entry statistics gathered during the worker phase up into
/// cumulative statistics for whole checkouts.
///
/// The recursion is depth-first and memoized: every tree is expanded at most
/// once, and shared sub-trees reuse the stats cached by their first roll-up.
/// Recursion depth is bounded by the deepest path in the repository.
pub struct TreeAggregator<'a> {
    trees: &'a mut HashMap<ObjectId, TreeRecord>,
    blobs: &'a HashMap<ObjectId, u64>,
}

impl<'a> TreeAggregator<'a> {
    pub(crate) fn new(
        trees: &'a mut HashMap<ObjectId, TreeRecord>,
        blobs: &'a HashMap<ObjectId, u64>,
    ) -> Self {
        TreeAggregator { trees, blobs }
    }

    /// Checkout statistics for a commit's root tree.
    ///
    /// The empty tree is never accumulated, so a root absent from the tree
    /// table projects an empty checkout rather than an error.
    pub(crate) fn roll_up_root(&mut self, oid: ObjectId) -> Result<CheckoutStats> {
        if !self.trees.contains_key(&oid) {
            return Ok(CheckoutStats::default());
        }
        self.roll_up(oid)
    }

    pub(crate) fn roll_up(&mut self, oid: ObjectId) -> Result<CheckoutStats> {
        let record = self
            .trees
            .get_mut(&oid)
            .ok_or_else(|| Error::internal_missing(oid, "trees"))?;
        if let RollupState::Rolled(stats) = record.state {
            return Ok(stats);
        }

        // The child lists are consumed here; once rolled, only the cached
        // stats are ever read again.
        let partial = record.partial;
        let blob_children = std::mem::take(&mut record.blob_children);
        let tree_children = std::mem::take(&mut record.tree_children);

        let mut stats = CheckoutStats {
            num_directories: 1,
            max_path_depth: 1,
            max_path_length: partial.max_path_length,
            num_files: partial.num_files,
            total_file_size: 0,
            num_symlinks: partial.num_symlinks,
            num_submodules: partial.num_submodules,
        };

        for blob_oid in blob_children {
            let size = self
                .blobs
                .get(&blob_oid)
                .copied()
                .ok_or_else(|| Error::internal_missing(blob_oid, "blobs"))?;
            stats.total_file_size += size;
        }

        for (child_oid, name_len) in tree_children {
            let child = self.roll_up(child_oid)?;
            stats.num_directories += child.num_directories;
            stats.max_path_depth = stats.max_path_depth.max(child.max_path_depth + 1);
            stats.max_path_length = stats
                .max_path_length
                .max(name_len + 1 + child.max_path_length);
            stats.num_files += child.num_files;
            stats.total_file_size += child.total_file_size;
            stats.num_symlinks += child.num_symlinks;
            stats.num_submodules += child.num_submodules;
        }

        self.trees
            .get_mut(&oid)
            .expect("tree record should still be present after rolling its children")
            .state = RollupState::Rolled(stats);
        Ok(stats)
    }
}
