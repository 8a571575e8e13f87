//! Shared accumulation tables updated concurrently by the worker pool.
//!
//! One mutex per object category keeps the hot paths independent: commit
//! handlers never contend with blob handlers. Critical sections cover a
//! single map insertion plus scalar updates, and the commit DAG is mutated
//! only under the commits lock, so the lock graph stays trivially acyclic.

use std::sync::Mutex;

use gix::hashtable::{hash_map, HashMap};
use gix::ObjectId;

use crate::commit_dag::CommitDag;
use crate::error::Result;
use crate::object_store::{
    BlobData, CommitData, EntryMode, ObjectData, ObjectKind, ObjectReader, TagData, TreeData,
    TreeEntry,
};
use crate::report::CheckoutStats;

pub struct ObjectAccumulator {
    commits: Mutex<CommitTable>,
    trees: Mutex<TreeTable>,
    blobs: Mutex<BlobTable>,
    tags: Mutex<TagTable>,
}

#[derive(Default)]
pub(crate) struct CommitTable {
    /// Maps each accumulated commit to its root tree.
    pub root_trees: HashMap<ObjectId, ObjectId>,
    pub total_size: u64,
    pub max_size: u64,
    pub max_parents: u64,
    pub dag: CommitDag,
}

#[derive(Default)]
pub(crate) struct TreeTable {
    pub records: HashMap<ObjectId, TreeRecord>,
    pub total_size: u64,
    pub total_entries: u64,
    pub max_entries: u64,
}

#[derive(Default)]
pub(crate) struct BlobTable {
    pub sizes: HashMap<ObjectId, u64>,
    pub total_size: u64,
    pub max_size: u64,
}

#[derive(Default)]
pub(crate) struct TagTable {
    pub records: HashMap<ObjectId, TagRecord>,
}

/// Everything the worker phase learned about one non-empty tree.
pub(crate) struct TreeRecord {
    pub partial: TreePartialStats,
    /// Immediate file entries, for blob-size folding during roll-up.
    pub blob_children: Vec<ObjectId>,
    /// Immediate sub-tree entries as (child, entry-name length).
    pub tree_children: Vec<(ObjectId, u64)>,
    pub state: RollupState,
}

/// Statistics over a tree's immediate entries only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TreePartialStats {
    pub num_files: u64,
    pub num_symlinks: u64,
    pub num_submodules: u64,
    /// Longest immediate file-entry name.
    pub max_path_length: u64,
}

/// A tagged state rather than a bare flag, so a tree whose roll-up never
/// completed is distinguishable from one carrying cached stats.
#[derive(Clone, Copy)]
pub(crate) enum RollupState {
    Unrolled,
    Rolled(CheckoutStats),
}

pub(crate) struct TagRecord {
    pub target: ObjectId,
    pub target_kind: Option<ObjectKind>,
    /// Resolved chain length including self; zero means unresolved.
    pub depth: u64,
}

/// The four tables after the worker phase has quiesced.
pub(crate) struct AccumulatedTables {
    pub commits: CommitTable,
    pub trees: TreeTable,
    pub blobs: BlobTable,
    pub tags: TagTable,
}

impl ObjectAccumulator {
    pub fn new() -> Self {
        ObjectAccumulator {
            commits: Mutex::new(CommitTable::default()),
            trees: Mutex::new(TreeTable::default()),
            blobs: Mutex::new(BlobTable::default()),
            tags: Mutex::new(TagTable::default()),
        }
    }

    /// Looks up one object and folds it into its category table.
    ///
    /// Re-encountering an already-accumulated object is a no-op beyond the
    /// first insertion, so duplicate entries in the iteration are harmless.
    pub fn process<R: ObjectReader>(&self, reader: &mut R, oid: ObjectId) -> Result<()> {
        match reader.lookup(oid)? {
            ObjectData::Commit(commit) => self.add_commit(oid, commit),
            ObjectData::Tree(tree) => self.add_tree(oid, tree),
            ObjectData::Blob(blob) => self.add_blob(oid, blob),
            ObjectData::Tag(tag) => self.add_tag(oid, tag),
        }
        Ok(())
    }

    fn add_commit(&self, oid: ObjectId, commit: CommitData) {
        let CommitData {
            size,
            parents,
            tree,
        } = commit;
        let mut guard = self.commits.lock().unwrap();
        let CommitTable {
            root_trees,
            total_size,
            max_size,
            max_parents,
            dag,
        } = &mut *guard;
        if let hash_map::Entry::Vacant(slot) = root_trees.entry(oid) {
            slot.insert(tree);
            *total_size += size;
            *max_size = (*max_size).max(size);
            *max_parents = (*max_parents).max(parents.len() as u64);
            dag.add_node(oid, &parents);
        }
    }

    fn add_tree(&self, oid: ObjectId, tree: TreeData) {
        let TreeData { size, entries } = tree;
        // The empty tree carries no checkout content and is excluded from
        // every tree count and sum.
        if entries.is_empty() {
            return;
        }
        let entry_count = entries.len() as u64;
        let record = TreeRecord::from_entries(&entries);

        let mut guard = self.trees.lock().unwrap();
        let TreeTable {
            records,
            total_size,
            total_entries,
            max_entries,
        } = &mut *guard;
        if let hash_map::Entry::Vacant(slot) = records.entry(oid) {
            slot.insert(record);
            *total_size += size;
            *total_entries += entry_count;
            *max_entries = (*max_entries).max(entry_count);
        }
    }

    fn add_blob(&self, oid: ObjectId, blob: BlobData) {
        let BlobData { size } = blob;
        let mut guard = self.blobs.lock().unwrap();
        let BlobTable {
            sizes,
            total_size,
            max_size,
        } = &mut *guard;
        if let hash_map::Entry::Vacant(slot) = sizes.entry(oid) {
            slot.insert(size);
            *total_size += size;
            *max_size = (*max_size).max(size);
        }
    }

    fn add_tag(&self, oid: ObjectId, tag: TagData) {
        let TagData {
            target,
            target_kind,
        } = tag;
        // Overwrite is fine: the object database guarantees one object per
        // identifier, so a re-insert carries identical data.
        self.tags.lock().unwrap().records.insert(
            oid,
            TagRecord {
                target,
                target_kind,
                depth: 0,
            },
        );
    }

    /// Unwraps the tables for the single-threaded aggregation phase. Callers
    /// must have joined every worker first.
    pub(crate) fn into_tables(self) -> AccumulatedTables {
        AccumulatedTables {
            commits: self.commits.into_inner().unwrap(),
            trees: self.trees.into_inner().unwrap(),
            blobs: self.blobs.into_inner().unwrap(),
            tags: self.tags.into_inner().unwrap(),
        }
    }
}

impl Default for ObjectAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeRecord {
    fn from_entries(entries: &[TreeEntry]) -> Self {
        let mut partial = TreePartialStats::default();
        let mut blob_children = Vec::new();
        let mut tree_children = Vec::new();

        for entry in entries {
            let name_len = entry.name.len() as u64;
            match (entry.mode, entry.target_kind) {
                // A submodule pins a commit; nothing of it lands in the
                // checkout and the commit is not followed from here.
                (EntryMode::Submodule, ObjectKind::Commit) => partial.num_submodules += 1,
                // A symlink is blob-backed but contributes neither file
                // count nor size nor path length.
                (EntryMode::Symlink, ObjectKind::Blob) => partial.num_symlinks += 1,
                (_, ObjectKind::Tree) => tree_children.push((entry.oid, name_len)),
                (_, ObjectKind::Blob) => {
                    partial.num_files += 1;
                    partial.max_path_length = partial.max_path_length.max(name_len);
                    blob_children.push(entry.oid);
                }
                _ => {}
            }
        }

        TreeRecord {
            partial,
            blob_children,
            tree_children,
            state: RollupState::Unrolled,
        }
    }
}
