//! The final statistics snapshot.
//!
//! The serialized field names are the external contract; every struct
//! renames to camelCase so consumers see `repositorySize`, `annotatedTags`,
//! `numDirectories` and friends verbatim. An empty repository is exactly
//! `Report::default()`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub repository_size: RepositorySize,
    pub biggest_objects: BiggestObjects,
    pub history_structure: HistoryStructure,
    pub biggest_checkouts: CheckoutStats,
}

// -------------------------------------------------------------------------------------------------
// repositorySize
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySize {
    pub commits: CountAndSize,
    pub trees: TreeTotals,
    pub blobs: CountAndSize,
    pub annotated_tags: Count,
    pub references: Count,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountAndSize {
    pub count: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeTotals {
    pub count: u64,
    pub size: u64,
    /// Sum of entry counts over all non-empty trees.
    pub entries: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Count {
    pub count: u64,
}

// -------------------------------------------------------------------------------------------------
// biggestObjects
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiggestObjects {
    pub commits: CommitExtremes,
    pub trees: TreeExtremes,
    pub blobs: BlobExtremes,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitExtremes {
    pub max_size: u64,
    pub max_parents: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeExtremes {
    pub max_entries: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobExtremes {
    pub max_size: u64,
}

// -------------------------------------------------------------------------------------------------
// historyStructure
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStructure {
    /// Number of commits on the longest parent-to-child chain.
    pub max_depth: u64,
    /// Longest chain of tag-to-tag pointers ending at a non-tag target.
    pub max_tag_depth: u64,
}

// -------------------------------------------------------------------------------------------------
// biggestCheckouts
// -------------------------------------------------------------------------------------------------

/// Aggregate measurements of the working-tree projection of one tree, and
/// (component-wise maximized) of the whole repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStats {
    pub num_directories: u64,
    pub max_path_depth: u64,
    pub max_path_length: u64,
    pub num_files: u64,
    pub total_file_size: u64,
    pub num_symlinks: u64,
    pub num_submodules: u64,
}

impl CheckoutStats {
    /// Component-wise maximum, used to fold per-root checkout statistics
    /// into the repository-wide extreme.
    pub fn max_merge(&mut self, other: &CheckoutStats) {
        self.num_directories = self.num_directories.max(other.num_directories);
        self.max_path_depth = self.max_path_depth.max(other.max_path_depth);
        self.max_path_length = self.max_path_length.max(other.max_path_length);
        self.num_files = self.num_files.max(other.num_files);
        self.total_file_size = self.total_file_size.max(other.total_file_size);
        self.num_symlinks = self.num_symlinks.max(other.num_symlinks);
        self.num_submodules = self.num_submodules.max(other.num_submodules);
    }
}
