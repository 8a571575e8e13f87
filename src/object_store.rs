//! Read-only access to a content-addressed object database.
//!
//! The engine is written against the two traits in this module rather than a
//! concrete Git implementation: an [`ObjectStore`] drives whole-database
//! iteration and hands out one [`ObjectReader`] per worker thread, and each
//! reader decodes single objects into owned [`ObjectData`] records.

use bstr::{BStr, BString};
use gix::ObjectId;
use smallvec::SmallVec;

use crate::error::Result;

// -------------------------------------------------------------------------------------------------
// object classification
// -------------------------------------------------------------------------------------------------

/// The four object variants of a Git object database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

/// Filemode classification of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryMode {
    Tree,
    Blob,
    BlobExecutable,
    Symlink,
    Submodule,
}

// -------------------------------------------------------------------------------------------------
// decoded objects
// -------------------------------------------------------------------------------------------------

/// A single decoded tree entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: BString,
    pub mode: EntryMode,
    /// Variant of the object the entry points at. Carried separately from
    /// the filemode: submodule entries have a commit target, symlink entries
    /// a blob target.
    pub target_kind: ObjectKind,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn new(
        name: impl Into<BString>,
        mode: EntryMode,
        target_kind: ObjectKind,
        oid: ObjectId,
    ) -> Self {
        TreeEntry {
            name: name.into(),
            mode,
            target_kind,
            oid,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommitData {
    /// Serialized object size in bytes.
    pub size: u64,
    pub parents: SmallVec<[ObjectId; 2]>,
    /// Root tree of the commit.
    pub tree: ObjectId,
}

#[derive(Debug, Clone)]
pub struct TreeData {
    /// Serialized object size in bytes.
    pub size: u64,
    pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Clone)]
pub struct BlobData {
    /// Raw content size in bytes.
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct TagData {
    pub target: ObjectId,
    /// `None` when the store cannot classify the target.
    pub target_kind: Option<ObjectKind>,
}

/// One decoded object, tagged by variant.
#[derive(Debug, Clone)]
pub enum ObjectData {
    Commit(CommitData),
    Tree(TreeData),
    Blob(BlobData),
    Tag(TagData),
}

// -------------------------------------------------------------------------------------------------
// store traits
// -------------------------------------------------------------------------------------------------

/// A read-only view of an object database.
pub trait ObjectStore {
    /// Reader handed to each worker thread. Readers own whatever handles and
    /// scratch buffers they need, so lookups from different workers never
    /// contend on shared state inside the store.
    type Reader: ObjectReader + Send + 'static;

    fn reader(&self) -> Self::Reader;

    /// Invokes `visit` once per object present in the database, in
    /// unspecified order. Readers obtained from [`ObjectStore::reader`] must
    /// remain usable from other threads while iteration runs.
    fn for_each_object_id(&self, visit: &mut dyn FnMut(ObjectId) -> Result<()>) -> Result<()>;

    /// Invokes `visit` once per reference name.
    fn for_each_reference_name(&self, visit: &mut dyn FnMut(&BStr)) -> Result<()>;
}

/// Decodes single objects out of an object database.
pub trait ObjectReader {
    fn lookup(&mut self, oid: ObjectId) -> Result<ObjectData>;
}
