//! A deterministic in-memory object store.
//!
//! Used by the test suite to stage synthetic object databases — including
//! duplicate iteration visits and dangling identifiers — without touching
//! disk. Iteration follows insertion order, which makes order-sensitivity
//! bugs reproducible.

use bstr::{BStr, BString};
use gix::hashtable::HashMap;
use gix::ObjectId;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::object_store::{
    BlobData, CommitData, ObjectData, ObjectKind, ObjectReader, ObjectStore, TagData, TreeData,
    TreeEntry,
};

#[derive(Debug, thiserror::Error)]
#[error("object is not present in the store")]
struct MissingObject;

#[derive(Default, Clone)]
pub struct MemoryObjectStore {
    objects: HashMap<ObjectId, ObjectData>,
    iteration_order: Vec<ObjectId>,
    references: Vec<BString>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_commit(&mut self, oid: ObjectId, size: u64, parents: &[ObjectId], tree: ObjectId) {
        self.insert(
            oid,
            ObjectData::Commit(CommitData {
                size,
                parents: SmallVec::from_slice(parents),
                tree,
            }),
        );
    }

    pub fn insert_tree(&mut self, oid: ObjectId, size: u64, entries: Vec<TreeEntry>) {
        self.insert(oid, ObjectData::Tree(TreeData { size, entries }));
    }

    pub fn insert_blob(&mut self, oid: ObjectId, size: u64) {
        self.insert(oid, ObjectData::Blob(BlobData { size }));
    }

    pub fn insert_tag(&mut self, oid: ObjectId, target: ObjectId, target_kind: Option<ObjectKind>) {
        self.insert(
            oid,
            ObjectData::Tag(TagData {
                target,
                target_kind,
            }),
        );
    }

    pub fn add_reference(&mut self, name: impl Into<BString>) {
        self.references.push(name.into());
    }

    /// Queues one more visit of `oid` in the iteration, as a duplicate
    /// object-database entry would.
    pub fn repeat_visit(&mut self, oid: ObjectId) {
        self.iteration_order.push(oid);
    }

    /// Queues a visit of an identifier that has no object behind it, so
    /// lookups of it fail.
    pub fn visit_dangling(&mut self, oid: ObjectId) {
        self.iteration_order.push(oid);
    }

    fn insert(&mut self, oid: ObjectId, data: ObjectData) {
        self.objects.insert(oid, data);
        self.iteration_order.push(oid);
    }
}

impl ObjectStore for MemoryObjectStore {
    type Reader = MemoryReader;

    fn reader(&self) -> MemoryReader {
        MemoryReader {
            objects: self.objects.clone(),
        }
    }

    fn for_each_object_id(&self, visit: &mut dyn FnMut(ObjectId) -> Result<()>) -> Result<()> {
        for oid in &self.iteration_order {
            visit(*oid)?;
        }
        Ok(())
    }

    fn for_each_reference_name(&self, visit: &mut dyn FnMut(&BStr)) -> Result<()> {
        for name in &self.references {
            visit(name.as_ref());
        }
        Ok(())
    }
}

pub struct MemoryReader {
    objects: HashMap<ObjectId, ObjectData>,
}

impl ObjectReader for MemoryReader {
    fn lookup(&mut self, oid: ObjectId) -> Result<ObjectData> {
        self.objects
            .get(&oid)
            .cloned()
            .ok_or_else(|| Error::lookup(oid, MissingObject))
    }
}
