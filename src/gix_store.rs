//! Object-store adapter over an on-disk repository, via `gix`.

use std::path::Path;

use bstr::BStr;
use gix::ObjectId;

use crate::error::{Error, Result};
use crate::object_store::{
    BlobData, CommitData, EntryMode, ObjectData, ObjectKind, ObjectReader, ObjectStore, TagData,
    TreeData, TreeEntry,
};

/// A repository opened for statistics.
///
/// The sync form of the repository is kept so that every worker can derive
/// its own thread-local handle; lookups from different workers never share
/// mutable state.
pub struct GixObjectStore {
    repo: gix::ThreadSafeRepository,
}

impl GixObjectStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let opts = gix::open::Options::isolated();
        let repo = gix::open_opts(path, opts).map_err(|err| Error::Open {
            path: path.to_owned(),
            source: Box::new(err),
        })?;
        Ok(GixObjectStore {
            repo: repo.into_sync(),
        })
    }
}

impl ObjectStore for GixObjectStore {
    type Reader = GixReader;

    fn reader(&self) -> GixReader {
        GixReader {
            repo: self.repo.to_thread_local(),
            scratch: Vec::new(),
        }
    }

    fn for_each_object_id(&self, visit: &mut dyn FnMut(ObjectId) -> Result<()>) -> Result<()> {
        use gix::prelude::*;

        let repo = self.repo.to_thread_local();
        let odb = &repo.objects;
        for oid in odb
            .iter()
            .map_err(|err| Error::Iteration(Box::new(err)))?
        {
            let oid = oid.map_err(|err| Error::Iteration(Box::new(err)))?;
            visit(oid)?;
        }
        Ok(())
    }

    fn for_each_reference_name(&self, visit: &mut dyn FnMut(&BStr)) -> Result<()> {
        let repo = self.repo.to_thread_local();
        let platform = repo
            .references()
            .map_err(|err| Error::ReferenceList(Box::new(err)))?;
        for reference in platform
            .all()
            .map_err(|err| Error::ReferenceList(Box::new(err)))?
        {
            let reference = reference.map_err(|err| Error::ReferenceList(err.into()))?;
            visit(reference.name().as_bstr());
        }
        Ok(())
    }
}

/// One worker's handle onto the object database, with a reusable scratch
/// buffer for decoding commits, trees, and tags.
pub struct GixReader {
    repo: gix::Repository,
    scratch: Vec<u8>,
}

impl ObjectReader for GixReader {
    fn lookup(&mut self, oid: ObjectId) -> Result<ObjectData> {
        use gix::object::Kind;
        use gix::prelude::*;

        let odb = &self.repo.objects;
        let header = odb.header(oid).map_err(|err| Error::lookup(oid, err))?;
        let size = header.size();

        match header.kind() {
            Kind::Commit => {
                let commit = odb
                    .find_commit(&oid, &mut self.scratch)
                    .map_err(|err| Error::lookup(oid, err))?;
                let tree = commit.tree();
                let parents = commit.parents().collect();
                Ok(ObjectData::Commit(CommitData {
                    size,
                    parents,
                    tree,
                }))
            }
            Kind::Tree => {
                let iter = odb
                    .find_tree_iter(&oid, &mut self.scratch)
                    .map_err(|err| Error::lookup(oid, err))?;
                let mut entries = Vec::new();
                for entry in iter {
                    let entry = entry.map_err(|err| Error::lookup(oid, err))?;
                    use gix::objs::tree::EntryKind;
                    let (mode, target_kind) = match entry.mode.kind() {
                        EntryKind::Tree => (EntryMode::Tree, ObjectKind::Tree),
                        EntryKind::Blob => (EntryMode::Blob, ObjectKind::Blob),
                        EntryKind::BlobExecutable => (EntryMode::BlobExecutable, ObjectKind::Blob),
                        EntryKind::Link => (EntryMode::Symlink, ObjectKind::Blob),
                        EntryKind::Commit => (EntryMode::Submodule, ObjectKind::Commit),
                        #[allow(unreachable_patterns)]
                        _ => continue,
                    };
                    entries.push(TreeEntry {
                        name: entry.filename.to_owned(),
                        mode,
                        target_kind,
                        oid: entry.oid.into(),
                    });
                }
                Ok(ObjectData::Tree(TreeData { size, entries }))
            }
            Kind::Blob => Ok(ObjectData::Blob(BlobData { size })),
            Kind::Tag => {
                let tag = odb
                    .find_tag(&oid, &mut self.scratch)
                    .map_err(|err| Error::lookup(oid, err))?;
                let target_kind = match tag.target_kind {
                    Kind::Commit => Some(ObjectKind::Commit),
                    Kind::Tree => Some(ObjectKind::Tree),
                    Kind::Blob => Some(ObjectKind::Blob),
                    Kind::Tag => Some(ObjectKind::Tag),
                };
                Ok(ObjectData::Tag(TagData {
                    target: tag.target(),
                    target_kind,
                }))
            }
        }
    }
}
