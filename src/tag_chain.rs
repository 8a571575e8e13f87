//! Memoized resolver for chained annotated-tag depths.

use gix::hashtable::HashMap;
use gix::ObjectId;

use crate::accumulator::TagRecord;
use crate::error::{Error, Result};
use crate::object_store::ObjectKind;

/// Resolves the chain length of every accumulated tag.
///
/// A tag's depth is 1 plus the depth of its target when that target is
/// another tag, else 1. Depth zero is the unresolved sentinel; it is written
/// before the target is followed, so even a corrupt cyclic chain terminates.
pub struct TagDepthResolver<'a> {
    tags: &'a mut HashMap<ObjectId, TagRecord>,
}

impl<'a> TagDepthResolver<'a> {
    pub(crate) fn new(tags: &'a mut HashMap<ObjectId, TagRecord>) -> Self {
        TagDepthResolver { tags }
    }

    pub(crate) fn resolve(&mut self, oid: ObjectId) -> Result<u64> {
        let (target, target_kind) = {
            let record = self
                .tags
                .get_mut(&oid)
                .ok_or_else(|| Error::internal_missing(oid, "tags"))?;
            if record.depth != 0 {
                return Ok(record.depth);
            }
            record.depth = 1;
            (record.target, record.target_kind)
        };

        let mut depth = 1;
        if target_kind == Some(ObjectKind::Tag) {
            depth += self.resolve(target)?;
            self.tags
                .get_mut(&oid)
                .expect("tag record should still be present after resolving its target")
                .depth = depth;
        }
        Ok(depth)
    }

    /// Maximum resolved depth over every accumulated tag.
    pub(crate) fn max_depth(&mut self) -> Result<u64> {
        let oids: Vec<ObjectId> = self.tags.keys().copied().collect();
        let mut max = 0;
        for oid in oids {
            max = max.max(self.resolve(oid)?);
        }
        Ok(max)
    }
}
