use std::path::PathBuf;

use gix::ObjectId;

/// Adapter-specific causes are boxed so the engine stays agnostic of the
/// backing store's error types.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure modes of a statistics run.
///
/// Every kind is fatal: the engine returns the first error observed and
/// emits no partial report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open repository at {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },

    #[error("failed to iterate the object database")]
    Iteration(#[source] BoxedError),

    #[error("failed to look up object {oid}")]
    Lookup {
        oid: ObjectId,
        #[source]
        source: BoxedError,
    },

    /// An aggregation stage referenced an object that was never accumulated
    /// into its category table. This means an earlier lookup or iteration
    /// went wrong and the run cannot be trusted.
    #[error("object {oid} was never accumulated into the {category} table")]
    InternalMissing {
        oid: ObjectId,
        category: &'static str,
    },

    #[error("failed to enumerate references")]
    ReferenceList(#[source] BoxedError),
}

impl Error {
    pub(crate) fn lookup(oid: ObjectId, source: impl Into<BoxedError>) -> Self {
        Error::Lookup {
            oid,
            source: source.into(),
        }
    }

    pub(crate) fn internal_missing(oid: ObjectId, category: &'static str) -> Self {
        Error::InternalMissing { oid, category }
    }
}
