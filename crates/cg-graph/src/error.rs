//! Graph-specific error types.

use cg_core::CgError;
use core::fmt::Debug;
use thiserror::Error;

/// Errors raised by [`CitationGraph`](crate::CitationGraph) operations.
///
/// Generic over the publication identity type so every variant can name
/// the offending identity. Identities are only bound to `Debug`, so they
/// are rendered with `{:?}`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError<I: Debug> {
    /// `create` targeted an identity that is already stored.
    #[error("publication {id:?} already exists")]
    AlreadyExists { id: I },

    /// An operation referenced an identity that is not stored.
    #[error("publication {id:?} not found")]
    NotFound { id: I },

    /// `remove` targeted the root.
    #[error("cannot remove root publication {id:?}")]
    CannotRemoveRoot { id: I },

    /// `add_citation` would close a citation loop.
    #[error("citation of {parent:?} by {child:?} would create a cycle")]
    WouldCreateCycle { child: I, parent: I },

    /// `create_with_parents` was given an empty parent set.
    #[error("publication {id:?} must cite at least one existing publication")]
    NoParents { id: I },
}

pub type GraphResult<T, I> = Result<T, GraphError<I>>;

impl<I: Debug> From<GraphError<I>> for CgError {
    fn from(err: GraphError<I>) -> Self {
        match err {
            GraphError::AlreadyExists { .. } => CgError::InvalidArg {
                what: "duplicate publication id",
            },
            GraphError::NotFound { .. } => CgError::InvalidArg {
                what: "unknown publication id",
            },
            GraphError::CannotRemoveRoot { .. } => CgError::InvalidArg {
                what: "root removal",
            },
            GraphError::WouldCreateCycle { .. } => CgError::InvalidArg {
                what: "citation cycle",
            },
            GraphError::NoParents { .. } => CgError::InvalidArg {
                what: "empty parent set",
            },
        }
    }
}
