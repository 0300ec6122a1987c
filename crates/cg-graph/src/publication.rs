//! The publication contract.

use core::fmt::Debug;
use core::hash::Hash;

/// Payload stored per graph node.
///
/// The graph is agnostic to everything about a publication except its
/// identity, which is used as the index key. Identities are unique within
/// one graph instance: the graph stores exactly one publication value per
/// distinct identity, and callers always hand the graph a fully-formed
/// value (the graph never synthesizes publications itself).
pub trait Publication {
    /// Identity type.
    ///
    /// `Ord` lets adjacency snapshots come back in a deterministic order;
    /// `Debug` lets errors name the offending identity.
    type Id: Clone + Eq + Hash + Ord + Debug;

    /// The identity of this publication.
    ///
    /// Must be stable for as long as the value is stored in a graph; the
    /// index is never re-keyed.
    fn id(&self) -> Self::Id;
}
