//! The citation graph: a rooted DAG with reachability-preserving removal.

use std::collections::{HashMap, HashSet, VecDeque};

use cg_core::{CgResult, Slot};
use tracing::debug;

use crate::arena::NodeArena;
use crate::error::{GraphError, GraphResult};
use crate::node::Node;
use crate::publication::Publication;
use crate::validate;

/// A rooted, directed, acyclic citation graph.
///
/// Nodes are publications; an edge runs from a cited publication (the
/// "parent") to the citing one (the "child"). The graph maintains, across
/// every operation:
///
/// 1. the root is indexed and is the unique parentless node,
/// 2. every indexed publication is reachable from the root via child
///    edges,
/// 3. parent/child edges never form a cycle,
/// 4. every edge is mirrored in both endpoint adjacency sets.
///
/// Failed operations leave the graph exactly as it was: `create*` and
/// `add_citation` resolve and validate everything they need before the
/// first mutation.
///
/// [`remove`](CitationGraph::remove) is the interesting operation:
/// deleting a publication also deletes every publication left unreachable
/// from the root, while publications with a surviving alternate citation
/// path are kept intact.
#[derive(Debug)]
pub struct CitationGraph<P: Publication> {
    pub(crate) arena: NodeArena<P>,
    pub(crate) index: HashMap<P::Id, Slot>,
    pub(crate) root: Slot,
    pub(crate) root_id: P::Id,
}

impl<P: Publication> CitationGraph<P> {
    /// Create a graph containing exactly the given root publication.
    ///
    /// The root cites nothing, can never be removed, and stays the unique
    /// parentless node for the lifetime of the graph.
    pub fn new(root: P) -> Self {
        let root_id = root.id();
        let mut arena = NodeArena::new();
        let root_slot = arena.insert(Node::new(root));
        let mut index = HashMap::new();
        index.insert(root_id.clone(), root_slot);
        Self {
            arena,
            index,
            root: root_slot,
            root_id,
        }
    }

    /// Identity of the root publication.
    pub fn root_id(&self) -> &P::Id {
        &self.root_id
    }

    /// True iff `id` is stored in the graph.
    pub fn exists(&self, id: &P::Id) -> bool {
        self.index.contains_key(id)
    }

    /// Number of stored publications, root included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Always false: the root is permanent.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Sorted snapshot of every stored identity.
    pub fn ids(&self) -> Vec<P::Id> {
        let mut out: Vec<P::Id> = self.index.keys().cloned().collect();
        out.sort();
        out
    }

    /// Shared access to the publication stored for `id`.
    pub fn publication(&self, id: &P::Id) -> GraphResult<&P, P::Id> {
        Ok(self.node(self.slot_of(id)?).publication())
    }

    /// Exclusive access to the publication stored for `id`.
    ///
    /// There is one stored value per identity: mutations made through
    /// this reference are visible to every later lookup.
    pub fn publication_mut(&mut self, id: &P::Id) -> GraphResult<&mut P, P::Id> {
        let slot = self.slot_of(id)?;
        Ok(self.node_mut(slot).publication_mut())
    }

    /// Sorted snapshot of the identities citing `id`.
    pub fn children_of(&self, id: &P::Id) -> GraphResult<Vec<P::Id>, P::Id> {
        let slot = self.slot_of(id)?;
        let mut out: Vec<P::Id> = self
            .node(slot)
            .children()
            .iter()
            .map(|&child| self.node(child).id())
            .collect();
        out.sort();
        Ok(out)
    }

    /// Sorted snapshot of the identities `id` cites.
    pub fn parents_of(&self, id: &P::Id) -> GraphResult<Vec<P::Id>, P::Id> {
        let slot = self.slot_of(id)?;
        let mut out: Vec<P::Id> = self
            .node(slot)
            .parents()
            .iter()
            .map(|&parent| self.node(parent).id())
            .collect();
        out.sort();
        Ok(out)
    }

    /// Store a publication citing exactly one existing publication.
    pub fn create(&mut self, publication: P, parent_id: &P::Id) -> GraphResult<(), P::Id> {
        self.create_with_parents(publication, std::slice::from_ref(parent_id))
    }

    /// Store a publication citing one or more existing publications.
    ///
    /// All-or-nothing: the identity must be new (`AlreadyExists`
    /// otherwise), the parent set non-empty (`NoParents`), and every
    /// named parent present (`NotFound`). The whole parent set is
    /// resolved before the index or any adjacency set is touched, so a
    /// failed call links nothing. Duplicate entries in `parent_ids`
    /// collapse to a single edge.
    pub fn create_with_parents(
        &mut self,
        publication: P,
        parent_ids: &[P::Id],
    ) -> GraphResult<(), P::Id> {
        let id = publication.id();
        if self.index.contains_key(&id) {
            return Err(GraphError::AlreadyExists { id });
        }
        if parent_ids.is_empty() {
            return Err(GraphError::NoParents { id });
        }

        let mut parents = Vec::with_capacity(parent_ids.len());
        for parent_id in parent_ids {
            parents.push(self.slot_of(parent_id)?);
        }

        let slot = self.arena.insert(Node::new(publication));
        self.index.insert(id, slot);
        for parent in parents {
            self.node_mut(parent).add_child(slot);
            self.node_mut(slot).add_parent(parent);
        }
        Ok(())
    }

    /// Add a citation edge between two existing publications: `child_id`
    /// cites `parent_id`.
    ///
    /// No-op if the edge is already present. Fails with `NotFound` if
    /// either identity is absent, and with `WouldCreateCycle` if
    /// `parent_id` equals `child_id` or is reachable from `child_id` via
    /// child edges; nothing is mutated on failure.
    pub fn add_citation(&mut self, child_id: &P::Id, parent_id: &P::Id) -> GraphResult<(), P::Id> {
        let child = self.slot_of(child_id)?;
        let parent = self.slot_of(parent_id)?;

        if self.node(parent).children().contains(&child) {
            return Ok(());
        }
        if parent == child || self.reaches(child, parent) {
            return Err(GraphError::WouldCreateCycle {
                child: child_id.clone(),
                parent: parent_id.clone(),
            });
        }

        self.node_mut(parent).add_child(child);
        self.node_mut(child).add_parent(parent);
        Ok(())
    }

    /// Remove a publication and everything orphaned by its removal.
    ///
    /// After the target is detached from its neighbors, reachability from
    /// the root is recomputed over the whole graph and every publication
    /// the walk no longer reaches is purged: the target itself plus any
    /// descendant without an alternate citation path. Survivors keep all
    /// edges among themselves. O(V+E) per call; a removed edge can orphan
    /// a subtree arbitrarily far away, so there is no cheaper local
    /// recheck.
    pub fn remove(&mut self, id: &P::Id) -> GraphResult<(), P::Id> {
        if *id == self.root_id {
            return Err(GraphError::CannotRemoveRoot { id: id.clone() });
        }
        let slot = self.slot_of(id)?;

        // Detach the target from both edge directions.
        let parents: Vec<Slot> = self.node(slot).parents().iter().copied().collect();
        for parent in parents {
            self.node_mut(parent).remove_child(slot);
        }
        let children: Vec<Slot> = self.node(slot).children().iter().copied().collect();
        for child in children {
            self.node_mut(child).remove_parent(slot);
        }
        self.node_mut(slot).clear_edges();

        // Mark, then sweep everything the walk missed.
        let reachable = self.mark_reachable();
        let dead: Vec<(P::Id, Slot)> = self
            .index
            .iter()
            .filter(|(_, slot)| !reachable.contains(*slot))
            .map(|(dead_id, slot)| (dead_id.clone(), *slot))
            .collect();

        for (dead_id, dead_slot) in &dead {
            // A reachable parent would have kept this node reachable, so
            // only child edges can cross out of the dead set.
            let surviving_children: Vec<Slot> = self
                .node(*dead_slot)
                .children()
                .iter()
                .copied()
                .filter(|child| reachable.contains(child))
                .collect();
            for child in surviving_children {
                self.node_mut(child).remove_parent(*dead_slot);
            }
            self.index.remove(dead_id);
            self.arena.remove(*dead_slot);
        }

        debug!(target_id = ?id, swept = dead.len(), live = self.index.len(), "removal sweep");
        Ok(())
    }

    /// Audit every graph invariant.
    ///
    /// Returns `CgError::Invariant` naming the first violated property.
    /// Intended for tests and debugging.
    pub fn validate(&self) -> CgResult<()> {
        validate::check(self)
    }

    fn slot_of(&self, id: &P::Id) -> GraphResult<Slot, P::Id> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NotFound { id: id.clone() })
    }

    fn node(&self, slot: Slot) -> &Node<P> {
        // Slots held by the index or an adjacency set are always live.
        self.arena.get(slot).expect("graph slot is live")
    }

    fn node_mut(&mut self, slot: Slot) -> &mut Node<P> {
        self.arena.get_mut(slot).expect("graph slot is live")
    }

    /// True if `target` can be reached from `from` by following child
    /// edges.
    fn reaches(&self, from: Slot, target: Slot) -> bool {
        let mut visited: HashSet<Slot> = HashSet::new();
        let mut queue: VecDeque<Slot> = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);
        while let Some(slot) = queue.pop_front() {
            if slot == target {
                return true;
            }
            for &child in self.node(slot).children() {
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        false
    }

    /// Slots reachable from the root via child edges.
    ///
    /// Traversal state lives in the returned set, never on the nodes.
    pub(crate) fn mark_reachable(&self) -> HashSet<Slot> {
        let mut visited: HashSet<Slot> = HashSet::with_capacity(self.index.len());
        let mut queue: VecDeque<Slot> = VecDeque::new();
        visited.insert(self.root);
        queue.push_back(self.root);
        while let Some(slot) = queue.pop_front() {
            for &child in self.node(slot).children() {
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Paper(u32);

    impl Publication for Paper {
        type Id = u32;
        fn id(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn new_graph_contains_only_root() {
        let graph = CitationGraph::new(Paper(0));
        assert_eq!(*graph.root_id(), 0);
        assert!(graph.exists(&0));
        assert_eq!(graph.len(), 1);
        assert!(!graph.is_empty());
        assert_eq!(graph.ids(), vec![0]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn create_links_both_directions() {
        let mut graph = CitationGraph::new(Paper(0));
        graph.create(Paper(1), &0).unwrap();

        assert_eq!(graph.children_of(&0).unwrap(), vec![1]);
        assert_eq!(graph.parents_of(&1).unwrap(), vec![0]);
        assert!(graph.children_of(&1).unwrap().is_empty());
        assert!(graph.parents_of(&0).unwrap().is_empty());
    }

    #[test]
    fn lookup_missing_id_is_not_found() {
        let mut graph = CitationGraph::new(Paper(0));
        assert_eq!(
            graph.publication(&9).unwrap_err(),
            GraphError::NotFound { id: 9 }
        );
        assert_eq!(
            graph.publication_mut(&9).unwrap_err(),
            GraphError::NotFound { id: 9 }
        );
        assert_eq!(
            graph.children_of(&9).unwrap_err(),
            GraphError::NotFound { id: 9 }
        );
    }

    #[test]
    fn duplicate_parent_ids_collapse_to_one_edge() {
        let mut graph = CitationGraph::new(Paper(0));
        graph
            .create_with_parents(Paper(1), &[0, 0, 0])
            .unwrap();

        assert_eq!(graph.parents_of(&1).unwrap(), vec![0]);
        assert_eq!(graph.children_of(&0).unwrap(), vec![1]);
    }

    #[test]
    fn slot_reuse_after_removal_stays_consistent() {
        let mut graph = CitationGraph::new(Paper(0));
        graph.create(Paper(1), &0).unwrap();
        graph.remove(&1).unwrap();

        // The freed arena slot is recycled for a fresh publication.
        graph.create(Paper(2), &0).unwrap();
        assert!(graph.exists(&2));
        assert!(!graph.exists(&1));
        assert_eq!(graph.children_of(&0).unwrap(), vec![2]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn removed_identity_can_be_recreated() {
        let mut graph = CitationGraph::new(Paper(0));
        graph.create(Paper(1), &0).unwrap();
        graph.remove(&1).unwrap();

        // Fresh node, not a resurrection: no old edges survive.
        graph.create(Paper(1), &0).unwrap();
        assert_eq!(graph.parents_of(&1).unwrap(), vec![0]);
        assert!(graph.children_of(&1).unwrap().is_empty());
    }
}
