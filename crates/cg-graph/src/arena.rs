//! Slot-arena storage for graph nodes.

use cg_core::Slot;

use crate::node::Node;
use crate::publication::Publication;

/// Arena owning every node of a graph, addressed by [`Slot`].
///
/// Slots are handed out densely and reused from a free list after
/// removal. The arena is the single owner of node storage; adjacency sets
/// and the graph index refer to nodes only by slot.
///
/// A slot is freed only once the removal sweep has confirmed the node is
/// unreachable and severed every surviving reference to it.
#[derive(Debug)]
pub struct NodeArena<P: Publication> {
    slots: Vec<Option<Node<P>>>,
    free: Vec<Slot>,
}

impl<P: Publication> NodeArena<P> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// True if no node is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slots ever allocated, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Store a node, reusing a freed slot when one is available.
    pub fn insert(&mut self, node: Node<P>) -> Slot {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot.index() as usize] = Some(node);
                slot
            }
            None => {
                let slot = Slot::from_index(self.slots.len() as u32);
                self.slots.push(Some(node));
                slot
            }
        }
    }

    /// Free a slot, returning its node. `None` if the slot is not live.
    pub fn remove(&mut self, slot: Slot) -> Option<Node<P>> {
        let cell = self.slots.get_mut(slot.index() as usize)?;
        let node = cell.take()?;
        self.free.push(slot);
        Some(node)
    }

    /// Shared access to a live node.
    pub fn get(&self, slot: Slot) -> Option<&Node<P>> {
        self.slots.get(slot.index() as usize)?.as_ref()
    }

    /// Exclusive access to a live node.
    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut Node<P>> {
        self.slots.get_mut(slot.index() as usize)?.as_mut()
    }

    /// Iterate over live slots and their nodes, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &Node<P>)> {
        self.slots.iter().enumerate().filter_map(|(i, cell)| {
            cell.as_ref().map(|node| (Slot::from_index(i as u32), node))
        })
    }
}

impl<P: Publication> Default for NodeArena<P> {
    fn default() -> Self {
        Self::new()
    }
}
