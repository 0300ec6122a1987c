use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable address of a node slot in the graph arena.
///
/// - `u32` keeps adjacency sets small
/// - `NonZero` enables `Option<Slot>` to be pointer-optimized
///
/// Slots address storage, not publications: the arena may hand a freed
/// slot to a later insertion, so a `Slot` must never outlive the index
/// entry it was resolved from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot(NonZeroU32);

impl Slot {
    /// Create a Slot from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        // index+1 must be nonzero
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.index())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}
