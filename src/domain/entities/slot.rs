//! View slot identity and binding tokens.

use super::ImageId;

/// Identifies a reusable row in a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

impl SlotId {
    /// Raw slot index.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for SlotId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// The binding a slot currently accepts image results for.
///
/// Every `bind` on a slot creates a token with a fresh generation, so a
/// completion carrying an older token is recognised as stale even when the
/// slot was rebound to the very same URL in between.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingToken {
    /// Slot that issued the request.
    pub slot: SlotId,
    /// Image the slot was bound to.
    pub url: ImageId,
    /// Bind counter of the slot when the request was issued.
    pub generation: u64,
}

impl BindingToken {
    /// Creates a token for one bind.
    #[must_use]
    pub const fn new(slot: SlotId, url: ImageId, generation: u64) -> Self {
        Self {
            slot,
            url,
            generation,
        }
    }
}

impl std::fmt::Display for BindingToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} ({})", self.slot, self.generation, self.url)
    }
}
