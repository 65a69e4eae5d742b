//! Element definitions for the discovery game.

mod element;

pub use element::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for every element held by an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub Uuid);

impl ElementId {
    /// Create a new random element ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Fixed ID for the `n`th seed element.
    ///
    /// Seed IDs live in the low range of the UUID space so they survive a
    /// reset unchanged and never collide with random v4 IDs.
    pub const fn seed(n: u8) -> Self {
        Self(Uuid::from_u128(n as u128))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two parent elements that were fused to produce an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lineage {
    pub first: ElementId,
    pub second: ElementId,
}

impl Lineage {
    pub fn new(first: ElementId, second: ElementId) -> Self {
        Self { first, second }
    }

    /// Check if `id` is one of the parents.
    pub fn involves(&self, id: ElementId) -> bool {
        self.first == id || self.second == id
    }
}

/// Dedup key: two elements with equal name and emoji are the same discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    pub name: String,
    pub emoji: String,
}

impl IdentityKey {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
        }
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.emoji, self.name)
    }
}
