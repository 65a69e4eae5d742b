//! The canonical starting elements.

use crate::elements::{Element, ElementId};

/// Name and emoji of each seed, in inventory order.
pub const SEED_ELEMENTS: [(&str, &str); 4] = [
    ("Water", "💧"),
    ("Fire", "🔥"),
    ("Earth", "🌍"),
    ("Air", "💨"),
];

/// Build the four seed elements with their fixed IDs.
pub fn seed_elements() -> Vec<Element> {
    SEED_ELEMENTS
        .iter()
        .zip(1u8..)
        .map(|((name, emoji), n)| Element::seed(ElementId::seed(n), *name, *emoji))
        .collect()
}

/// Check if `id` is one of the fixed seed IDs.
pub fn is_seed_id(id: ElementId) -> bool {
    (1..=SEED_ELEMENTS.len() as u8).any(|n| ElementId::seed(n) == id)
}
