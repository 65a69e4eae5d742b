//! Inventory store - the ordered collection of discovered elements.
//!
//! The inventory is the only place new elements come into existence. Every
//! insertion goes through [`Inventory::add`], which checks the
//! `(name, emoji)` identity key first and hands back the stored element when
//! the candidate is a rediscovery.

mod seed;

pub use seed::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::elements::{Candidate, Element, ElementId, IdentityKey};

/// Errors raised when rebuilding an inventory from raw elements.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("element id {0} appears more than once")]
    DuplicateId(ElementId),

    #[error("element {0} appears more than once")]
    DuplicateIdentity(IdentityKey),

    #[error("element {0} is not a seed but has no lineage")]
    MissingLineage(ElementId),
}

/// Result of passing a candidate through the dedup gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// The candidate was novel and is now stored under a fresh ID.
    New(Element),
    /// An element with the same identity key already existed; nothing was inserted.
    Existing(Element),
}

impl Discovery {
    /// The stored element, whichever way the candidate resolved.
    pub fn element(&self) -> &Element {
        match self {
            Discovery::New(element) | Discovery::Existing(element) => element,
        }
    }

    pub fn into_element(self) -> Element {
        match self {
            Discovery::New(element) | Discovery::Existing(element) => element,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Discovery::New(_))
    }
}

/// The discovered elements, in discovery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "Vec<Element>", try_from = "Vec<Element>")]
pub struct Inventory {
    /// Elements in the order they were discovered.
    elements: Vec<Element>,

    /// Index: identity key -> position in `elements`.
    by_identity: HashMap<IdentityKey, usize>,

    /// Index: element ID -> position in `elements`.
    by_id: HashMap<ElementId, usize>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Inventory {
    /// Create an inventory holding exactly the four seed elements.
    pub fn seeded() -> Self {
        let mut inventory = Self {
            elements: Vec::new(),
            by_identity: HashMap::new(),
            by_id: HashMap::new(),
        };
        inventory.seed();
        inventory
    }

    /// Rebuild an inventory from a list of elements, checking both uniqueness invariants.
    pub fn from_elements(elements: Vec<Element>) -> Result<Self, InventoryError> {
        let mut by_identity = HashMap::with_capacity(elements.len());
        let mut by_id = HashMap::with_capacity(elements.len());

        for (index, element) in elements.iter().enumerate() {
            if by_id.insert(element.id, index).is_some() {
                return Err(InventoryError::DuplicateId(element.id));
            }
            if by_identity.insert(element.identity(), index).is_some() {
                return Err(InventoryError::DuplicateIdentity(element.identity()));
            }
            if element.lineage.is_none() && !is_seed_id(element.id) {
                return Err(InventoryError::MissingLineage(element.id));
            }
        }

        Ok(Self {
            elements,
            by_identity,
            by_id,
        })
    }

    /// Reset to exactly the seed elements, discarding every discovery.
    pub fn seed(&mut self) {
        self.elements = seed_elements();
        self.reindex();
    }

    fn reindex(&mut self) {
        self.by_identity.clear();
        self.by_id.clear();
        for (index, element) in self.elements.iter().enumerate() {
            self.by_identity.insert(element.identity(), index);
            self.by_id.insert(element.id, index);
        }
    }

    /// Find the stored element with this exact name and emoji.
    pub fn lookup(&self, name: &str, emoji: &str) -> Option<&Element> {
        self.by_identity
            .get(&IdentityKey::new(name, emoji))
            .and_then(|index| self.elements.get(*index))
    }

    /// Pass a candidate through the dedup gate.
    ///
    /// A rediscovery returns the stored element untouched. A novel candidate
    /// gets a fresh ID, is flagged new, and is appended.
    pub fn add(&mut self, candidate: Candidate) -> Discovery {
        if let Some(existing) = self.lookup(&candidate.name, &candidate.emoji) {
            tracing::debug!(element = %existing, id = %existing.id, "rediscovered element");
            return Discovery::Existing(existing.clone());
        }

        let id = self.fresh_id();
        let element = candidate.into_element(id);
        let index = self.elements.len();

        self.by_identity.insert(element.identity(), index);
        self.by_id.insert(id, index);
        self.elements.push(element.clone());

        tracing::info!(element = %element, id = %id, total = self.elements.len(), "new element discovered");
        Discovery::New(element)
    }

    fn fresh_id(&self) -> ElementId {
        loop {
            let id = ElementId::new();
            if !self.by_id.contains_key(&id) {
                return id;
            }
        }
    }

    /// Get an element by ID.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.by_id.get(&id).and_then(|index| self.elements.get(*index))
    }

    /// Check if an element with this ID is stored.
    pub fn contains(&self, id: ElementId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Number of stored elements.
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over elements in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// All elements in discovery order.
    pub fn as_slice(&self) -> &[Element] {
        &self.elements
    }

    /// The two parents of an element, if it has a lineage and both parents are stored.
    pub fn parents_of(&self, id: ElementId) -> Option<(&Element, &Element)> {
        let lineage = self.get(id)?.lineage?;
        Some((self.get(lineage.first)?, self.get(lineage.second)?))
    }

    /// Every element with `id` as one of its parents, in discovery order.
    pub fn derived_from(&self, id: ElementId) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|element| element.lineage.is_some_and(|lineage| lineage.involves(id)))
            .collect()
    }

    /// Clear the one-shot "new" flag on every element.
    pub fn clear_new_flags(&mut self) {
        for element in &mut self.elements {
            element.is_new = false;
        }
    }
}

impl From<Inventory> for Vec<Element> {
    fn from(inventory: Inventory) -> Self {
        inventory.elements
    }
}

impl TryFrom<Vec<Element>> for Inventory {
    type Error = InventoryError;

    fn try_from(elements: Vec<Element>) -> Result<Self, Self::Error> {
        Self::from_elements(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Lineage;

    fn seed_pair() -> Lineage {
        Lineage::new(ElementId::seed(1), ElementId::seed(3))
    }

    fn steam_from(inventory: &Inventory) -> Candidate {
        let water = inventory.lookup("Water", "💧").unwrap().id;
        let fire = inventory.lookup("Fire", "🔥").unwrap().id;
        Candidate::new("Steam", "♨️", Lineage::new(water, fire))
    }

    #[test]
    fn test_seeded_inventory() {
        let inventory = Inventory::seeded();

        assert_eq!(inventory.size(), 4);
        let names: Vec<_> = inventory.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Water", "Fire", "Earth", "Air"]);
        assert!(inventory.iter().all(|e| e.lineage.is_none()));
    }

    #[test]
    fn test_lookup() {
        let inventory = Inventory::seeded();

        assert!(inventory.lookup("Fire", "🔥").is_some());
        assert!(inventory.lookup("Fire", "💧").is_none());
        assert!(inventory.lookup("Lava", "🌋").is_none());
    }

    #[test]
    fn test_add_new_element() {
        let mut inventory = Inventory::seeded();
        let candidate = steam_from(&inventory);
        let lineage = candidate.lineage;

        let discovery = inventory.add(candidate);

        assert!(discovery.is_new());
        let steam = discovery.element();
        assert!(steam.is_new);
        assert_eq!(steam.lineage, Some(lineage));
        assert!(!steam.is_seed());
        assert_eq!(inventory.size(), 5);
        assert_eq!(inventory.as_slice().last(), Some(steam));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut inventory = Inventory::seeded();

        let first = inventory.add(steam_from(&inventory)).into_element();
        let second = inventory.add(steam_from(&inventory));

        assert!(!second.is_new());
        assert_eq!(second.element().id, first.id);
        assert_eq!(inventory.size(), 5);
    }

    #[test]
    fn test_add_duplicate_with_different_lineage() {
        let mut inventory = Inventory::seeded();
        let original = inventory.add(steam_from(&inventory)).into_element();

        let earth = inventory.lookup("Earth", "🌍").unwrap().id;
        let air = inventory.lookup("Air", "💨").unwrap().id;
        let again = inventory.add(Candidate::new("Steam", "♨️", Lineage::new(earth, air)));

        // The stored element keeps its original lineage.
        assert_eq!(again.element(), &original);
    }

    #[test]
    fn test_rediscovering_a_seed() {
        let mut inventory = Inventory::seeded();
        let water = inventory.lookup("Water", "💧").unwrap().clone();

        let discovery = inventory.add(Candidate::new("Water", "💧", seed_pair()));

        assert_eq!(discovery, Discovery::Existing(water));
        assert_eq!(inventory.size(), 4);
    }

    #[test]
    fn test_identity_never_duplicated() {
        let mut inventory = Inventory::seeded();
        let results = [
            ("Steam", "♨️"),
            ("Mud", "🟤"),
            ("Steam", "♨️"),
            ("Steam", "💨"),
            ("Mud", "🟤"),
            ("Fire", "🔥"),
        ];

        for (name, emoji) in results {
            inventory.add(Candidate::new(name, emoji, seed_pair()));
        }

        let mut keys: Vec<_> = inventory.iter().map(Element::identity).collect();
        let total = keys.len();
        keys.sort_by(|a, b| (&a.name, &a.emoji).cmp(&(&b.name, &b.emoji)));
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(total, 7);
    }

    #[test]
    fn test_seed_discards_discoveries() {
        let mut inventory = Inventory::seeded();
        inventory.add(steam_from(&inventory));
        inventory.add(Candidate::new("Mud", "🟤", seed_pair()));

        inventory.seed();
        inventory.seed();

        assert_eq!(inventory.as_slice(), Inventory::seeded().as_slice());
        assert!(inventory.lookup("Steam", "♨️").is_none());
    }

    #[test]
    fn test_lineage_queries() {
        let mut inventory = Inventory::seeded();
        let water = inventory.lookup("Water", "💧").unwrap().id;
        let fire = inventory.lookup("Fire", "🔥").unwrap().id;
        let earth = inventory.lookup("Earth", "🌍").unwrap().id;

        let steam = inventory.add(steam_from(&inventory)).into_element();
        let mud = inventory
            .add(Candidate::new("Mud", "🟤", Lineage::new(water, earth)))
            .into_element();

        let (first, second) = inventory.parents_of(steam.id).unwrap();
        assert_eq!((first.id, second.id), (water, fire));
        assert!(inventory.parents_of(water).is_none());

        let children: Vec<_> = inventory.derived_from(water).iter().map(|e| e.id).collect();
        assert_eq!(children, vec![steam.id, mud.id]);
        assert!(inventory.derived_from(steam.id).is_empty());
    }

    #[test]
    fn test_clear_new_flags() {
        let mut inventory = Inventory::seeded();
        let steam = inventory.add(steam_from(&inventory)).into_element();

        inventory.clear_new_flags();

        assert!(!inventory.get(steam.id).unwrap().is_new);
    }

    #[test]
    fn test_from_elements_rejects_duplicates() {
        let mut elements = seed_elements();
        elements.push(Element::seed(ElementId::new(), "Water", "💧"));
        assert!(matches!(
            Inventory::from_elements(elements),
            Err(InventoryError::DuplicateIdentity(_))
        ));

        let mut elements = seed_elements();
        elements.push(Element::seed(ElementId::seed(1), "Lava", "🌋"));
        assert_eq!(
            Inventory::from_elements(elements).unwrap_err(),
            InventoryError::DuplicateId(ElementId::seed(1))
        );
    }

    #[test]
    fn test_from_elements_rejects_orphans() {
        let mut elements = seed_elements();
        let orphan = ElementId::new();
        elements.push(Element::seed(orphan, "Mud", "🟤"));

        assert_eq!(
            Inventory::from_elements(elements).unwrap_err(),
            InventoryError::MissingLineage(orphan)
        );
    }

    #[test]
    fn test_discoveries_are_never_seeds() {
        let mut inventory = Inventory::seeded();
        for (name, emoji) in [("Mud", "🟤"), ("Steam", "♨️"), ("Lava", "🌋")] {
            inventory.add(Candidate::new(name, emoji, seed_pair()));
        }

        let seeds: Vec<_> = inventory.iter().filter(|e| e.is_seed()).map(|e| e.id).collect();
        assert_eq!(seeds, seed_elements().iter().map(|e| e.id).collect::<Vec<_>>());
        assert!(inventory.iter().skip(4).all(|e| e.lineage.is_some()));
    }

    #[test]
    fn test_deserialize_rebuilds_index() {
        let mut inventory = Inventory::seeded();
        inventory.add(Candidate::new("Mud", "🟤", seed_pair()));

        let json = serde_json::to_string(&inventory).unwrap();
        let restored: Inventory = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.size(), 5);
        assert!(restored.lookup("Mud", "🟤").is_some());
    }
}
