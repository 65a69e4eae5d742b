//! The element entity and the not-yet-stored fusion candidate.

use serde::{Deserialize, Serialize};

use super::{ElementId, IdentityKey, Lineage};

/// A named, emoji-tagged discovery held by an inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub emoji: String,

    /// Set on creation for one-shot presentation; carries no game meaning.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,

    /// Parents that produced this element. `None` for seeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage: Option<Lineage>,
}

impl Element {
    /// Create a seed element with a fixed ID and no lineage.
    pub fn seed(id: ElementId, name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            emoji: emoji.into(),
            is_new: false,
            lineage: None,
        }
    }

    /// The dedup key of this element.
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(self.name.clone(), self.emoji.clone())
    }

    /// Check if this element matches the given name and emoji exactly.
    pub fn matches(&self, name: &str, emoji: &str) -> bool {
        self.name == name && self.emoji == emoji
    }

    /// Check if this element is one of the starting elements.
    pub fn is_seed(&self) -> bool {
        self.lineage.is_none()
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.emoji, self.name)
    }
}

/// A fusion result waiting for the inventory's dedup gate. Has no ID yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub emoji: String,
    /// Every discovery has parents; only seeds go without.
    pub lineage: Lineage,
}

impl Candidate {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>, lineage: Lineage) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
            lineage,
        }
    }

    /// The dedup key this candidate will be checked against.
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(self.name.clone(), self.emoji.clone())
    }

    /// Turn the candidate into a stored element under a fresh ID.
    pub(crate) fn into_element(self, id: ElementId) -> Element {
        Element {
            id,
            name: self.name,
            emoji: self.emoji,
            is_new: true,
            lineage: Some(self.lineage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_element() {
        let water = Element::seed(ElementId::seed(1), "Water", "💧");
        assert!(water.is_seed());
        assert!(!water.is_new);
        assert!(water.matches("Water", "💧"));
        assert_eq!(water.to_string(), "💧 Water");
    }

    #[test]
    fn test_candidate_carries_lineage() {
        let lineage = Lineage::new(ElementId::seed(1), ElementId::seed(2));
        let candidate = Candidate::new("Steam", "♨️", lineage);

        assert_eq!(candidate.lineage, lineage);
        assert_eq!(candidate.identity(), IdentityKey::new("Steam", "♨️"));
    }

    #[test]
    fn test_candidate_into_element_is_new() {
        let id = ElementId::new();
        let lineage = Lineage::new(ElementId::seed(1), ElementId::seed(3));
        let element = Candidate::new("Mud", "🟤", lineage).into_element(id);

        assert_eq!(element.id, id);
        assert!(element.is_new);
        assert!(!element.is_seed());
        assert_eq!(element.lineage, Some(lineage));
    }

    #[test]
    fn test_element_serialization_skips_transient_fields() {
        let water = Element::seed(ElementId::seed(1), "Water", "💧");
        let json = serde_json::to_value(&water).unwrap();

        assert!(json.get("is_new").is_none());
        assert!(json.get("lineage").is_none());
        assert_eq!(json["name"], "Water");
    }
}
