//! The two fusion slots.

use serde::{Deserialize, Serialize};

use crate::elements::{Element, ElementId};

/// What a toggle did to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// The element was already selected and has been removed.
    Deselected,
    /// The element was added; one slot is still free.
    Selected,
    /// The element filled the second slot. Carries the pair in pick order.
    PairCompleted(Element, Element),
    /// Both slots were already taken; nothing changed.
    Full,
}

/// Up to two chosen elements, in pick order, never holding the same ID twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    slots: Vec<Element>,
}

impl Selection {
    pub const CAPACITY: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Deselect `element` if it is selected, otherwise append it.
    pub fn toggle(&mut self, element: Element) -> Toggle {
        if let Some(pos) = self.slots.iter().position(|e| e.id == element.id) {
            self.slots.remove(pos);
            return Toggle::Deselected;
        }

        if self.is_full() {
            return Toggle::Full;
        }

        self.slots.push(element);
        match self.slots.as_slice() {
            [first, second] => Toggle::PairCompleted(first.clone(), second.clone()),
            _ => Toggle::Selected,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.slots.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= Self::CAPACITY
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.slots
    }
}
