//! # Alchemy Rules
//!
//! The rulebook crate - element identity, the discovery inventory, the
//! selection slots and the game phase table. This crate is the single source
//! of truth for game state and does not contain any oracle or async logic.

pub mod elements;
pub mod inventory;
pub mod phase;
pub mod selection;

pub use elements::*;
pub use inventory::*;
pub use phase::*;
pub use selection::*;
