//! Game session - the owning context for inventory, selection and phase.
//!
//! A session is cheap to clone; clones share the same game. Presentation
//! layers read state through [`GameSession::snapshot`] or follow phase
//! changes through [`GameSession::subscribe`], and drive the game with
//! [`GameSession::pick`] and [`GameSession::reset`].

mod orchestrator;

pub use orchestrator::*;

use alchemy_rules::{
    Element, ElementId, GamePhase, Inventory, PhaseMachine, Selection, Toggle,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::FusionTiming;
use crate::oracle::Oracle;

/// Read-only view of the game for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub inventory: Vec<Element>,
    pub selection: Vec<Element>,
    pub phase: GamePhase,
    pub last_discovery: Option<Element>,
}

/// What a pick did.
#[derive(Debug)]
pub enum PickOutcome {
    /// A fusion attempt is live; the pick changed nothing.
    Ignored(GamePhase),
    /// No element with this ID is in the inventory.
    UnknownElement(ElementId),
    Deselected,
    Selected,
    /// The pick completed a pair. The handle resolves once the attempt has
    /// returned the session to idle.
    FusionStarted(JoinHandle<FusionReport>),
}

/// Mutable game state, guarded by the session mutex.
#[derive(Debug, Default)]
pub(crate) struct GameState {
    pub(crate) inventory: Inventory,
    pub(crate) selection: Selection,
    pub(crate) machine: PhaseMachine,
    pub(crate) last_discovery: Option<Element>,
    /// Bumped by every reset so in-flight attempts can tell they are stale.
    pub(crate) generation: u64,
}

impl GameState {
    /// Apply a transition, logging instead of panicking on an illegal one.
    pub(crate) fn advance(&mut self, to: GamePhase) -> bool {
        match self.machine.transition(to) {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(error = %err, "refused phase transition");
                false
            }
        }
    }
}

pub(crate) struct Shared<O> {
    pub(crate) oracle: O,
    pub(crate) timing: FusionTiming,
    state: Mutex<GameState>,
    phase_tx: watch::Sender<GamePhase>,
}

impl<O> Shared<O> {
    pub(crate) fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish the phase to subscribers. Called with the state lock held.
    pub(crate) fn publish(&self, phase: GamePhase) {
        self.phase_tx.send_replace(phase);
    }
}

/// One game, shared by every clone of the handle.
pub struct GameSession<O> {
    shared: Arc<Shared<O>>,
}

impl<O> Clone for GameSession<O> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<O: Oracle + 'static> GameSession<O> {
    /// Start a session holding the seed elements.
    pub fn new(oracle: O, timing: FusionTiming) -> Self {
        let (phase_tx, _) = watch::channel(GamePhase::Idle);
        Self {
            shared: Arc::new(Shared {
                oracle,
                timing,
                state: Mutex::new(GameState::default()),
                phase_tx,
            }),
        }
    }

    /// Toggle an element in or out of the selection.
    ///
    /// When the pick fills the second slot the session moves to fusing and
    /// the attempt is spawned before this returns, so no later pick can
    /// start a second one.
    ///
    /// # Panics
    ///
    /// Completing a pair spawns a task, so this must be called from within a
    /// Tokio runtime.
    pub fn pick(&self, id: ElementId) -> PickOutcome {
        let mut state = self.shared.lock();

        let phase = state.machine.phase();
        if !phase.accepts_picks() {
            tracing::debug!(%id, %phase, "pick ignored while a fusion is live");
            return PickOutcome::Ignored(phase);
        }

        let Some(element) = state.inventory.get(id).cloned() else {
            tracing::debug!(%id, "pick of unknown element");
            return PickOutcome::UnknownElement(id);
        };

        match state.selection.toggle(element) {
            Toggle::Deselected => PickOutcome::Deselected,
            Toggle::Selected => PickOutcome::Selected,
            Toggle::Full => PickOutcome::Ignored(phase),
            Toggle::PairCompleted(first, second) => {
                if !state.advance(GamePhase::Fusing) {
                    state.selection.clear();
                    return PickOutcome::Ignored(phase);
                }
                self.shared.publish(GamePhase::Fusing);

                let ticket = FusionTicket {
                    first,
                    second,
                    generation: state.generation,
                    entered_fusing: Instant::now(),
                };
                drop(state);

                tracing::debug!(first = %ticket.first, second = %ticket.second, "pair completed");
                let handle = tokio::spawn(orchestrator::run(Arc::clone(&self.shared), ticket));
                PickOutcome::FusionStarted(handle)
            }
        }
    }

    /// Put the seed elements back and clear selection, phase and last discovery.
    ///
    /// Any attempt still in flight is left to finish, but its result is discarded.
    pub fn reset(&self) {
        let mut state = self.shared.lock();
        state.generation += 1;
        state.inventory.seed();
        state.selection.clear();
        state.last_discovery = None;
        state.machine.force_idle();
        self.shared.publish(GamePhase::Idle);

        tracing::info!(generation = state.generation, "game reset");
    }
}

impl<O> GameSession<O> {
    pub fn snapshot(&self) -> GameSnapshot {
        let state = self.shared.lock();
        GameSnapshot {
            inventory: state.inventory.as_slice().to_vec(),
            selection: state.selection.as_slice().to_vec(),
            phase: state.machine.phase(),
            last_discovery: state.last_discovery.clone(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.shared.lock().machine.phase()
    }

    pub fn selection(&self) -> Vec<Element> {
        self.shared.lock().selection.as_slice().to_vec()
    }

    pub fn last_discovery(&self) -> Option<Element> {
        self.shared.lock().last_discovery.clone()
    }

    /// Number of discovered elements, for display.
    pub fn inventory_size(&self) -> usize {
        self.shared.lock().inventory.size()
    }

    /// Run a read against the inventory.
    pub fn with_inventory<R>(&self, f: impl FnOnce(&Inventory) -> R) -> R {
        f(&self.shared.lock().inventory)
    }

    /// Clear the one-shot "new" markers once they have been shown.
    pub fn acknowledge_new(&self) {
        self.shared.lock().inventory.clear_new_flags();
    }

    /// Follow phase changes.
    pub fn subscribe(&self) -> watch::Receiver<GamePhase> {
        self.shared.phase_tx.subscribe()
    }

    pub fn timing(&self) -> FusionTiming {
        self.shared.timing
    }
}
