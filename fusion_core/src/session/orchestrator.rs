//! Fusion orchestrator - one attempt from oracle call to return to idle.

use alchemy_rules::{Candidate, Element, ElementId, GamePhase, Lineage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::Shared;
use crate::oracle::{FusionResult, Oracle, OracleError};

/// A completed pair handed over by the selection.
#[derive(Debug, Clone)]
pub(crate) struct FusionTicket {
    pub(crate) first: Element,
    pub(crate) second: Element,
    pub(crate) generation: u64,
    pub(crate) entered_fusing: Instant,
}

/// How an attempt resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FusionOutcome {
    /// A novel element was added to the inventory.
    Discovered {
        element: Element,
        description: Option<String>,
    },
    /// The result matched an element already in the inventory.
    Rediscovered {
        element: Element,
        description: Option<String>,
    },
    /// The oracle failed. The inventory was not touched.
    Failed { reason: String },
    /// The game was reset while the oracle was working; the result was dropped.
    Stale,
}

impl FusionOutcome {
    /// The element now on display, if the attempt produced one.
    pub fn element(&self) -> Option<&Element> {
        match self {
            FusionOutcome::Discovered { element, .. }
            | FusionOutcome::Rediscovered { element, .. } => Some(element),
            FusionOutcome::Failed { .. } | FusionOutcome::Stale => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FusionOutcome::Failed { .. })
    }
}

/// Summary of one finished attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionReport {
    pub first: ElementId,
    pub second: ElementId,
    pub outcome: FusionOutcome,
    /// Time between entering and leaving the fusing phase.
    pub fusing_elapsed: Duration,
}

/// Run one attempt: oracle and pacing floor joined, resolve, hold, release.
pub(crate) async fn run<O: Oracle>(shared: Arc<Shared<O>>, ticket: FusionTicket) -> FusionReport {
    let release = Release {
        shared: &shared,
        generation: ticket.generation,
    };

    let (settled, ()) = tokio::join!(
        shared.oracle.fuse(&ticket.first, &ticket.second),
        tokio::time::sleep(shared.timing.min_fusion()),
    );

    let outcome = resolve(&shared, &ticket, settled);
    let fusing_elapsed = ticket.entered_fusing.elapsed();

    if outcome != FusionOutcome::Stale {
        tokio::time::sleep(shared.timing.display_hold()).await;
    }
    drop(release);

    FusionReport {
        first: ticket.first.id,
        second: ticket.second.id,
        outcome,
        fusing_elapsed,
    }
}

/// Apply the settled oracle call to the store, then leave the fusing phase.
fn resolve<O>(
    shared: &Shared<O>,
    ticket: &FusionTicket,
    settled: Result<FusionResult, OracleError>,
) -> FusionOutcome {
    let mut state = shared.lock();

    if state.generation != ticket.generation {
        tracing::debug!(first = %ticket.first, second = %ticket.second, "discarding result from before reset");
        return FusionOutcome::Stale;
    }

    let outcome = match settled {
        Ok(result) => {
            let candidate = Candidate::new(
                result.name,
                result.emoji,
                Lineage::new(ticket.first.id, ticket.second.id),
            );
            let discovery = state.inventory.add(candidate);
            let is_new = discovery.is_new();
            let element = discovery.into_element();
            state.last_discovery = Some(element.clone());

            if is_new {
                FusionOutcome::Discovered {
                    element,
                    description: result.description,
                }
            } else {
                FusionOutcome::Rediscovered {
                    element,
                    description: result.description,
                }
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, first = %ticket.first, second = %ticket.second, "fusion failed");
            FusionOutcome::Failed {
                reason: err.to_string(),
            }
        }
    };

    let next = if outcome.is_failure() {
        GamePhase::Error
    } else {
        GamePhase::Success
    };
    if state.advance(next) {
        shared.publish(next);
    }

    outcome
}

/// Clears the selection and returns to idle when dropped.
///
/// Runs on the normal path after the display hold, and also if the attempt
/// unwinds or is aborted before getting there.
struct Release<'a, O> {
    shared: &'a Shared<O>,
    generation: u64,
}

impl<O> Drop for Release<'_, O> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        if state.generation != self.generation {
            return;
        }

        if state.machine.phase() == GamePhase::Fusing {
            tracing::warn!("fusion attempt ended before resolving");
            if state.advance(GamePhase::Error) {
                self.shared.publish(GamePhase::Error);
            }
        }

        state.selection.clear();
        if state.advance(GamePhase::Idle) {
            self.shared.publish(GamePhase::Idle);
        }
    }
}
