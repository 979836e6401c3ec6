//! Lifecycle events: what observers (logs, screens) are told about.
//!
//! RULE: events are derived from snapshot transitions, never emitted by
//! the pure transforms themselves. The controller compares the snapshot
//! before and after each commit and publishes the difference.

use crate::{
    snapshot::{PetSnapshot, Species, Stage},
    types::{RegenmonId, Timestamp},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PetEvent {
    // ── Controller events ──────────────────────────
    GameStarted {
        name: String,
        species: Species,
        at: Timestamp,
    },
    GameLoaded {
        name: String,
        stage: Stage,
    },
    GameReset,

    // ── Transition events ──────────────────────────
    DeathTimerArmed {
        at: Timestamp,
    },
    DeathTimerCleared {
        at: Timestamp,
    },
    Died {
        at: Timestamp,
    },
    Evolved {
        from: Stage,
        to: Stage,
    },

    // ── Hub events ─────────────────────────────────
    HubRegistered {
        regenmon_id: RegenmonId,
    },
    BalanceReconciled {
        coins: u64,
        total_points: u64,
    },
}

impl PetEvent {
    /// Stable name, used as a log key.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GameStarted { .. }       => "game_started",
            Self::GameLoaded { .. }        => "game_loaded",
            Self::GameReset                => "game_reset",
            Self::DeathTimerArmed { .. }   => "death_timer_armed",
            Self::DeathTimerCleared { .. } => "death_timer_cleared",
            Self::Died { .. }              => "died",
            Self::Evolved { .. }           => "evolved",
            Self::HubRegistered { .. }     => "hub_registered",
            Self::BalanceReconciled { .. } => "balance_reconciled",
        }
    }
}

/// Events implied by moving from `prev` to `next`.
pub fn transitions(prev: &PetSnapshot, next: &PetSnapshot) -> Vec<PetEvent> {
    let mut events = Vec::new();

    match (prev.death_timer, next.death_timer) {
        (None, Some(at)) => events.push(PetEvent::DeathTimerArmed { at }),
        (Some(_), None) => events.push(PetEvent::DeathTimerCleared { at: next.last_update }),
        _ => {}
    }

    if prev.stage != next.stage {
        if next.stage.is_dead() {
            events.push(PetEvent::Died { at: next.last_update });
        } else {
            events.push(PetEvent::Evolved { from: prev.stage, to: next.stage });
        }
    }

    if prev.hub.regenmon_id.is_none() {
        if let Some(id) = &next.hub.regenmon_id {
            events.push(PetEvent::HubRegistered { regenmon_id: id.clone() });
        }
    }

    if prev.coins != next.coins || prev.hub.total_points != next.hub.total_points {
        events.push(PetEvent::BalanceReconciled {
            coins: next.coins,
            total_points: next.hub.total_points,
        });
    }

    events
}
