//! Every observable state change in a round.
//!
//! RULE: The world emits events; it never prints. The engine journals
//! them, the runner displays them.

use crate::{
    action::ActionKind,
    types::{ActorId, RunId, Tick},
    weather::WeatherState,
};
use serde::{Deserialize, Serialize};

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    RoundStarted {
        tick: Tick,
    },
    RoundCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },

    // ── Weather ────────────────────────────────────
    WeatherChanged {
        tick: Tick,
        weather: WeatherState,
        source: String, // "world" | "controller" | "controller_defeated"
    },

    // ── Grounds ────────────────────────────────────
    ActorSpawned {
        tick: Tick,
        actor: ActorId,
        creature: String,
        map: String,
        x: i32,
        y: i32,
        roll: u32,
        effective_percentage: f64,
    },
    SpawnBlocked {
        tick: Tick,
        creature: String,
        map: String,
        x: i32,
        y: i32,
    },

    // ── Turns ──────────────────────────────────────
    ActionTaken {
        tick: Tick,
        actor: ActorId,
        kind: ActionKind,
        target: Option<ActorId>,
        description: String,
    },
    FollowAttached {
        tick: Tick,
        actor: ActorId,
        target: ActorId,
    },
    ActorDefeated {
        tick: Tick,
        actor: ActorId,
        name: String,
        by: Option<ActorId>,
        map: String,
    },
    ItemDropped {
        tick: Tick,
        item: String,
        map: String,
        x: i32,
        y: i32,
    },
    PlayerRevived {
        tick: Tick,
        actor: ActorId,
    },
    WorldReset {
        tick: Tick,
        purged_actors: usize,
        cleared_items: usize,
    },
}

impl SimEvent {
    /// Stable string name used for the journal's event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RoundStarted { .. }   => "round_started",
            Self::RoundCompleted { .. } => "round_completed",
            Self::RunInitialized { .. } => "run_initialized",
            Self::WeatherChanged { .. } => "weather_changed",
            Self::ActorSpawned { .. }   => "actor_spawned",
            Self::SpawnBlocked { .. }   => "spawn_blocked",
            Self::ActionTaken { .. }    => "action_taken",
            Self::FollowAttached { .. } => "follow_attached",
            Self::ActorDefeated { .. }  => "actor_defeated",
            Self::ItemDropped { .. }    => "item_dropped",
            Self::PlayerRevived { .. }  => "player_revived",
            Self::WorldReset { .. }     => "world_reset",
        }
    }
}
