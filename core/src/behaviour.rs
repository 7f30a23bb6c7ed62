//! Behaviour selection for non-player actors.
//!
//! A registry holds (priority, behaviour) pairs. evaluate() walks them
//! in ascending priority and returns the first action produced, or
//! DoNothing when none produce one.
//!
//! TIE-BREAK CONTRACT for equal priorities:
//!   - register() places a behaviour after every entry of equal rank
//!     (registration order wins).
//!   - register_ahead() places it before them.
//!   - follow() retargets an existing Follow in place, otherwise
//!     inserts one ahead of its rank so it supersedes Wander.

use crate::{
    action::Action,
    actor::ActorTable,
    capability::{Capability, CapabilitySet},
    map::{Exit, GameMap},
    rng::RandomSource,
    types::{ActorId, Point},
    weather::WorldState,
};
use serde::{Deserialize, Serialize};

/// Lower is evaluated first.
pub type Priority = u8;

pub const ATTACK_PRIORITY: Priority = 1;
pub const FOLLOW_PRIORITY: Priority = 2;
pub const WANDER_PRIORITY: Priority = 2;

/// Everything a behaviour may look at while choosing.
pub struct TurnContext<'a> {
    pub actor: ActorId,
    pub origin: Point,
    pub map: &'a GameMap,
    pub actors: &'a ActorTable,
    pub state: &'a WorldState,
}

impl<'a> TurnContext<'a> {
    /// Panics if `actor` is not on `map` or not in `actors`: asking an
    /// absent actor to take a turn is a scheduling bug.
    pub fn new(actor: ActorId, map: &'a GameMap, actors: &'a ActorTable, state: &'a WorldState) -> Self {
        let origin = map
            .locate(actor)
            .unwrap_or_else(|| panic!("actor {actor} is not on map '{}'", map.name));
        assert!(actors.contains_key(&actor), "actor {actor} missing from actor table");
        Self { actor, origin, map, actors, state }
    }

    pub fn tags(&self) -> CapabilitySet {
        self.actors[&self.actor].capabilities
    }

    /// Exits the acting actor could step through right now.
    pub fn enterable_exits(&self) -> Vec<Exit> {
        let tags = self.tags();
        self.map
            .exits(self.origin)
            .into_iter()
            .filter(|exit| self.map.can_enter(exit.destination, &tags))
            .collect()
    }

    /// Neighbouring actors in exit order.
    pub fn adjacent_actors(&self) -> Vec<(Exit, ActorId)> {
        self.map
            .exits(self.origin)
            .into_iter()
            .filter_map(|exit| self.map.actor_at(exit.destination).map(|id| (exit, id)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Behaviour {
    /// Strike the first adjacent actor hostile to enemies.
    Attack,
    /// Close distance on a fixed target.
    Follow { target: ActorId },
    /// Step to a random enterable neighbour.
    Wander,
}

impl Behaviour {
    pub fn priority(&self) -> Priority {
        match self {
            Self::Attack => ATTACK_PRIORITY,
            Self::Follow { .. } => FOLLOW_PRIORITY,
            Self::Wander => WANDER_PRIORITY,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Follow { .. } => "follow",
            Self::Wander => "wander",
        }
    }

    pub fn select(&self, ctx: &TurnContext<'_>, rng: &mut dyn RandomSource) -> Option<Action> {
        match self {
            Self::Attack => attack(ctx),
            Self::Follow { target } => follow(ctx, *target),
            Self::Wander => wander(ctx, rng),
        }
    }
}

fn attack(ctx: &TurnContext<'_>) -> Option<Action> {
    ctx.adjacent_actors().into_iter().find_map(|(exit, other)| {
        let hostile = ctx
            .actors
            .get(&other)
            .is_some_and(|a| a.capabilities.has(Capability::HostileToEnemy));
        hostile.then(|| Action::Attack { target: other, direction: exit.name.to_string() })
    })
}

fn follow(ctx: &TurnContext<'_>, target: ActorId) -> Option<Action> {
    let target_at = ctx.map.locate(target)?;
    let current = ctx.origin.manhattan(target_at);

    let mut best: Option<(u32, Exit)> = None;
    for exit in ctx.enterable_exits() {
        let distance = exit.destination.manhattan(target_at);
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, exit));
        }
    }

    // Never step sideways or away: standing still beats oscillating.
    let (distance, exit) = best?;
    (distance < current).then(|| Action::Move {
        to: exit.destination,
        direction: exit.name.to_string(),
    })
}

fn wander(ctx: &TurnContext<'_>, rng: &mut dyn RandomSource) -> Option<Action> {
    let exits = ctx.enterable_exits();
    if exits.is_empty() {
        return None;
    }
    let exit = exits[rng.next_below(exits.len() as u32) as usize];
    Some(Action::Move { to: exit.destination, direction: exit.name.to_string() })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviourRegistry {
    entries: Vec<(Priority, Behaviour)>,
}

impl BehaviourRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register at the behaviour's own priority.
    pub fn with(mut self, behaviour: Behaviour) -> Self {
        self.register(behaviour.priority(), behaviour);
        self
    }

    /// Insert after every entry with priority <= `priority`.
    pub fn register(&mut self, priority: Priority, behaviour: Behaviour) {
        let at = self.entries.partition_point(|(p, _)| *p <= priority);
        self.entries.insert(at, (priority, behaviour));
    }

    /// Insert before every entry with priority >= `priority`.
    pub fn register_ahead(&mut self, priority: Priority, behaviour: Behaviour) {
        let at = self.entries.partition_point(|(p, _)| *p < priority);
        self.entries.insert(at, (priority, behaviour));
    }

    /// Point this actor's Follow at `target`. Returns false when it
    /// already followed `target` and nothing changed.
    pub fn follow(&mut self, target: ActorId) -> bool {
        for (_, behaviour) in &mut self.entries {
            if let Behaviour::Follow { target: current } = behaviour {
                if *current == target {
                    return false;
                }
                *current = target;
                return true;
            }
        }
        self.register_ahead(FOLLOW_PRIORITY, Behaviour::Follow { target });
        true
    }

    pub fn following(&self) -> Option<ActorId> {
        self.entries.iter().find_map(|(_, b)| match b {
            Behaviour::Follow { target } => Some(*target),
            _ => None,
        })
    }

    /// The first action any behaviour produces, in priority order.
    pub fn evaluate(&self, ctx: &TurnContext<'_>, rng: &mut dyn RandomSource) -> Action {
        self.entries
            .iter()
            .find_map(|(_, behaviour)| behaviour.select(ctx, rng))
            .unwrap_or(Action::DoNothing)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Priority, Behaviour)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
