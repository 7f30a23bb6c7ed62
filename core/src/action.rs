//! Actions: the values behaviours and players choose, and what
//! happens when they run.
//!
//! Execution never fails hard. A blocked move or a skill without the
//! stamina to pay for it reports what went wrong in its description
//! and leaves the world unchanged; the round carries on.

use crate::{
    actor::ActorTable,
    rng::RandomSource,
    types::{ActorId, MapId, Point},
    world::World,
};
use serde::{Deserialize, Serialize};

/// Share of max stamina a Stab and Step costs.
pub const STAB_AND_STEP_STAMINA_COST: f64 = 0.25;
pub const HIT_ROLL_BOUND: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Attack { target: ActorId, direction: String },
    Move { to: Point, direction: String },
    /// Attack, then retreat out of reach on the following turn.
    StabAndStep { target: ActorId, direction: String },
    /// Step to a tile the threat cannot reach in one move.
    SafeStep { away_from: ActorId },
    DoNothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Move,
    StabAndStep,
    SafeStep,
    DoNothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub description: String,
    /// Played by the same actor at the start of its next turn.
    pub next: Option<Action>,
}

impl ActionOutcome {
    fn done(description: String) -> Self {
        Self { description, next: None }
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Attack { .. } => ActionKind::Attack,
            Self::Move { .. } => ActionKind::Move,
            Self::StabAndStep { .. } => ActionKind::StabAndStep,
            Self::SafeStep { .. } => ActionKind::SafeStep,
            Self::DoNothing => ActionKind::DoNothing,
        }
    }

    /// The actor this action is aimed at, if any.
    pub fn target(&self) -> Option<ActorId> {
        match self {
            Self::Attack { target, .. } | Self::StabAndStep { target, .. } => Some(*target),
            Self::SafeStep { away_from } => Some(*away_from),
            Self::Move { .. } | Self::DoNothing => None,
        }
    }

    pub fn menu_description(&self, actor: ActorId, actors: &ActorTable) -> String {
        let name = |id: ActorId| actors.get(&id).map_or_else(|| id.to_string(), |a| a.name.clone());
        match self {
            Self::Attack { target, direction } => {
                format!("{} attacks {} at {direction}", name(actor), name(*target))
            }
            Self::Move { direction, .. } => format!("{} moves {direction}", name(actor)),
            Self::StabAndStep { target, .. } => {
                format!("{} uses Stab and Step on {}", name(actor), name(*target))
            }
            Self::SafeStep { away_from } => {
                format!("{} steps away from {}", name(actor), name(*away_from))
            }
            Self::DoNothing => format!("{} does nothing", name(actor)),
        }
    }

    pub fn execute(
        self,
        actor: ActorId,
        map: MapId,
        world: &mut World,
        rng: &mut dyn RandomSource,
    ) -> ActionOutcome {
        match self {
            Self::Attack { target, .. } => ActionOutcome::done(attack(actor, target, map, world, rng)),
            Self::Move { to, direction } => ActionOutcome::done(step(actor, to, &direction, map, world)),
            Self::StabAndStep { target, .. } => stab_and_step(actor, target, map, world, rng),
            Self::SafeStep { away_from } => ActionOutcome::done(safe_step(actor, away_from, map, world, rng)),
            Self::DoNothing => {
                let name = world.actor(actor).map(|a| a.name.clone()).unwrap_or_default();
                ActionOutcome::done(format!("{name} does nothing"))
            }
        }
    }
}

fn attack(
    actor: ActorId,
    target: ActorId,
    map: MapId,
    world: &mut World,
    rng: &mut dyn RandomSource,
) -> String {
    let Some(attacker) = world.actor(actor) else {
        return String::new();
    };
    let attacker_name = attacker.name.clone();
    let weapon = attacker.weapon();

    let in_reach = world.map(map).is_some_and(|m| m.contains(target));
    let Some(victim) = world.actor_mut(target).filter(|_| in_reach) else {
        return format!("{attacker_name} swings at empty air");
    };
    let victim_name = victim.name.clone();

    if rng.next_below(HIT_ROLL_BOUND) > weapon.hit_chance {
        return format!("{attacker_name} misses {victim_name}.");
    }

    victim.hurt(weapon.damage as i32);
    let mut result = format!(
        "{attacker_name} {} {victim_name} for {} damage.",
        weapon.verb, weapon.damage
    );

    if !victim.is_conscious() {
        result.push('\n');
        result.push_str(&world.resolve_unconscious(target, Some(actor), map, rng));
    }
    result
}

fn step(actor: ActorId, to: Point, direction: &str, map: MapId, world: &mut World) -> String {
    let name = world.actor(actor).map(|a| a.name.clone()).unwrap_or_default();
    let moved = world.map_mut(map).is_some_and(|m| m.move_actor(actor, to));
    if moved {
        format!("{name} moves {direction}")
    } else {
        format!("{name} cannot move {direction}")
    }
}

fn stab_and_step(
    actor: ActorId,
    target: ActorId,
    map: MapId,
    world: &mut World,
    rng: &mut dyn RandomSource,
) -> ActionOutcome {
    let Some(stamina) = world.actor_mut(actor).and_then(|a| a.stamina.as_mut()) else {
        return ActionOutcome::done("Low stamina! Stab and Step can't be activated".into());
    };
    let cost = stamina.portion(STAB_AND_STEP_STAMINA_COST);
    if stamina.current() < cost {
        return ActionOutcome::done("Low stamina! Stab and Step can't be activated".into());
    }
    stamina.decrease(cost);

    let strike = attack(actor, target, map, world, rng);
    ActionOutcome {
        description: format!("Stab and Step activated\n{strike}"),
        next: Some(Action::SafeStep { away_from: target }),
    }
}

fn safe_step(
    actor: ActorId,
    threat: ActorId,
    map: MapId,
    world: &mut World,
    rng: &mut dyn RandomSource,
) -> String {
    let Some(actor_ref) = world.actor(actor) else {
        return String::new();
    };
    let name = actor_ref.name.clone();
    let tags = actor_ref.capabilities;
    let Some(game_map) = world.map(map) else {
        return format!("{name} has nowhere to step");
    };
    let Some(origin) = game_map.locate(actor) else {
        return format!("{name} has nowhere to step");
    };

    let danger: Vec<Point> = match game_map.locate(threat) {
        Some(at) => game_map.exits(at).into_iter().map(|e| e.destination).collect(),
        None => Vec::new(),
    };
    let candidates: Vec<(Point, &'static str)> = game_map
        .exits(origin)
        .into_iter()
        .filter(|e| game_map.can_enter(e.destination, &tags) && !danger.contains(&e.destination))
        .map(|e| (e.destination, e.name))
        .collect();

    if candidates.is_empty() {
        return format!("{name} finds nowhere safe to step");
    }
    let (to, direction) = candidates[rng.next_below(candidates.len() as u32) as usize];
    step(actor, to, direction, map, world)
}
