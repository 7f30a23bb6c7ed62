//! The seam where a human (or a script) chooses the player's action.
//!
//! The world hands the controller the same TurnContext behaviours see.
//! Interactive input lives outside the core; the runner drives the
//! player with `AutoPilot`.

use crate::{
    action::{Action, STAB_AND_STEP_STAMINA_COST},
    behaviour::{Behaviour, TurnContext},
    capability::Capability,
    rng::RandomSource,
};

pub trait PlayerController: Send {
    fn name(&self) -> &'static str;

    fn choose(&mut self, ctx: &TurnContext<'_>, rng: &mut dyn RandomSource) -> Action;
}

/// Never acts.
#[derive(Debug, Default)]
pub struct Idle;

impl PlayerController for Idle {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn choose(&mut self, _ctx: &TurnContext<'_>, _rng: &mut dyn RandomSource) -> Action {
        Action::DoNothing
    }
}

/// Fights the first adjacent enemy, using Stab and Step while stamina
/// allows; otherwise wanders.
#[derive(Debug, Default)]
pub struct AutoPilot;

impl PlayerController for AutoPilot {
    fn name(&self) -> &'static str {
        "autopilot"
    }

    fn choose(&mut self, ctx: &TurnContext<'_>, rng: &mut dyn RandomSource) -> Action {
        let enemy = ctx.adjacent_actors().into_iter().find(|(_, id)| {
            ctx.actors.get(id).is_some_and(|a| a.has(Capability::Enemy))
        });

        if let Some((exit, target)) = enemy {
            let direction = exit.name.to_string();
            let can_skill = ctx.actors[&ctx.actor]
                .stamina
                .is_some_and(|s| s.current() >= s.portion(STAB_AND_STEP_STAMINA_COST));
            return if can_skill {
                Action::StabAndStep { target, direction }
            } else {
                Action::Attack { target, direction }
            };
        }

        Behaviour::Wander.select(ctx, rng).unwrap_or(Action::DoNothing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actor::{Actor, ActorTable, Weapon},
        ground::Terrain,
        map::GameMap,
        rng::FixedRng,
        types::{ActorId, Point},
        weather::WorldState,
    };

    fn setup(stamina: i32) -> (GameMap, ActorTable) {
        let mut map = GameMap::new("t", 3, 3, Terrain::Dirt);
        let mut actors = ActorTable::new();
        let mut player = Actor::new("Player", '@', 150, Weapon::new(15, "punches", 80))
            .with_capability(Capability::HostileToEnemy)
            .with_stamina(200);
        if let Some(s) = player.stamina.as_mut() {
            s.set(stamina);
        }
        actors.insert(ActorId(1), player);
        actors.insert(
            ActorId(2),
            Actor::new("Undead", 't', 100, Weapon::new(30, "hits", 50)).with_capability(Capability::Enemy),
        );
        map.place(ActorId(1), Point::new(1, 1)).unwrap();
        map.place(ActorId(2), Point::new(1, 2)).unwrap();
        (map, actors)
    }

    #[test]
    fn autopilot_uses_skill_when_stamina_allows() {
        let (map, actors) = setup(200);
        let state = WorldState::default();
        let ctx = TurnContext::new(ActorId(1), &map, &actors, &state);
        let action = AutoPilot.choose(&ctx, &mut FixedRng(0));
        assert_eq!(action, Action::StabAndStep { target: ActorId(2), direction: "South".into() });
    }

    #[test]
    fn autopilot_falls_back_to_attack_on_low_stamina() {
        let (map, actors) = setup(10);
        let state = WorldState::default();
        let ctx = TurnContext::new(ActorId(1), &map, &actors, &state);
        let action = AutoPilot.choose(&ctx, &mut FixedRng(0));
        assert_eq!(action, Action::Attack { target: ActorId(2), direction: "South".into() });
    }
}
