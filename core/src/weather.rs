//! Weather: the process-wide condition and the controller that drives it.
//!
//! There is no global weather variable. The current value lives in
//! `WorldState`, which the world threads into every call that reads it
//! (ground ticks, spawns, turns). Controllers are the only writers.
//!
//! A controller is either:
//!   - Passive: owned by the world, broadcasts only when told to.
//!   - Active: bound to a controller actor with a period `p`. Each
//!     tick() walks a counter that starts at 1: SUNNY while the counter
//!     is below `p`, RAINY otherwise, wrapping to 0 when it reaches `2p`.
//!     tick() only retags the controller actor; the owner decides when
//!     to broadcast.

use crate::{
    actor::ActorTable,
    capability::{Capability, CapabilitySet},
    map::GameMap,
    types::{ActorId, MapId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherState {
    Sunny,
    Rainy,
    Normal,
}

impl WeatherState {
    pub const ALL: [WeatherState; 3] = [Self::Sunny, Self::Rainy, Self::Normal];

    pub fn tag(self) -> Capability {
        match self {
            Self::Sunny => Capability::Sunny,
            Self::Rainy => Capability::Rainy,
            Self::Normal => Capability::Normal,
        }
    }

    /// The weather currently tagged on `tags`, if any.
    pub fn of(tags: &CapabilitySet) -> Option<WeatherState> {
        Self::ALL.into_iter().find(|w| tags.has(w.tag()))
    }
}

/// Replace whatever weather tag `tags` carries with `weather`.
/// Old tags are removed before the new one is added, so an entity
/// never holds two weather tags at once.
pub fn retag(tags: &mut CapabilitySet, weather: WeatherState) {
    for w in WeatherState::ALL {
        tags.remove(w.tag());
    }
    tags.add(weather.tag());
}

/// Shared world state threaded explicitly through the round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub weather: WeatherState,
}

impl Default for WorldState {
    fn default() -> Self {
        Self { weather: WeatherState::Sunny }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ControllerMode {
    Passive,
    Active { controller: ActorId, period: u32, counter: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherController {
    mode: ControllerMode,
    maps: Vec<MapId>,
    current: WeatherState,
}

impl WeatherController {
    /// A display-only controller. Starts SUNNY and never cycles.
    pub fn passive(maps: Vec<MapId>) -> Self {
        Self {
            mode: ControllerMode::Passive,
            maps,
            current: WeatherState::Sunny,
        }
    }

    /// A cycling controller bound to `controller`. Tags the actor SUNNY.
    pub fn active(
        controller: ActorId,
        controller_tags: &mut CapabilitySet,
        period: u32,
        maps: Vec<MapId>,
    ) -> Self {
        assert!(period > 0, "weather period must be > 0");
        retag(controller_tags, WeatherState::Sunny);
        Self {
            mode: ControllerMode::Active { controller, period, counter: 1 },
            maps,
            current: WeatherState::Sunny,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.mode, ControllerMode::Active { .. })
    }

    pub fn controller(&self) -> Option<ActorId> {
        match self.mode {
            ControllerMode::Active { controller, .. } => Some(controller),
            ControllerMode::Passive => None,
        }
    }

    pub fn current(&self) -> WeatherState {
        self.current
    }

    pub fn maps(&self) -> &[MapId] {
        &self.maps
    }

    /// Advance the cycle one step and retag the controller actor.
    /// Returns the new state, or None for a passive controller.
    pub fn tick(&mut self, controller_tags: &mut CapabilitySet) -> Option<WeatherState> {
        let ControllerMode::Active { period, counter, .. } = &mut self.mode else {
            return None;
        };

        let next = if *counter < *period {
            WeatherState::Sunny
        } else {
            WeatherState::Rainy
        };

        *counter += 1;
        if *counter == *period * 2 {
            *counter = 0;
        }

        retag(controller_tags, next);
        self.current = next;
        log::debug!("weather controller ticked: {next:?} (counter now {counter})");
        Some(next)
    }

    pub fn set_sunny(&mut self, maps: &mut [GameMap], actors: &mut ActorTable, state: &mut WorldState) {
        self.broadcast(WeatherState::Sunny, maps, actors, state);
    }

    pub fn set_rainy(&mut self, maps: &mut [GameMap], actors: &mut ActorTable, state: &mut WorldState) {
        self.broadcast(WeatherState::Rainy, maps, actors, state);
    }

    pub fn set_normal(&mut self, maps: &mut [GameMap], actors: &mut ActorTable, state: &mut WorldState) {
        self.broadcast(WeatherState::Normal, maps, actors, state);
    }

    /// Tag every actor and every ground cell of every configured map
    /// with `weather`, and record it as the world's current weather.
    pub fn broadcast(
        &mut self,
        weather: WeatherState,
        maps: &mut [GameMap],
        actors: &mut ActorTable,
        state: &mut WorldState,
    ) {
        for map_id in &self.maps {
            let Some(map) = maps.get_mut(map_id.0) else {
                log::warn!("weather broadcast skipped unknown map {map_id:?}");
                continue;
            };
            for point in map.points().collect::<Vec<_>>() {
                if let Some(occupant) = map.actor_at(point) {
                    if let Some(actor) = actors.get_mut(&occupant) {
                        retag(&mut actor.capabilities, weather);
                    }
                }
                if let Some(ground) = map.ground_mut(point) {
                    retag(&mut ground.capabilities, weather);
                }
            }
        }
        self.current = weather;
        state.weather = weather;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retag_keeps_a_single_weather_tag() {
        let mut tags = CapabilitySet::new().with(Capability::Enemy);
        retag(&mut tags, WeatherState::Normal);
        retag(&mut tags, WeatherState::Sunny);
        assert!(tags.has(Capability::Sunny));
        assert!(!tags.has(Capability::Normal));
        assert!(tags.has(Capability::Enemy));
        assert_eq!(WeatherState::of(&tags), Some(WeatherState::Sunny));
    }

    #[test]
    fn active_cycle_with_period_three() {
        let mut tags = CapabilitySet::new();
        let mut ctl = WeatherController::active(ActorId(1), &mut tags, 3, vec![]);
        assert!(tags.has(Capability::Sunny));

        let seen: Vec<WeatherState> = (0..12).map(|_| ctl.tick(&mut tags).unwrap()).collect();
        use WeatherState::{Rainy as R, Sunny as S};
        // counter 1,2 -> sunny; 3,4,5 -> rainy, wrap; then 0,1,2 / 3,4,5.
        assert_eq!(seen, vec![S, S, R, R, R, S, S, S, R, R, R, S]);
        assert_eq!(WeatherState::of(&tags), Some(S));
    }

    #[test]
    fn passive_tick_is_a_no_op() {
        let mut tags = CapabilitySet::new();
        let mut ctl = WeatherController::passive(vec![MapId(0)]);
        assert_eq!(ctl.tick(&mut tags), None);
        assert!(tags.is_empty());
        assert_eq!(ctl.current(), WeatherState::Sunny);
    }
}
