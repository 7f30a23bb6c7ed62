//! Spawn grounds: tiles that periodically introduce new actors.
//!
//! Per tick, in this order:
//!   1. NORMAL weather resets the multiplier to 1.0.
//!   2. SUNNY/RAINY recomputes it from the ground's rule.
//!   3. effective% = base% × multiplier.
//!   4. One draw in [0, 100); a draw <= effective% spawns.
//!   5. Placement takes the first exit that is unoccupied and whose
//!      ground accepts the newcomer. No site means the spawn is dropped.

use crate::{
    capability::CapabilitySet,
    map::GameMap,
    rng::RandomSource,
    types::Point,
    weather::WeatherState,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SPAWN_MULTIPLIER: f64 = 1.0;
pub const SPAWN_ROLL_BOUND: u32 = 100;

/// How weather scales a ground's spawn chance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherBoost {
    pub weather: WeatherState,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnGround {
    /// Bestiary id of the creature this ground produces.
    pub creature: String,
    pub base_percentage: f64,
    pub boost: Option<WeatherBoost>,
    multiplier: f64,
}

/// Result of one spawn roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRoll {
    pub roll: u32,
    pub effective_percentage: f64,
    pub success: bool,
}

impl SpawnGround {
    pub fn new(creature: impl Into<String>, base_percentage: f64, boost: Option<WeatherBoost>) -> Self {
        Self {
            creature: creature.into(),
            base_percentage,
            boost,
            multiplier: DEFAULT_SPAWN_MULTIPLIER,
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Steps 1 and 2: follow the weather tag currently on the ground.
    /// With no weather tag at all, the last multiplier stands.
    pub fn refresh_multiplier(&mut self, ground_tags: &CapabilitySet) {
        match WeatherState::of(ground_tags) {
            Some(WeatherState::Normal) => self.multiplier = DEFAULT_SPAWN_MULTIPLIER,
            Some(current) => {
                self.multiplier = match self.boost {
                    Some(boost) if boost.weather == current => boost.multiplier,
                    _ => DEFAULT_SPAWN_MULTIPLIER,
                };
            }
            None => {}
        }
    }

    pub fn effective_percentage(&self) -> f64 {
        self.base_percentage * self.multiplier
    }

    /// Steps 1 to 4.
    pub fn roll(&mut self, ground_tags: &CapabilitySet, rng: &mut dyn RandomSource) -> SpawnRoll {
        self.refresh_multiplier(ground_tags);
        let effective_percentage = self.effective_percentage();
        let roll = rng.next_below(SPAWN_ROLL_BOUND);
        SpawnRoll {
            roll,
            effective_percentage,
            success: f64::from(roll) <= effective_percentage,
        }
    }
}

/// Step 5: the first neighbour of `origin` that can take a newcomer
/// carrying `newcomer` tags.
pub fn find_spawn_site(map: &GameMap, origin: Point, newcomer: &CapabilitySet) -> Option<Point> {
    map.exits(origin).into_iter().map(|exit| exit.destination).find(|&p| {
        map.actor_at(p).is_none()
            && map.ground(p).is_some_and(|ground| ground.accepts_spawn(newcomer))
    })
}
