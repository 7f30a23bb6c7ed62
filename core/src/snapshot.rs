//! Snapshot serialization — a census of the world to JSON.
//!
//! The runner prints one on demand (`get_state`) and at the end of a
//! run. Snapshots are read-only views; nothing restores from them.

use crate::{
    capability::Capability,
    types::{ActorId, RunId, Tick},
    weather::WeatherState,
    world::World,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapCensus {
    pub name: String,
    pub actors: usize,
    pub spawned: usize,
    pub enemies: usize,
    pub items: usize,
    pub render: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub name: String,
    pub map: String,
    pub x: i32,
    pub y: i32,
    pub hit_points: i32,
    pub max_hit_points: i32,
    pub stamina: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub run_id: RunId,
    pub tick: Tick,
    pub weather: WeatherState,
    pub maps: Vec<MapCensus>,
    pub player: Option<PlayerStatus>,
}

impl WorldSnapshot {
    pub fn capture(run_id: RunId, tick: Tick, world: &World) -> Self {
        let actors = world.actors();
        let glyph_of = |id: ActorId| actors.get(&id).map_or('?', |a| a.glyph);

        let maps = world
            .maps()
            .iter()
            .map(|map| {
                let on_map = || map.roster().iter().filter_map(|id| actors.get(id));
                MapCensus {
                    name: map.name.clone(),
                    actors: map.roster().len(),
                    spawned: on_map().filter(|a| a.has(Capability::Spawned)).count(),
                    enemies: on_map().filter(|a| a.has(Capability::Enemy)).count(),
                    items: map.item_count(),
                    render: map.render(glyph_of),
                }
            })
            .collect();

        let player = world.player().and_then(|id| {
            let actor = world.actor(id)?;
            let (map, at) = world.locate(id)?;
            Some(PlayerStatus {
                name: actor.name.clone(),
                map: world.map(map)?.name.clone(),
                x: at.x,
                y: at.y,
                hit_points: actor.hit_points(),
                max_hit_points: actor.max_hit_points(),
                stamina: actor.stamina.map(|s| s.current()),
            })
        });

        Self { run_id, tick, weather: world.weather(), maps, player }
    }
}
