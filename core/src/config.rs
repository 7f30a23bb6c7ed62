//! World configuration loaded from `data/`.
//!
//! `data/creatures.json` holds the bestiary, `data/world.json` the maps,
//! placements, spawners and the player. Tests use `SimConfig::default_test()`
//! and never touch the filesystem.

use crate::{
    actor::{DropRule, Weapon, WeatherResponse},
    bestiary,
    capability::Capability,
    ground::Terrain,
    spawn::WeatherBoost,
    weather::WeatherState,
};
use serde::{Deserialize, Serialize};

/// Default behaviours a creature is registered with, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultBehaviour {
    Attack,
    Wander,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureConfig {
    pub id: String,
    pub name: String,
    pub glyph: char,
    pub hit_points: i32,
    pub weapon: Weapon,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub behaviours: Vec<DefaultBehaviour>,
    #[serde(default)]
    pub weather_response: WeatherResponse,
    /// Turns a creature of this kind drives an active weather cycle.
    #[serde(default)]
    pub weather_period: Option<u32>,
    #[serde(default)]
    pub drops: Vec<DropRule>,
    #[serde(default)]
    pub stamina: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
struct CreaturesFile {
    creatures: Vec<CreatureConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub name: String,
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub creature: String,
    pub map: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    pub map: String,
    pub x: i32,
    pub y: i32,
    pub terrain: Terrain,
    pub creature: String,
    pub percentage: f64,
    #[serde(default)]
    pub boost: Option<WeatherBoost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub glyph: char,
    pub hit_points: i32,
    pub stamina: i32,
    pub weapon: Weapon,
    pub map: String,
    pub x: i32,
    pub y: i32,
}

fn default_weather() -> WeatherState {
    WeatherState::Sunny
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub maps: Vec<MapConfig>,
    /// Maps every weather broadcast covers.
    #[serde(default)]
    pub weather_maps: Vec<String>,
    #[serde(default = "default_weather")]
    pub initial_weather: WeatherState,
    #[serde(default)]
    pub spawners: Vec<SpawnerConfig>,
    #[serde(default)]
    pub placements: Vec<PlacementConfig>,
    #[serde(default)]
    pub player: Option<PlayerConfig>,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub creatures: Vec<CreatureConfig>,
    pub world: WorldConfig,
}

impl SimConfig {
    /// Load all config from the data directory.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let creatures_path = format!("{data_dir}/creatures.json");
        let creatures_content = std::fs::read_to_string(&creatures_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {creatures_path}: {e}"))?;
        let creatures_file: CreaturesFile = serde_json::from_str(&creatures_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {creatures_path}: {e}"))?;

        let world_path = format!("{data_dir}/world.json");
        let world_content = std::fs::read_to_string(&world_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {world_path}: {e}"))?;
        let world: WorldConfig = serde_json::from_str(&world_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {world_path}: {e}"))?;

        log::info!(
            "Loaded {} creatures and {} maps from {data_dir}",
            creatures_file.creatures.len(),
            world.maps.len()
        );

        Ok(Self { creatures: creatures_file.creatures, world })
    }

    /// Minimal in-memory config for tests: two small maps, one spawner
    /// per spawning terrain, the Forest Watcher and a player.
    pub fn default_test() -> Self {
        let woods = MapConfig {
            name: "Ancient Woods".into(),
            rows: vec![
                "############".into(),
                "#....m....h#".into(),
                "#..........#".into(),
                "#....~.....#".into(),
                "#..........#".into(),
                "#...+......#".into(),
                "############".into(),
            ],
        };
        let burial = MapConfig {
            name: "Burial Ground".into(),
            rows: vec![
                "##########".into(),
                "#...n....#".into(),
                "#........#".into(),
                "#....+...#".into(),
                "##########".into(),
            ],
        };

        let spawners = vec![
            SpawnerConfig {
                map: "Ancient Woods".into(),
                x: 5,
                y: 1,
                terrain: Terrain::Bush,
                creature: "red_wolf".into(),
                percentage: 30.0,
                boost: Some(WeatherBoost { weather: WeatherState::Rainy, multiplier: 1.5 }),
            },
            SpawnerConfig {
                map: "Ancient Woods".into(),
                x: 10,
                y: 1,
                terrain: Terrain::Hut,
                creature: "forest_keeper".into(),
                percentage: 15.0,
                boost: Some(WeatherBoost { weather: WeatherState::Sunny, multiplier: 2.0 }),
            },
            SpawnerConfig {
                map: "Burial Ground".into(),
                x: 4,
                y: 1,
                terrain: Terrain::Graveyard,
                creature: "wandering_undead".into(),
                percentage: 25.0,
                boost: None,
            },
        ];

        let placements = vec![
            PlacementConfig { creature: "forest_watcher".into(), map: "Ancient Woods".into(), x: 9, y: 4 },
            PlacementConfig { creature: "isolated_traveller".into(), map: "Ancient Woods".into(), x: 1, y: 1 },
        ];

        let player = PlayerConfig {
            name: "The Abstracted One".into(),
            glyph: '@',
            hit_points: 150,
            stamina: 200,
            weapon: Weapon::new(15, "punches", 80),
            map: "Ancient Woods".into(),
            x: 2,
            y: 3,
        };

        Self {
            creatures: bestiary::builtin_creatures(),
            world: WorldConfig {
                maps: vec![woods, burial],
                weather_maps: vec!["Ancient Woods".into()],
                initial_weather: WeatherState::Sunny,
                spawners,
                placements,
                player: Some(player),
            },
        }
    }
}
