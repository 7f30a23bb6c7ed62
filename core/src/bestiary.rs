//! Creature catalogue: turns a creature id into a ready-to-place actor.

use crate::{
    actor::{Actor, DropRule, Weapon, WeatherResponse},
    behaviour::Behaviour,
    capability::Capability,
    config::{CreatureConfig, DefaultBehaviour},
    error::{SimError, SimResult},
};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Bestiary {
    creatures: HashMap<String, CreatureConfig>,
}

impl Bestiary {
    pub fn new(creatures: impl IntoIterator<Item = CreatureConfig>) -> Self {
        Self {
            creatures: creatures.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&CreatureConfig> {
        self.creatures.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.creatures.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    /// Build a fresh actor for `id`. Weather control is attached by the
    /// world once the actor has an id.
    pub fn create(&self, id: &str) -> SimResult<Actor> {
        let config = self
            .creatures
            .get(id)
            .ok_or_else(|| SimError::UnknownCreature { id: id.to_string() })?;
        if config.weather_period == Some(0) {
            return Err(SimError::InvalidWeatherPeriod);
        }

        let mut actor = Actor::new(config.name.clone(), config.glyph, config.hit_points, config.weapon.clone())
            .with_weather_response(config.weather_response);
        actor.creature = Some(config.id.clone());
        for &tag in &config.capabilities {
            actor.capabilities.add(tag);
        }
        for behaviour in &config.behaviours {
            actor = actor.with_behaviour(match behaviour {
                DefaultBehaviour::Attack => Behaviour::Attack,
                DefaultBehaviour::Wander => Behaviour::Wander,
            });
        }
        for rule in &config.drops {
            actor = actor.with_drop(rule.clone());
        }
        if let Some(max) = config.stamina {
            actor = actor.with_stamina(max);
        }
        Ok(actor)
    }
}

fn drop_rule(item: &str, probability: f64, perishable: bool) -> DropRule {
    DropRule { item: item.into(), probability, perishable }
}

/// Runes are always dropped and vanish on a world reset.
fn runes(amount: u32) -> DropRule {
    drop_rule(&format!("{amount} Runes"), 1.0, true)
}

fn creature(
    id: &str,
    name: &str,
    glyph: char,
    hit_points: i32,
    weapon: Weapon,
    capabilities: &[Capability],
    behaviours: &[DefaultBehaviour],
) -> CreatureConfig {
    CreatureConfig {
        id: id.into(),
        name: name.into(),
        glyph,
        hit_points,
        weapon,
        capabilities: capabilities.to_vec(),
        behaviours: behaviours.to_vec(),
        weather_response: WeatherResponse::default(),
        weather_period: None,
        drops: Vec::new(),
        stamina: None,
    }
}

/// The stock creatures of the ashgrove world. `data/creatures.json`
/// mirrors this list.
pub fn builtin_creatures() -> Vec<CreatureConfig> {
    use Capability::*;
    use DefaultBehaviour::{Attack as A, Wander as W};

    vec![
        CreatureConfig {
            drops: vec![drop_rule("Old Key", 0.25, false), drop_rule("Healing Vial", 0.2, false), runes(50)],
            ..creature("wandering_undead", "Wandering Undead", 't', 100, Weapon::new(30, "hits", 50), &[Enemy], &[A, W])
        },
        CreatureConfig {
            drops: vec![drop_rule("Refreshing Flask", 0.3, false), drop_rule("Healing Vial", 0.2, false), runes(100)],
            ..creature("hollow_soldier", "Hollow Soldier", '&', 200, Weapon::new(50, "whacks", 50), &[Enemy], &[A, W])
        },
        CreatureConfig {
            weather_response: WeatherResponse { sunny_damage_multiplier: Some(3.0), rainy_heal: None },
            drops: vec![drop_rule("Healing Vial", 0.1, false), runes(25)],
            ..creature(
                "red_wolf",
                "Red Wolf",
                'r',
                25,
                Weapon::new(15, "bites", 80),
                &[Enemy, Pursuer, HostileToWeather],
                &[A, W],
            )
        },
        CreatureConfig {
            weather_response: WeatherResponse { sunny_damage_multiplier: None, rainy_heal: Some(10) },
            drops: vec![drop_rule("Healing Vial", 0.2, false), runes(50)],
            ..creature(
                "forest_keeper",
                "Forest Keeper",
                '8',
                125,
                Weapon::new(25, "smashes", 75),
                &[Enemy, Pursuer, HostileToWeather],
                &[A, W],
            )
        },
        CreatureConfig {
            drops: vec![drop_rule("Bloodberry", 0.5, false), runes(500)],
            ..creature(
                "living_branch",
                "Living Branch",
                '?',
                75,
                Weapon::new(250, "lashes", 90),
                &[Enemy, VoidImmune],
                &[A],
            )
        },
        CreatureConfig {
            drops: vec![
                drop_rule("Healing Vial", 0.25, false),
                drop_rule("Refreshing Flask", 0.15, false),
                runes(250),
            ],
            ..creature(
                "eldentree_guardian",
                "Eldentree Guardian",
                'e',
                250,
                Weapon::new(50, "slams", 80),
                &[Enemy, VoidImmune, Pursuer],
                &[A, W],
            )
        },
        CreatureConfig {
            weather_period: Some(3),
            drops: vec![runes(5000)],
            ..creature(
                "forest_watcher",
                "Forest Watcher",
                'Y',
                2000,
                Weapon::new(80, "crushes", 25),
                &[Enemy, BossEnemy, VoidImmune],
                &[A, W],
            )
        },
        creature(
            "isolated_traveller",
            "Isolated Traveller",
            'ඞ',
            100,
            Weapon::new(0, "gestures at", 0),
            &[Merchant],
            &[],
        ),
    ]
}
