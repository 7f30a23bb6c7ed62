//! Actors: anything that takes a turn.

use crate::{
    action::Action,
    behaviour::{Behaviour, BehaviourRegistry},
    capability::{Capability, CapabilitySet},
    types::ActorId,
    weather::WeatherController,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// All live actors, keyed by id. Ordered so that anything iterating
/// the table (snapshots, resets) is deterministic.
pub type ActorTable = BTreeMap<ActorId, Actor>;

pub const DEFAULT_DAMAGE_MULTIPLIER: f64 = 1.0;

/// An actor's built-in attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub damage: u32,
    pub verb: String,
    /// Percent chance to hit, 0..=100.
    pub hit_chance: u32,
}

impl Weapon {
    pub fn new(damage: u32, verb: impl Into<String>, hit_chance: u32) -> Self {
        Self { damage, verb: verb.into(), hit_chance }
    }
}

/// How an actor reacts to the weather tag it carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    /// Damage multiplier while SUNNY; ×1 under any other weather.
    #[serde(default)]
    pub sunny_damage_multiplier: Option<f64>,
    /// Hit points regained each turn while RAINY.
    #[serde(default)]
    pub rainy_heal: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRule {
    pub item: String,
    pub probability: f64,
    #[serde(default)]
    pub perishable: bool,
}

/// A bounded attribute such as health or stamina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meter {
    current: i32,
    max: i32,
}

impl Meter {
    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn increase(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn decrease(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }

    pub fn set(&mut self, value: i32) {
        self.current = value.clamp(0, self.max);
    }

    pub fn fill(&mut self) {
        self.current = self.max;
    }

    /// `fraction` of the maximum, truncated.
    pub fn portion(&self, fraction: f64) -> i32 {
        (fraction * f64::from(self.max)) as i32
    }
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub glyph: char,
    /// Bestiary id this actor was built from, if any.
    pub creature: Option<String>,
    pub capabilities: CapabilitySet,
    pub behaviours: BehaviourRegistry,
    pub weather_response: WeatherResponse,
    pub drops: Vec<DropRule>,
    pub stamina: Option<Meter>,
    pub weather_control: Option<WeatherController>,
    /// Second half of a multi-step action; played before anything else.
    pub pending: Option<Action>,
    hit_points: Meter,
    weapon: Weapon,
    damage_multiplier: f64,
}

impl Actor {
    pub fn new(name: impl Into<String>, glyph: char, hit_points: i32, weapon: Weapon) -> Self {
        Self {
            name: name.into(),
            glyph,
            creature: None,
            capabilities: CapabilitySet::new(),
            behaviours: BehaviourRegistry::new(),
            weather_response: WeatherResponse::default(),
            drops: Vec::new(),
            stamina: None,
            weather_control: None,
            pending: None,
            hit_points: Meter::full(hit_points),
            weapon,
            damage_multiplier: DEFAULT_DAMAGE_MULTIPLIER,
        }
    }

    pub fn with_capability(mut self, tag: Capability) -> Self {
        self.capabilities.add(tag);
        self
    }

    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviours.register(behaviour.priority(), behaviour);
        self
    }

    pub fn with_stamina(mut self, max: i32) -> Self {
        self.stamina = Some(Meter::full(max));
        self
    }

    pub fn with_weather_response(mut self, response: WeatherResponse) -> Self {
        self.weather_response = response;
        self
    }

    pub fn with_drop(mut self, rule: DropRule) -> Self {
        self.drops.push(rule);
        self
    }

    pub fn has(&self, tag: Capability) -> bool {
        self.capabilities.has(tag)
    }

    pub fn hit_points(&self) -> i32 {
        self.hit_points.current()
    }

    pub fn max_hit_points(&self) -> i32 {
        self.hit_points.max()
    }

    pub fn is_conscious(&self) -> bool {
        self.hit_points.current() > 0
    }

    pub fn hurt(&mut self, damage: i32) {
        self.hit_points.decrease(damage);
    }

    pub fn heal(&mut self, amount: i32) {
        self.hit_points.increase(amount);
    }

    /// Drop straight to zero hit points.
    pub fn knock_out(&mut self) {
        self.hit_points.set(0);
    }

    /// Back to full health and stamina.
    pub fn restore(&mut self) {
        self.hit_points.fill();
        if let Some(stamina) = &mut self.stamina {
            stamina.fill();
        }
    }

    /// The intrinsic weapon with the current damage multiplier applied.
    pub fn weapon(&self) -> Weapon {
        let damage = (f64::from(self.weapon.damage) * self.damage_multiplier).round() as u32;
        Weapon { damage, ..self.weapon.clone() }
    }

    pub fn damage_multiplier(&self) -> f64 {
        self.damage_multiplier
    }

    /// Apply this turn's weather response. Returns a line for the
    /// turn log when something changed.
    pub fn respond_to_weather(&mut self) -> Option<String> {
        let response = self.weather_response;
        let mut note = None;

        if let Some(multiplier) = response.sunny_damage_multiplier {
            let next = if self.has(Capability::Sunny) { multiplier } else { DEFAULT_DAMAGE_MULTIPLIER };
            if next != self.damage_multiplier {
                self.damage_multiplier = next;
                note = Some(format!("{} now deals {} damage", self.name, self.weapon().damage));
            }
        }

        if let Some(amount) = response.rainy_heal {
            if self.has(Capability::Rainy) && self.hit_points() < self.max_hit_points() {
                self.heal(amount);
                note = Some(format!("{} regains {amount} hit points in the rain", self.name));
            }
        }

        note
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.hit_points(), self.max_hit_points())
    }
}
