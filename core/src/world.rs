//! The world: maps, actors, weather, and the round that drives them.
//!
//! ROUND ORDER (fixed):
//!   1. Grounds phase: every map in registration order, every cell
//!      row-major. Lethal terrain claims its occupant, then any spawner
//!      rolls.
//!   2. Turns phase: every map in registration order, every actor in
//!      roster order as of the start of that map's turns. Actors spawned
//!      this round act this round. Actors removed mid-round are skipped.
//!      No actor takes more than one turn per round.
//!
//! Inside a turn:
//!   1. An active weather controller ticks and broadcasts.
//!   2. The actor applies its weather response.
//!   3. A hostile-to-enemy actor attaches Follow to adjacent pursuers.
//!   4. A pending follow-up action runs first; otherwise the player
//!      controller or the behaviour registry chooses.
//!
//! RULE: The world never prints. Everything observable is a SimEvent.

use crate::{
    action::Action,
    actor::{Actor, ActorTable},
    behaviour::TurnContext,
    bestiary::Bestiary,
    capability::Capability,
    config::SimConfig,
    error::{SimError, SimResult},
    event::SimEvent,
    ground::Ground,
    map::{GameMap, Item},
    player::{AutoPilot, PlayerController},
    rng::RandomSource,
    spawn::{find_spawn_site, SpawnGround, SpawnRoll},
    types::{ActorId, MapId, Point, Tick},
    weather::{retag, WeatherController, WeatherState, WorldState},
};
use std::collections::HashSet;

/// Share of max stamina the player regains each turn.
pub const PLAYER_STAMINA_REGEN: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlayerSlot {
    id: ActorId,
    home: MapId,
    start: Point,
}

pub struct World {
    maps: Vec<GameMap>,
    actors: ActorTable,
    state: WorldState,
    weather: WeatherController,
    bestiary: Bestiary,
    player: Option<PlayerSlot>,
    controller: Box<dyn PlayerController>,
    next_actor: u64,
    tick: Tick,
    events: Vec<SimEvent>,
}

impl World {
    pub fn new(bestiary: Bestiary) -> Self {
        Self {
            maps: Vec::new(),
            actors: ActorTable::new(),
            state: WorldState::default(),
            weather: WeatherController::passive(Vec::new()),
            bestiary,
            player: None,
            controller: Box::new(AutoPilot),
            next_actor: 1,
            tick: 0,
            events: Vec::new(),
        }
    }

    /// Build maps, spawners, creatures and the player from config, then
    /// broadcast the initial weather.
    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        let mut world = World::new(Bestiary::new(config.creatures.iter().cloned()));
        let setup = &config.world;

        for map in &setup.maps {
            world.add_map(GameMap::from_rows(&map.name, &map.rows)?);
        }

        let weather_maps = setup
            .weather_maps
            .iter()
            .map(|name| world.map_id(name))
            .collect::<SimResult<Vec<_>>>()?;
        world.set_weather_maps(weather_maps);

        for spawner in &setup.spawners {
            let map = world.map_id(&spawner.map)?;
            if !world.bestiary.contains(&spawner.creature) {
                return Err(SimError::UnknownCreature { id: spawner.creature.clone() });
            }
            let ground = Ground::spawning(
                spawner.terrain,
                SpawnGround::new(spawner.creature.clone(), spawner.percentage, spawner.boost),
            );
            world.maps[map.0].set_ground(Point::new(spawner.x, spawner.y), ground)?;
        }

        for placement in &setup.placements {
            let map = world.map_id(&placement.map)?;
            world.add_creature(map, Point::new(placement.x, placement.y), &placement.creature)?;
        }

        if let Some(player) = &setup.player {
            let map = world.map_id(&player.map)?;
            let actor = Actor::new(player.name.clone(), player.glyph, player.hit_points, player.weapon.clone())
                .with_capability(Capability::HostileToEnemy)
                .with_capability(Capability::EnterFloor)
                .with_stamina(player.stamina);
            world.add_player(map, Point::new(player.x, player.y), actor)?;
        }

        world.set_weather(setup.initial_weather);
        log::info!(
            "World built: {} maps, {} actors, weather {:?}",
            world.maps.len(),
            world.actors.len(),
            world.state.weather
        );
        Ok(world)
    }

    // ── Construction ───────────────────────────────

    pub fn add_map(&mut self, map: GameMap) -> MapId {
        self.maps.push(map);
        MapId(self.maps.len() - 1)
    }

    /// Maps covered by world weather broadcasts and by any active
    /// controller created afterwards.
    pub fn set_weather_maps(&mut self, maps: Vec<MapId>) {
        self.weather = WeatherController::passive(maps);
    }

    pub fn add_actor(&mut self, map: MapId, at: Point, actor: Actor) -> SimResult<ActorId> {
        let id = ActorId(self.next_actor);
        self.map_by_id_mut(map)?.place(id, at)?;
        self.next_actor += 1;
        self.actors.insert(id, actor);
        Ok(id)
    }

    /// Place a bestiary creature. A creature with a weather period gets
    /// an active controller over the world's weather maps.
    pub fn add_creature(&mut self, map: MapId, at: Point, creature: &str) -> SimResult<ActorId> {
        let actor = self.bestiary.create(creature)?;
        let id = self.add_actor(map, at, actor)?;
        self.attach_weather_control(id, creature);
        Ok(id)
    }

    pub fn add_player(&mut self, map: MapId, at: Point, actor: Actor) -> SimResult<ActorId> {
        let id = self.add_actor(map, at, actor)?;
        self.player = Some(PlayerSlot { id, home: map, start: at });
        Ok(id)
    }

    pub fn set_player_controller(&mut self, controller: Box<dyn PlayerController>) {
        log::debug!("player controller set to {}", controller.name());
        self.controller = controller;
    }

    fn attach_weather_control(&mut self, id: ActorId, creature: &str) {
        let Some(period) = self.bestiary.get(creature).and_then(|c| c.weather_period) else {
            return;
        };
        let maps = self.weather.maps().to_vec();
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.weather_control = Some(WeatherController::active(id, &mut actor.capabilities, period, maps));
        }
    }

    // ── Queries ────────────────────────────────────

    pub fn map_id(&self, name: &str) -> SimResult<MapId> {
        self.maps
            .iter()
            .position(|m| m.name == name)
            .map(MapId)
            .ok_or_else(|| SimError::UnknownMap { name: name.to_string() })
    }

    fn map_by_id_mut(&mut self, id: MapId) -> SimResult<&mut GameMap> {
        self.maps
            .get_mut(id.0)
            .ok_or_else(|| SimError::UnknownMap { name: format!("#{}", id.0) })
    }

    pub fn map(&self, id: MapId) -> Option<&GameMap> {
        self.maps.get(id.0)
    }

    pub fn map_mut(&mut self, id: MapId) -> Option<&mut GameMap> {
        self.maps.get_mut(id.0)
    }

    pub fn maps(&self) -> &[GameMap] {
        &self.maps
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn actors(&self) -> &ActorTable {
        &self.actors
    }

    pub fn player(&self) -> Option<ActorId> {
        self.player.map(|p| p.id)
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn weather(&self) -> WeatherState {
        self.state.weather
    }

    pub fn bestiary(&self) -> &Bestiary {
        &self.bestiary
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Which map an actor is on and where.
    pub fn locate(&self, id: ActorId) -> Option<(MapId, Point)> {
        self.maps
            .iter()
            .enumerate()
            .find_map(|(i, m)| m.locate(id).map(|p| (MapId(i), p)))
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    // ── Weather ────────────────────────────────────

    /// Broadcast `weather` through the world's own controller.
    pub fn set_weather(&mut self, weather: WeatherState) {
        self.weather.broadcast(weather, &mut self.maps, &mut self.actors, &mut self.state);
        log::info!("tick={} weather set to {weather:?}", self.tick);
        self.emit(SimEvent::WeatherChanged {
            tick: self.tick,
            weather,
            source: "world".into(),
        });
    }

    /// Broadcast through an actor's controller. Emits only on change.
    fn broadcast_with(&mut self, controller: &mut WeatherController, weather: WeatherState, source: &str) {
        let before = self.state.weather;
        controller.broadcast(weather, &mut self.maps, &mut self.actors, &mut self.state);
        if before != weather {
            log::info!("tick={} weather {before:?} -> {weather:?} ({source})", self.tick);
            self.emit(SimEvent::WeatherChanged {
                tick: self.tick,
                weather,
                source: source.to_string(),
            });
        }
    }

    // ── Round ──────────────────────────────────────

    pub fn begin_round(&mut self, tick: Tick) {
        self.tick = tick;
    }

    /// One full round. Returns the events it produced.
    pub fn run_round(
        &mut self,
        tick: Tick,
        grounds_rng: &mut dyn RandomSource,
        turns_rng: &mut dyn RandomSource,
    ) -> Vec<SimEvent> {
        self.begin_round(tick);
        self.tick_grounds(grounds_rng);
        self.play_turns(turns_rng);
        self.drain_events()
    }

    pub fn tick_grounds(&mut self, rng: &mut dyn RandomSource) {
        for m in 0..self.maps.len() {
            let points: Vec<Point> = self.maps[m].points().collect();
            for at in points {
                self.tick_ground(MapId(m), at, rng);
            }
        }
    }

    pub fn play_turns(&mut self, rng: &mut dyn RandomSource) {
        let mut played: HashSet<ActorId> = HashSet::new();
        for m in 0..self.maps.len() {
            let roster = self.maps[m].roster().to_vec();
            for id in roster {
                if !self.maps[m].contains(id) || !played.insert(id) {
                    continue;
                }
                self.play_turn(MapId(m), id, rng);
            }
        }
    }

    fn tick_ground(&mut self, map: MapId, at: Point, rng: &mut dyn RandomSource) {
        let game_map = &self.maps[map.0];
        let lethal = game_map.ground(at).is_some_and(|g| g.capabilities.has(Capability::Lethal));
        if lethal {
            if let Some(victim) = game_map.actor_at(at) {
                self.claim(victim, map, rng);
            }
        }

        let Some(ground) = self.maps[map.0].ground_mut(at) else { return };
        let tags = ground.capabilities;
        let Some(spawner) = ground.spawner.as_mut() else { return };
        let roll = spawner.roll(&tags, rng);
        let creature = spawner.creature.clone();
        log::trace!(
            "tick={} {creature} spawn roll at {at}: {} vs {:.1}%",
            self.tick,
            roll.roll,
            roll.effective_percentage
        );
        if roll.success {
            self.spawn(map, at, &creature, roll);
        }
    }

    /// Lethal ground knocks out anything not immune to it.
    fn claim(&mut self, victim: ActorId, map: MapId, rng: &mut dyn RandomSource) {
        let Some(actor) = self.actors.get_mut(&victim) else { return };
        if actor.has(Capability::VoidImmune) {
            return;
        }
        actor.knock_out();
        let text = self.resolve_unconscious(victim, None, map, rng);
        log::debug!("tick={} {text}", self.tick);
    }

    fn spawn(&mut self, map: MapId, origin: Point, creature: &str, roll: SpawnRoll) {
        let mut actor = match self.bestiary.create(creature) {
            Ok(actor) => actor,
            Err(e) => {
                log::warn!("spawn at {origin} skipped: {e}");
                return;
            }
        };
        actor.capabilities.add(Capability::Spawned);
        if actor.has(Capability::HostileToWeather) {
            retag(&mut actor.capabilities, self.state.weather);
        }

        let map_name = self.maps[map.0].name.clone();
        let Some(site) = find_spawn_site(&self.maps[map.0], origin, &actor.capabilities) else {
            log::warn!("{} unable to be spawned around {origin} on {map_name}", actor.name);
            self.emit(SimEvent::SpawnBlocked {
                tick: self.tick,
                creature: creature.to_string(),
                map: map_name,
                x: origin.x,
                y: origin.y,
            });
            return;
        };

        match self.add_actor(map, site, actor) {
            Ok(id) => {
                self.attach_weather_control(id, creature);
                log::debug!("tick={} spawned {creature} {id} at {site} on {map_name}", self.tick);
                self.emit(SimEvent::ActorSpawned {
                    tick: self.tick,
                    actor: id,
                    creature: creature.to_string(),
                    map: map_name,
                    x: site.x,
                    y: site.y,
                    roll: roll.roll,
                    effective_percentage: roll.effective_percentage,
                });
            }
            Err(e) => log::warn!("spawn of {creature} at {site} failed: {e}"),
        }
    }

    fn play_turn(&mut self, map: MapId, id: ActorId, rng: &mut dyn RandomSource) {
        if !self.actors.get(&id).is_some_and(Actor::is_conscious) {
            return;
        }

        self.drive_weather(id);
        if let Some(note) = self.actors.get_mut(&id).and_then(Actor::respond_to_weather) {
            log::debug!("tick={} {note}", self.tick);
        }
        if self.actors[&id].has(Capability::HostileToEnemy) {
            self.threaten_neighbours(map, id);
        }

        let is_player = self.player.is_some_and(|p| p.id == id);
        if is_player {
            if let Some(stamina) = self.actors.get_mut(&id).and_then(|a| a.stamina.as_mut()) {
                let regen = stamina.portion(PLAYER_STAMINA_REGEN);
                stamina.increase(regen);
            }
        }

        let pending = self.actors.get_mut(&id).and_then(|a| a.pending.take());
        let action = match pending {
            Some(action) => action,
            None => {
                let ctx = TurnContext::new(id, &self.maps[map.0], &self.actors, &self.state);
                if is_player {
                    self.controller.choose(&ctx, rng)
                } else {
                    self.actors[&id].behaviours.evaluate(&ctx, rng)
                }
            }
        };

        self.perform(map, id, action, rng);
    }

    fn perform(&mut self, map: MapId, id: ActorId, action: Action, rng: &mut dyn RandomSource) {
        let kind = action.kind();
        let target = action.target();
        let menu = action.menu_description(id, &self.actors);

        let outcome = action.execute(id, map, self, rng);
        if let Some(next) = outcome.next {
            if let Some(actor) = self.actors.get_mut(&id) {
                actor.pending = Some(next);
            }
        }

        log::debug!("tick={} {menu}: {}", self.tick, outcome.description);
        self.emit(SimEvent::ActionTaken {
            tick: self.tick,
            actor: id,
            kind,
            target,
            description: outcome.description,
        });
    }

    fn drive_weather(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(&id) else { return };
        let Some(mut controller) = actor.weather_control.take() else { return };
        if let Some(weather) = controller.tick(&mut actor.capabilities) {
            self.broadcast_with(&mut controller, weather, "controller");
        }
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.weather_control = Some(controller);
        }
    }

    /// Adjacent pursuers start following `threat`.
    fn threaten_neighbours(&mut self, map: MapId, threat: ActorId) {
        let game_map = &self.maps[map.0];
        let Some(at) = game_map.locate(threat) else { return };
        let neighbours: Vec<ActorId> = game_map
            .exits(at)
            .into_iter()
            .filter_map(|exit| game_map.actor_at(exit.destination))
            .collect();

        for other in neighbours {
            let Some(actor) = self.actors.get_mut(&other) else { continue };
            if actor.has(Capability::Pursuer) && actor.behaviours.follow(threat) {
                log::debug!("tick={} {} now follows {threat}", self.tick, actor.name);
                self.emit(SimEvent::FollowAttached { tick: self.tick, actor: other, target: threat });
            }
        }
    }

    // ── Unconsciousness ────────────────────────────

    /// Handle an actor that has dropped to zero hit points. Returns the
    /// line describing what happened.
    pub fn resolve_unconscious(
        &mut self,
        target: ActorId,
        by: Option<ActorId>,
        map: MapId,
        rng: &mut dyn RandomSource,
    ) -> String {
        if self.player.is_some_and(|p| p.id == target) {
            return self.revive_player();
        }

        let Some(victim) = self.actors.remove(&target) else {
            return String::new();
        };
        let Some(game_map) = self.maps.get_mut(map.0) else {
            return format!("{} met their demise", victim.name);
        };
        let map_name = game_map.name.clone();
        let fell_at = game_map.remove(target);

        if let Some(at) = fell_at {
            for rule in &victim.drops {
                if !rng.chance(rule.probability) {
                    continue;
                }
                game_map.add_item(at, Item { name: rule.item.clone(), perishable: rule.perishable });
                self.events.push(SimEvent::ItemDropped {
                    tick: self.tick,
                    item: rule.item.clone(),
                    map: map_name.clone(),
                    x: at.x,
                    y: at.y,
                });
            }
        }

        let killer = by.and_then(|k| self.actors.get(&k)).map(|k| k.name.clone());
        let mut text = match &killer {
            Some(name) => format!("{} met their demise at the hands of {name}", victim.name),
            None => format!("{} met their demise", victim.name),
        };

        if let Some(mut controller) = victim.weather_control {
            self.broadcast_with(&mut controller, WeatherState::Normal, "controller_defeated");
            if let Some(killer) = by.and_then(|k| self.actors.get_mut(&k)) {
                killer.capabilities.add(Capability::BossDefeated);
            }
            text.push_str("\nThe weather returns to normal.");
        }

        log::info!("tick={} {target} ({}) defeated on {map_name}", self.tick, victim.name);
        self.emit(SimEvent::ActorDefeated {
            tick: self.tick,
            actor: target,
            name: victim.name,
            by,
            map: map_name,
        });
        text
    }

    /// The player wakes at the start tile with full health and stamina,
    /// and the world resets around them.
    fn revive_player(&mut self) -> String {
        let Some(slot) = self.player else { return String::new() };
        let name = match self.actors.get_mut(&slot.id) {
            Some(player) => {
                player.restore();
                player.pending = None;
                player.name.clone()
            }
            None => return String::new(),
        };

        self.reset();

        if self.locate(slot.id) != Some((slot.home, slot.start)) {
            let start_free = self.maps[slot.home.0].actor_at(slot.start).is_none();
            if start_free {
                for game_map in &mut self.maps {
                    game_map.remove(slot.id);
                }
                if let Err(e) = self.maps[slot.home.0].place(slot.id, slot.start) {
                    log::warn!("could not return player to start: {e}");
                }
            } else {
                log::warn!("player start {} is occupied; reviving in place", slot.start);
            }
        }

        log::info!("tick={} {name} revived at {}", self.tick, slot.start);
        self.emit(SimEvent::PlayerRevived { tick: self.tick, actor: slot.id });
        format!("{name} has fallen and wakes again at the start")
    }

    /// Purge spawned actors, restore bosses and clear perishable items
    /// on every map.
    pub fn reset(&mut self) {
        let spawned: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|(_, a)| a.has(Capability::Spawned))
            .map(|(id, _)| *id)
            .collect();
        for id in &spawned {
            for game_map in &mut self.maps {
                game_map.remove(*id);
            }
            self.actors.remove(id);
        }

        for actor in self.actors.values_mut() {
            if actor.has(Capability::BossEnemy) {
                actor.restore();
            }
        }

        let cleared_items: usize = self.maps.iter_mut().map(GameMap::clear_perishables).sum();
        log::info!("tick={} world reset: {} spawned purged, {cleared_items} items cleared", self.tick, spawned.len());
        self.emit(SimEvent::WorldReset {
            tick: self.tick,
            purged_actors: spawned.len(),
            cleared_items,
        });
    }
}
