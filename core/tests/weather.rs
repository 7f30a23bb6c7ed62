//! Weather tests.
//!
//! Tests cover: the active cycle driven by a controller actor, single
//! weather tags after broadcasts, weather responses, the boss defeat
//! broadcast, and runner-style weather commands through the engine.

use ashgrove_core::{
    actor::{Actor, Weapon},
    bestiary::{builtin_creatures, Bestiary},
    capability::Capability,
    engine::SimEngine,
    event::SimEvent,
    ground::Terrain,
    map::GameMap,
    player::{AutoPilot, Idle},
    rng::FixedRng,
    types::{MapId, Point},
    weather::WeatherState,
    world::World,
};

fn weather_world() -> (World, MapId) {
    let mut world = World::new(Bestiary::new(builtin_creatures()));
    let map = world.add_map(GameMap::new("woods", 9, 9, Terrain::Dirt));
    world.set_weather_maps(vec![map]);
    world.set_player_controller(Box::new(Idle));
    (world, map)
}

fn weather_tags(tags: &ashgrove_core::capability::CapabilitySet) -> usize {
    WeatherState::ALL.iter().filter(|w| tags.has(w.tag())).count()
}

/// Period 3: SUNNY twice, then RAINY for three, then alternating
/// blocks of three.
#[test]
fn watcher_drives_the_period_three_cycle() {
    let (mut world, map) = weather_world();
    world.add_creature(map, Point::new(4, 4), "forest_watcher").unwrap();
    let bystander = world
        .add_actor(map, Point::new(0, 0), Actor::new("Bystander", 'b', 10, Weapon::new(1, "pokes", 0)))
        .unwrap();

    let mut seen = Vec::new();
    let mut changes = 0;
    for tick in 1..=12 {
        let events = world.run_round(tick, &mut FixedRng(99), &mut FixedRng(0));
        changes += events.iter().filter(|e| matches!(e, SimEvent::WeatherChanged { .. })).count();
        seen.push(world.weather());
    }

    use WeatherState::{Rainy as R, Sunny as S};
    assert_eq!(seen, vec![S, S, R, R, R, S, S, S, R, R, R, S]);
    assert_eq!(changes, 4);

    let bystander = world.actor(bystander).unwrap();
    assert!(bystander.has(Capability::Sunny));
    assert_eq!(weather_tags(&bystander.capabilities), 1);
}

/// NORMAL then SUNNY leaves exactly one weather tag on every actor and
/// every ground cell of the weather maps.
#[test]
fn broadcasts_leave_a_single_tag() {
    let (mut world, map) = weather_world();
    world.add_creature(map, Point::new(1, 1), "red_wolf").unwrap();
    world.add_creature(map, Point::new(2, 2), "forest_keeper").unwrap();

    world.set_weather(WeatherState::Normal);
    world.set_weather(WeatherState::Sunny);

    for actor in world.actors().values() {
        assert_eq!(weather_tags(&actor.capabilities), 1, "{} carries {:?}", actor.name, actor.capabilities);
        assert!(actor.has(Capability::Sunny));
    }
    let game_map = world.map(map).unwrap();
    for p in game_map.points() {
        let tags = &game_map.ground(p).unwrap().capabilities;
        assert_eq!(weather_tags(tags), 1, "ground at {p}");
        assert!(tags.has(Capability::Sunny));
    }
}

/// Maps outside the weather list keep whatever they had.
#[test]
fn broadcast_skips_maps_outside_the_weather_list() {
    let (mut world, _) = weather_world();
    let elsewhere = world.add_map(GameMap::new("village", 3, 3, Terrain::Dirt));
    world.set_weather(WeatherState::Rainy);

    let ground = world.map(elsewhere).unwrap().ground(Point::new(1, 1)).unwrap();
    assert_eq!(weather_tags(&ground.capabilities), 0);
    assert_eq!(world.weather(), WeatherState::Rainy);
}

/// The Red Wolf bites for triple damage under the sun.
#[test]
fn sunny_wolf_triples_damage() {
    let (mut world, map) = weather_world();
    let target = world
        .add_actor(
            map,
            Point::new(4, 4),
            Actor::new("Target", '@', 150, Weapon::new(1, "pokes", 0)).with_capability(Capability::HostileToEnemy),
        )
        .unwrap();
    world.add_creature(map, Point::new(4, 5), "red_wolf").unwrap();
    world.set_weather(WeatherState::Sunny);

    world.run_round(1, &mut FixedRng(99), &mut FixedRng(0));
    assert_eq!(world.actor(target).unwrap().hit_points(), 150 - 45);

    world.set_weather(WeatherState::Rainy);
    world.run_round(2, &mut FixedRng(99), &mut FixedRng(0));
    assert_eq!(world.actor(target).unwrap().hit_points(), 150 - 45 - 15);
}

/// The Forest Keeper heals 10 per turn in the rain.
#[test]
fn rainy_keeper_heals() {
    let (mut world, map) = weather_world();
    let keeper = world.add_creature(map, Point::new(0, 0), "forest_keeper").unwrap();
    world.actor_mut(keeper).unwrap().hurt(50);
    world.set_weather(WeatherState::Rainy);

    world.run_round(1, &mut FixedRng(99), &mut FixedRng(0));
    assert_eq!(world.actor(keeper).unwrap().hit_points(), 85);

    world.set_weather(WeatherState::Sunny);
    world.run_round(2, &mut FixedRng(99), &mut FixedRng(0));
    assert_eq!(world.actor(keeper).unwrap().hit_points(), 85);
}

/// Killing the watcher returns the weather to NORMAL and marks the
/// killer BossDefeated.
#[test]
fn defeating_the_watcher_restores_normal_weather() {
    let (mut world, map) = weather_world();
    world.set_player_controller(Box::new(AutoPilot));
    let player = world
        .add_player(
            map,
            Point::new(4, 3),
            Actor::new("Player", '@', 150, Weapon::new(15, "punches", 100))
                .with_capability(Capability::HostileToEnemy)
                .with_stamina(200),
        )
        .unwrap();
    let watcher = world.add_creature(map, Point::new(4, 4), "forest_watcher").unwrap();
    world.actor_mut(watcher).unwrap().hurt(1999);

    let events = world.run_round(1, &mut FixedRng(99), &mut FixedRng(0));

    assert!(world.actor(watcher).is_none());
    assert_eq!(world.weather(), WeatherState::Normal);
    assert!(world.actor(player).unwrap().has(Capability::BossDefeated));
    assert!(world.actor(player).unwrap().has(Capability::Normal));
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::WeatherChanged { weather: WeatherState::Normal, source, .. } if source == "controller_defeated"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::ActorDefeated { actor, by: Some(by), .. } if *actor == watcher && *by == player
    )));
    assert_eq!(world.map(map).unwrap().items_at(Point::new(4, 4))[0].name, "5000 Runes");
}

/// Runner weather commands are journaled under the command phase.
#[test]
fn engine_weather_command_is_journaled() {
    let mut engine = SimEngine::build_test("weather-cmd".into(), 1).unwrap();
    engine.run_ticks(2).unwrap();

    let events = engine.set_weather(WeatherState::Rainy).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(engine.world.weather(), WeatherState::Rainy);

    let entries = engine.events_for_tick(2);
    let last = entries.last().unwrap();
    assert_eq!(last.phase, "command");
    assert_eq!(last.event_type, "weather_changed");
}
