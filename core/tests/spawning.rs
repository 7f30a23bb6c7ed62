//! Spawn ground and lethal terrain tests.
//!
//! Tests cover: the roll threshold with a weather boost, placement
//! order, blocked spawns, weather tagging of newcomers, Void keeping
//! out non-immune spawns, and Void claiming its occupants.

use ashgrove_core::{
    actor::{Actor, Weapon},
    bestiary::{builtin_creatures, Bestiary},
    capability::Capability,
    event::SimEvent,
    ground::{Ground, Terrain},
    map::GameMap,
    player::Idle,
    rng::FixedRng,
    spawn::{SpawnGround, WeatherBoost},
    types::{MapId, Point},
    weather::WeatherState,
    world::World,
};

fn spawn_world(creature: &str, percentage: f64, boost: Option<WeatherBoost>, terrain: Terrain) -> (World, MapId) {
    let mut world = World::new(Bestiary::new(builtin_creatures()));
    let mut map = GameMap::new("woods", 5, 5, Terrain::Dirt);
    map.set_ground(Point::new(2, 2), Ground::spawning(terrain, SpawnGround::new(creature, percentage, boost)))
        .unwrap();
    let map = world.add_map(map);
    world.set_weather_maps(vec![map]);
    world.set_player_controller(Box::new(Idle));
    (world, map)
}

fn rainy_bush() -> (World, MapId) {
    let boost = WeatherBoost { weather: WeatherState::Rainy, multiplier: 1.5 };
    let (mut world, map) = spawn_world("red_wolf", 30.0, Some(boost), Terrain::Bush);
    world.set_weather(WeatherState::Rainy);
    world.drain_events();
    (world, map)
}

fn spawned(events: &[SimEvent]) -> Vec<(String, Point)> {
    events
        .iter()
        .filter_map(|e| match e {
            SimEvent::ActorSpawned { creature, x, y, .. } => Some((creature.clone(), Point::new(*x, *y))),
            _ => None,
        })
        .collect()
}

/// RAINY bush: 30% × 1.5 = 45%. A draw of 44 spawns, 46 does not.
#[test]
fn rainy_bush_threshold() {
    let (mut world, _) = rainy_bush();
    world.begin_round(1);
    world.tick_grounds(&mut FixedRng(44));
    let events = world.drain_events();
    assert_eq!(spawned(&events).len(), 1);
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::ActorSpawned { roll: 44, effective_percentage, .. } if (*effective_percentage - 45.0).abs() < 1e-9
    )));

    let (mut world, _) = rainy_bush();
    world.tick_grounds(&mut FixedRng(46));
    assert!(spawned(&world.drain_events()).is_empty());
}

/// The draw equal to the effective percentage still spawns.
#[test]
fn roll_on_the_boundary_spawns() {
    let (mut world, _) = rainy_bush();
    world.tick_grounds(&mut FixedRng(45));
    assert_eq!(spawned(&world.drain_events()).len(), 1);
}

/// Under SUNNY the same bush is back to its base 30%.
#[test]
fn off_weather_uses_the_base_percentage() {
    let (mut world, _) = rainy_bush();
    world.set_weather(WeatherState::Sunny);
    world.tick_grounds(&mut FixedRng(31));
    assert!(spawned(&world.drain_events()).is_empty());
    world.tick_grounds(&mut FixedRng(30));
    assert_eq!(spawned(&world.drain_events()).len(), 1);
}

/// Newcomers land on the first free exit clockwise from North and
/// carry Spawned plus the current weather.
#[test]
fn spawn_placement_and_tags() {
    let (mut world, map) = rainy_bush();
    world
        .add_actor(map, Point::new(2, 1), Actor::new("Blocker", 'b', 10, Weapon::new(1, "pokes", 0)))
        .unwrap();

    world.tick_grounds(&mut FixedRng(0));
    let events = world.drain_events();
    assert_eq!(spawned(&events), vec![("red_wolf".to_string(), Point::new(3, 1))]);

    let wolf = world.map(map).unwrap().actor_at(Point::new(3, 1)).unwrap();
    let wolf = world.actor(wolf).unwrap();
    assert!(wolf.has(Capability::Spawned));
    assert!(wolf.has(Capability::Rainy));
    assert!(!wolf.has(Capability::Sunny));
}

/// Every neighbour occupied: the spawn is dropped and reported.
#[test]
fn surrounded_ground_blocks_the_spawn() {
    let (mut world, map) = rainy_bush();
    let exits = world.map(map).unwrap().exits(Point::new(2, 2));
    for exit in exits {
        world
            .add_actor(map, exit.destination, Actor::new("Blocker", 'b', 10, Weapon::new(1, "pokes", 0)))
            .unwrap();
    }
    let before = world.actors().len();

    world.tick_grounds(&mut FixedRng(0));
    let events = world.drain_events();
    assert!(spawned(&events).is_empty());
    assert!(events.iter().any(|e| matches!(e, SimEvent::SpawnBlocked { x: 2, y: 2, .. })));
    assert_eq!(world.actors().len(), before);
}

/// Void around the ground keeps the Red Wolf out but admits the
/// void-immune Living Branch.
#[test]
fn void_only_accepts_immune_newcomers() {
    for (creature, expect_spawn) in [("red_wolf", false), ("living_branch", true)] {
        let (mut world, map) = spawn_world(creature, 100.0, None, Terrain::Bush);
        {
            let game_map = world.map_mut(map).unwrap();
            for exit in game_map.exits(Point::new(2, 2)) {
                game_map.set_ground(exit.destination, Ground::new(Terrain::Void)).unwrap();
            }
        }
        world.tick_grounds(&mut FixedRng(0));
        let events = world.drain_events();
        assert_eq!(!spawned(&events).is_empty(), expect_spawn, "{creature}");
    }
}

/// Void knocks out whoever stands on it, unless they are immune.
#[test]
fn void_claims_non_immune_occupants() {
    let (mut world, map) = spawn_world("red_wolf", 0.0, None, Terrain::Bush);
    world.map_mut(map).unwrap().set_ground(Point::new(0, 0), Ground::new(Terrain::Void)).unwrap();
    world.map_mut(map).unwrap().set_ground(Point::new(4, 4), Ground::new(Terrain::Void)).unwrap();

    let victim = world.add_creature(map, Point::new(0, 0), "hollow_soldier").unwrap();
    let immune = world.add_creature(map, Point::new(4, 4), "eldentree_guardian").unwrap();

    world.begin_round(1);
    world.tick_grounds(&mut FixedRng(99));
    let events = world.drain_events();

    assert!(world.actor(victim).is_none());
    assert!(world.actor(immune).is_some());
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::ActorDefeated { actor, by: None, .. } if *actor == victim
    )));
}

/// Runes are perishable and always dropped.
#[test]
fn drops_follow_their_probabilities() {
    let (mut world, map) = spawn_world("red_wolf", 0.0, None, Terrain::Bush);
    world.map_mut(map).unwrap().set_ground(Point::new(0, 0), Ground::new(Terrain::Void)).unwrap();
    world.add_creature(map, Point::new(0, 0), "red_wolf").unwrap();

    // FixedRng(99) draws 0.99: above the vial's 0.1, below the runes' 1.0.
    world.tick_grounds(&mut FixedRng(99));
    let items = world.map(map).unwrap().items_at(Point::new(0, 0));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "25 Runes");
    assert!(items[0].perishable);
}
