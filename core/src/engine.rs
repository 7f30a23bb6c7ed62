//! The simulation engine — the heart of Ashgrove.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Grounds phase  (lethal terrain, spawn rolls)
//!   2. Turns phase    (weather control, responses, actions)
//!
//! RULES:
//!   - Phases execute in registration order, every round.
//!   - All randomness flows through the RngBank: one stream per
//!     (phase slot, round).
//!   - All state changes are recorded in the event journal.

use crate::{
    clock::SimClock,
    config::SimConfig,
    error::SimResult,
    event::SimEvent,
    journal::{EventJournal, EventLogEntry},
    phase::{GroundsPhase, RoundPhase, TurnsPhase},
    rng::{RngBank, SubsystemSlot},
    snapshot::WorldSnapshot,
    types::{RunId, Tick},
    weather::WeatherState,
    world::World,
};

pub struct SimEngine {
    pub run_id:   RunId,
    pub clock:    SimClock,
    pub rng_bank: RngBank,
    pub world:    World,
    seed:         u64,
    phases:       Vec<(SubsystemSlot, Box<dyn RoundPhase>)>,
    journal:      EventJournal,
}

impl SimEngine {
    pub fn new(run_id: RunId, seed: u64, world: World) -> Self {
        Self {
            clock:    SimClock::new(run_id.clone()),
            rng_bank: RngBank::new(seed),
            world,
            seed,
            phases:   Vec::new(),
            journal:  EventJournal::new(run_id.clone()),
            run_id,
        }
    }

    /// Build a fully wired engine with both phases registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(run_id: RunId, seed: u64, config: &SimConfig) -> SimResult<Self> {
        let world = World::from_config(config)?;
        let mut engine = SimEngine::new(run_id, seed, world);

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(SubsystemSlot::Grounds, Box::new(GroundsPhase));
        engine.register(SubsystemSlot::Turns, Box::new(TurnsPhase));

        // Setup broadcasts (initial weather) are journaled at tick 0.
        for event in engine.world.drain_events() {
            engine.journal.append(0, "setup", &event)?;
        }
        Ok(engine)
    }

    /// Engine over `SimConfig::default_test()`.
    pub fn build_test(run_id: RunId, seed: u64) -> SimResult<Self> {
        Self::build(run_id, seed, &SimConfig::default_test())
    }

    /// Register a phase. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, phase: Box<dyn RoundPhase>) {
        self.phases.push((slot, phase));
    }

    /// Advance one round. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        assert!(!self.clock.paused, "tick() called on paused engine");

        let current_tick = self.clock.advance();
        let started = SimEvent::RoundStarted { tick: current_tick };
        self.journal.append(current_tick, "engine", &started)?;
        let mut round_events: Vec<SimEvent> = vec![started];

        self.world.begin_round(current_tick);
        for (slot, phase) in &mut self.phases {
            let mut rng = self.rng_bank.for_subsystem_at_tick(*slot, current_tick);
            let new_events = phase.run(current_tick, &mut self.world, &mut rng)?;

            for event in &new_events {
                self.journal.append(current_tick, phase.name(), event)?;
            }
            round_events.extend(new_events);
        }

        let completed = SimEvent::RoundCompleted { tick: current_tick };
        self.journal.append(current_tick, "engine", &completed)?;
        round_events.push(completed);

        Ok(round_events)
    }

    /// Run n rounds in a loop. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        // Emit RunInitialized at tick 0 so seed differences are observable.
        if self.clock.current_tick == 0 && self.journal.count_of("run_initialized") == 0 {
            let init_event = SimEvent::RunInitialized {
                run_id: self.run_id.clone(),
                seed: self.seed,
            };
            self.journal.append(0, "engine", &init_event)?;
        }
        self.clock.resume();
        for _ in 0..n {
            self.tick()?;
        }
        self.clock.pause();
        Ok(())
    }

    /// Broadcast weather from outside the round (runner commands).
    pub fn set_weather(&mut self, weather: WeatherState) -> SimResult<Vec<SimEvent>> {
        let tick = self.clock.current_tick;
        self.world.begin_round(tick);
        self.world.set_weather(weather);
        let events = self.world.drain_events();
        for event in &events {
            self.journal.append(tick, "command", event)?;
        }
        Ok(events)
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    /// Journal entries for one tick, in append order.
    /// Used by the determinism test and replay tooling.
    pub fn events_for_tick(&self, tick: Tick) -> Vec<&EventLogEntry> {
        self.journal.events_for_tick(tick)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let snapshot = WorldSnapshot::capture(self.run_id.clone(), self.clock.current_tick, &self.world);
        log::debug!("Snapshot captured at tick {}", snapshot.tick);
        snapshot
    }
}
