//! Round phases.
//!
//! RULE: Every phase implements RoundPhase.
//! The engine runs each registered phase in registration order, every
//! round, handing it the phase's own RNG stream for that round.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    types::Tick,
    world::World,
};

/// The contract every phase must fulfill.
pub trait RoundPhase: Send {
    /// Unique stable name; also the journal's phase column.
    fn name(&self) -> &'static str;

    /// Called once per round by the engine.
    ///
    /// - `tick`:  the current round number
    /// - `world`: the world, already stamped with `tick`
    /// - `rng`:   this phase's deterministic RNG for this round
    ///
    /// Returns the events the phase produced.
    fn run(&mut self, tick: Tick, world: &mut World, rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>>;
}

/// Lethal terrain and spawn rolls.
#[derive(Debug, Default)]
pub struct GroundsPhase;

impl RoundPhase for GroundsPhase {
    fn name(&self) -> &'static str {
        "grounds"
    }

    fn run(&mut self, _tick: Tick, world: &mut World, rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        world.tick_grounds(rng);
        Ok(world.drain_events())
    }
}

/// Every actor's turn.
#[derive(Debug, Default)]
pub struct TurnsPhase;

impl RoundPhase for TurnsPhase {
    fn name(&self) -> &'static str {
        "turns"
    }

    fn run(&mut self, _tick: Tick, world: &mut World, rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        world.play_turns(rng);
        Ok(world.drain_events())
    }
}
