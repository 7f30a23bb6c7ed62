//! Simulation clock — owns the round counter and pause state.

use crate::types::{RunId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
    pub paused:       bool,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
            paused: true,
        }
    }

    /// Advance one round. Returns the new tick number.
    /// Panics if called while paused — callers must check.
    pub fn advance(&mut self) -> Tick {
        assert!(!self.paused, "advance() called on paused clock");
        self.current_tick += 1;
        self.current_tick
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_counts_rounds() {
        let mut clock = SimClock::new("clock-test".into());
        clock.resume();
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
    }

    #[test]
    #[should_panic(expected = "paused clock")]
    fn advance_while_paused_panics() {
        let mut clock = SimClock::new("clock-test".into());
        clock.advance();
    }
}
