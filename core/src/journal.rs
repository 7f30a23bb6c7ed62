//! In-memory event journal.
//!
//! RULE: Only the engine appends. Entries are never edited or removed,
//! so two runs with the same seed must produce identical journals.

use crate::{
    error::{SimError, SimResult},
    event::SimEvent,
    types::{RunId, Tick},
};
use serde::{Deserialize, Serialize};

/// One journaled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: u64,
    pub run_id: RunId,
    pub tick: Tick,
    pub phase: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}

#[derive(Debug, Clone, Default)]
pub struct EventJournal {
    run_id: RunId,
    entries: Vec<EventLogEntry>,
}

impl EventJournal {
    pub fn new(run_id: RunId) -> Self {
        Self { run_id, entries: Vec::new() }
    }

    pub fn append(&mut self, tick: Tick, phase: &str, event: &SimEvent) -> SimResult<()> {
        let entry = EventLogEntry {
            id: self.entries.len() as u64 + 1,
            run_id: self.run_id.clone(),
            tick,
            phase: phase.to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(event)?,
        };
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[EventLogEntry] {
        &self.entries
    }

    pub fn events_for_tick(&self, tick: Tick) -> Vec<&EventLogEntry> {
        self.entries.iter().filter(|e| e.tick == tick).collect()
    }

    pub fn count_of(&self, event_type: &str) -> usize {
        self.entries.iter().filter(|e| e.event_type == event_type).count()
    }

    /// Decode every entry of `event_type` back into events.
    pub fn decode(&self, event_type: &str) -> SimResult<Vec<SimEvent>> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .map(|e| serde_json::from_str(&e.payload).map_err(SimError::from))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
