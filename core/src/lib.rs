//! Ashgrove core: a deterministic, turn-based actor simulation on grid
//! maps, with capability-driven behaviour, weather cycles and spawn
//! grounds.

pub mod action;
pub mod actor;
pub mod behaviour;
pub mod bestiary;
pub mod capability;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod ground;
pub mod journal;
pub mod map;
pub mod phase;
pub mod player;
pub mod rng;
pub mod snapshot;
pub mod spawn;
pub mod types;
pub mod weather;
pub mod world;
