use crate::types::Point;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Creature '{id}' not found in bestiary")]
    UnknownCreature { id: String },

    #[error("Map '{name}' not found")]
    UnknownMap { name: String },

    #[error("Map '{map}' has unknown ground glyph '{glyph}' at {at}")]
    InvalidGlyph { map: String, glyph: char, at: Point },

    #[error("Map '{map}' has ragged rows: expected width {expected}, row {row} has {actual}")]
    RaggedMap { map: String, expected: usize, row: usize, actual: usize },

    #[error("Position {at} is outside map '{map}'")]
    OutOfBounds { map: String, at: Point },

    #[error("Position {at} on map '{map}' is already occupied")]
    Occupied { map: String, at: Point },

    #[error("Weather period must be > 0")]
    InvalidWeatherPeriod,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
