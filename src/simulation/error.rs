//! Fatal simulation errors
//!
//! Every variant describes malformed static data or configuration. Callers
//! abort on them.

use thiserror::Error;

use super::types::{CarId, Direction};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("track layout is empty")]
    EmptyTrack,

    #[error("track row {row} is {found} tiles wide, expected {expected}")]
    RaggedTrack {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile character {ch:?} at row {row}, column {column}")]
    UnknownTileChar { ch: char, row: usize, column: usize },

    #[error("track layout has no road tile")]
    NoRoadTiles,

    #[error("direction {0:?} has no traffic light group")]
    NoSignalGroup(Direction),

    #[error("car {car:?} found no target point within {steps} tiles")]
    HeadingSearchExhausted { car: CarId, steps: usize },

    #[error("no free spawn point after {attempts} attempts, track too small for the requested cars")]
    SpawnBudgetExhausted { attempts: usize },
}

pub type SimResult<T> = Result<T, SimError>;
