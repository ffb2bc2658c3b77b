//! Error types
//!
//! Generation failures are configuration or logic errors and abort the
//! attempt; config errors are recoverable by falling back to defaults.

use std::fmt;

use thiserror::Error;

use crate::world::Point;

/// The generation step that produced (or failed to produce) a set of rooms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    GridResize,
    StartingRooms,
    Expansion,
    ExitSelection,
    FloorStitching,
    Completion,
}

impl fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationPhase::GridResize => "grid resize",
            GenerationPhase::StartingRooms => "starting rooms",
            GenerationPhase::Expansion => "flood-fill expansion",
            GenerationPhase::ExitSelection => "exit selection",
            GenerationPhase::FloorStitching => "floor stitching",
            GenerationPhase::Completion => "final check",
        };
        f.write_str(name)
    }
}

/// Errors raised while building or populating a dungeon
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DungeonError {
    #[error("{phase} left {} room(s) missing at depth {depth}: {missing:?}", .missing.len())]
    MissingRooms {
        phase: GenerationPhase,
        depth: usize,
        missing: Vec<Point>,
    },

    #[error("{phase} addressed a cell outside the grid at depth {depth}: {point}")]
    OutOfBounds {
        phase: GenerationPhase,
        depth: usize,
        point: Point,
    },

    #[error("floor '{definition}' at depth {depth} produced no rooms after {attempts} expansion attempts")]
    FloorExhausted {
        definition: String,
        depth: usize,
        attempts: u32,
    },

    #[error("cannot roll an empty weighted table")]
    EmptyTable,

    #[error("the floor catalogue has no definitions")]
    EmptyCatalogue,

    #[error("floor '{definition}' has an empty encounter table")]
    EmptyEncounters { definition: String },

    #[error("no floor definition covers depth {0}")]
    DepthGap(usize),

    #[error("floor '{definition}' has a blend chance of 1 or more and would blend forever")]
    SaturatedBlend { definition: String },
}

/// Errors raised while reading or writing configuration files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}
