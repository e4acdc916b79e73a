//! Error types shared by every part of the engine.

use crate::hex::HexCoord;
use crate::state::PlayerId;
use crate::vertices::VertexId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a settlement cannot go on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementViolation {
    /// The vertex already holds a settlement
    Occupied { by: PlayerId },
    /// A directly adjacent vertex holds a settlement
    DistanceRule { neighbor: VertexId },
}

impl std::fmt::Display for PlacementViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementViolation::Occupied { by } => {
                write!(f, "vertex is already occupied by player {by}")
            }
            PlacementViolation::DistanceRule { neighbor } => {
                write!(f, "adjacent vertex {neighbor} already holds a settlement")
            }
        }
    }
}

/// Errors surfaced by board construction, lookups, placement and ranking
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisorError {
    #[error("Unsupported board radius {radius} (only radius 2 is supported)")]
    Geometry { radius: u32 },

    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    #[error("No tile at {0}")]
    TileNotFound(HexCoord),

    #[error("No vertex with id {0}")]
    VertexNotFound(VertexId),

    #[error("Unknown player {0}")]
    PlayerNotFound(PlayerId),

    #[error("Illegal placement at vertex {vertex}: {reason}")]
    IllegalPlacement {
        vertex: VertexId,
        reason: PlacementViolation,
    },

    #[error("No legal vertex remains on the board")]
    EmptyBoard,

    #[error("Invalid game state: {0}")]
    InvalidState(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        AdvisorError::Json(err.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AdvisorError>;
