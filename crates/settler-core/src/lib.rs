//! Settler - settlement placement advisor for hex-board settlement games
//!
//! This crate provides the board geometry and scoring engine, including:
//! - Hex coordinate system and exact corner keys
//! - Standard 19-tile board generation with seeded layouts and harbors
//! - Vertex graph discovery and the settlement distance rule
//! - Game state tracking placed settlements per player
//! - Multi-factor settlement scoring under strategy profiles
//! - Ranked recommendations with justifications
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates, rings, corner keys
//! - [`board`]: Tiles, number tokens, harbors
//! - [`vertices`]: Vertex graph and placement legality
//! - [`state`]: Placed settlements and persistence
//! - [`strategy`]: Strategy profiles and factor weights
//! - [`scoring`]: Per-vertex score breakdowns
//! - [`recommend`]: Ranking and justifications
//! - [`analyzer`]: Whole-board strategy advice

pub mod analyzer;
pub mod board;
pub mod error;
pub mod hex;
pub mod recommend;
pub mod scoring;
pub mod state;
pub mod strategy;
pub mod vertices;

// Re-export commonly used types
pub use analyzer::{BoardAnalyzer, BoardCharacteristics, StrategyAdvice};
pub use board::{
    pip_count, Board, BoardConfig, BoardJson, Harbor, HarborPlacement, LayoutMode, Resource, Tile,
    TileType,
};
pub use error::{AdvisorError, PlacementViolation, Result};
pub use hex::{CornerKey, HexCoord, Ring};
pub use recommend::{Recommendation, SettlementRecommender};
pub use scoring::{ScoreBreakdown, SettlementScorer};
pub use state::{GameState, GameStateJson, Phase, PlayerId, Settlement};
pub use strategy::{Factor, ScoringTuning, StrategyProfile, BUILTIN_STRATEGIES};
pub use vertices::{Vertex, VertexId, VertexInfo, VertexManager};
