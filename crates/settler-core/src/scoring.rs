//! Multi-factor settlement scoring.
//!
//! Every candidate vertex gets one raw sub-score per [`Factor`]; the total is
//! the strategy-weighted sum. Scoring reads the board, the vertex graph and
//! the game state and never changes them.

use crate::board::{Board, Harbor, Resource, Tile};
use crate::error::{AdvisorError, Result};
use crate::hex::HexCoord;
use crate::state::{GameState, PlayerId};
use crate::strategy::{Factor, StrategyProfile};
use crate::vertices::{VertexId, VertexManager};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Penalty per adjacent 6 or 8 tile
const ROBBER_PENALTY_PER_TILE: f64 = -5.0;

/// Connectivity points per adjacent vertex
const ROAD_POINTS_PER_NEIGHBOR: f64 = 2.0;

const GENERIC_HARBOR_SCORE: f64 = 15.0;
const SPECIFIC_HARBOR_SCORE: f64 = 25.0;
const PREFERRED_HARBOR_BONUS: f64 = 5.0;

/// Raw sub-scores of one vertex and their weighted total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub vertex: VertexId,
    /// Which of the player's settlements this would be
    pub settlement_number: u32,
    /// Raw sub-score of every factor
    pub subscores: BTreeMap<Factor, f64>,
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn subscore(&self, factor: Factor) -> f64 {
        self.subscores.get(&factor).copied().unwrap_or(0.0)
    }

    /// Weighted share of the total contributed by one factor
    pub fn contribution(&self, factor: Factor, strategy: &StrategyProfile) -> f64 {
        strategy.weight(factor) * self.subscore(factor)
    }
}

/// Scores vertices of one board
#[derive(Debug, Clone, Copy)]
pub struct SettlementScorer<'a> {
    board: &'a Board,
    vertices: &'a VertexManager,
}

impl<'a> SettlementScorer<'a> {
    pub fn new(board: &'a Board, vertices: &'a VertexManager) -> Self {
        Self { board, vertices }
    }

    /// Score `vertex` as the next settlement of `player`.
    ///
    /// When `settlement_number` is `None` it is the player's settlement count
    /// plus one. The vertex does not have to be legal.
    pub fn score(
        &self,
        vertex: VertexId,
        state: &GameState,
        strategy: &StrategyProfile,
        player: PlayerId,
        settlement_number: Option<u32>,
    ) -> Result<ScoreBreakdown> {
        if !state.turn_order().contains(&player) {
            return Err(AdvisorError::PlayerNotFound(player));
        }
        let settlement_number =
            settlement_number.unwrap_or_else(|| state.next_settlement_number(player));
        let tiles = self.tiles_of(vertex)?;

        let subscores = BTreeMap::from([
            (Factor::Production, production_score(&tiles, strategy)),
            (Factor::Balance, balance_score(&tiles)),
            (Factor::Road, self.road_score(vertex, &tiles, strategy)?),
            (Factor::Development, development_score(&tiles, strategy)),
            (Factor::RobberPenalty, robber_penalty(&tiles)),
            (Factor::Blocking, self.blocking_score(vertex, &tiles, state, strategy, player)?),
            (Factor::Harbor, self.harbor_score(vertex, strategy)?),
            (
                Factor::Synergy,
                self.synergy_score(&tiles, state, strategy, player, settlement_number)?,
            ),
        ]);

        let total = Factor::ALL
            .iter()
            .map(|f| strategy.weight(*f) * subscores[f])
            .sum();

        Ok(ScoreBreakdown {
            vertex,
            settlement_number,
            subscores,
            total,
        })
    }

    fn tiles_of(&self, vertex: VertexId) -> Result<Vec<&'a Tile>> {
        self.vertices
            .adjacent_tiles(vertex)?
            .iter()
            .map(|coord| self.board.tile_at(coord))
            .collect()
    }

    fn vertex_pips(&self, vertex: VertexId) -> Result<u32> {
        Ok(self.tiles_of(vertex)?.iter().map(|t| t.pips()).sum())
    }

    fn road_score(
        &self,
        vertex: VertexId,
        tiles: &[&Tile],
        strategy: &StrategyProfile,
    ) -> Result<f64> {
        let neighbors = self.vertices.adjacent_vertices(vertex)?.len() as f64;
        let material = resource_pips(tiles, &[Resource::Wood, Resource::Brick]);
        Ok(ROAD_POINTS_PER_NEIGHBOR * neighbors + strategy.tuning.road_material_bonus * material)
    }

    /// Production this placement takes away from everyone else.
    ///
    /// Neighbouring spots that are legal now become illegal, and tiles another
    /// player already collects from get shared.
    fn blocking_score(
        &self,
        vertex: VertexId,
        tiles: &[&Tile],
        state: &GameState,
        strategy: &StrategyProfile,
        player: PlayerId,
    ) -> Result<f64> {
        let mut denied = 0;
        for &neighbor in self.vertices.adjacent_vertices(vertex)? {
            if self.vertices.is_legal_settlement_placement(neighbor, state) {
                denied += self.vertex_pips(neighbor)?;
            }
        }

        let mut contested_tiles: HashSet<HexCoord> = HashSet::new();
        for occupied in state.occupied_vertices() {
            if state.occupant(occupied) != Some(player) {
                contested_tiles.extend(self.vertices.adjacent_tiles(occupied)?);
            }
        }
        let contested: u32 = tiles
            .iter()
            .filter(|t| contested_tiles.contains(&t.coord))
            .map(|t| t.pips())
            .sum();

        Ok(strategy.tuning.denial_rate * f64::from(denied)
            + strategy.tuning.contest_rate * f64::from(contested))
    }

    fn harbor_score(&self, vertex: VertexId, strategy: &StrategyProfile) -> Result<f64> {
        Ok(match self.vertices.vertex(vertex)?.harbor {
            None => 0.0,
            Some(Harbor::Generic) => GENERIC_HARBOR_SCORE,
            Some(Harbor::Specific(resource)) if strategy.prefers(resource) => {
                SPECIFIC_HARBOR_SCORE + PREFERRED_HARBOR_BONUS
            }
            Some(Harbor::Specific(_)) => SPECIFIC_HARBOR_SCORE,
        })
    }

    /// Fit with the player's existing settlements: new resources are
    /// rewarded, numbers the player already collects are penalised.
    fn synergy_score(
        &self,
        tiles: &[&Tile],
        state: &GameState,
        strategy: &StrategyProfile,
        player: PlayerId,
        settlement_number: u32,
    ) -> Result<f64> {
        let existing = state.get_player_settlements(player);
        if settlement_number < 2 || existing.is_empty() {
            return Ok(0.0);
        }

        let mut owned_resources = BTreeSet::new();
        let mut owned_numbers = BTreeSet::new();
        for settlement in existing {
            for tile in self.tiles_of(settlement.vertex)? {
                owned_resources.extend(tile.resource());
                owned_numbers.extend(tile.dice_number);
            }
        }

        let new_resources = distinct_resources(tiles)
            .difference(&owned_resources)
            .count();
        let redundant = tiles
            .iter()
            .filter(|t| t.dice_number.is_some_and(|n| owned_numbers.contains(&n)))
            .count();

        Ok(strategy.tuning.complement_bonus * new_resources as f64
            - strategy.tuning.redundancy_penalty * redundant as f64)
    }
}

fn production_score(tiles: &[&Tile], strategy: &StrategyProfile) -> f64 {
    tiles
        .iter()
        .filter_map(|t| t.resource().map(|r| f64::from(t.pips()) * strategy.preference(r)))
        .sum()
}

fn balance_score(tiles: &[&Tile]) -> f64 {
    match distinct_resources(tiles).len() {
        0 | 1 => 0.0,
        2 => 10.0,
        _ => 20.0,
    }
}

fn development_score(tiles: &[&Tile], strategy: &StrategyProfile) -> f64 {
    let pips = resource_pips(tiles, &[Resource::Ore, Resource::Wheat, Resource::Sheep]);
    strategy.tuning.development_scale * pips
}

fn robber_penalty(tiles: &[&Tile]) -> f64 {
    let exposed = tiles.iter().filter(|t| t.is_high_probability()).count();
    ROBBER_PENALTY_PER_TILE * exposed as f64
}

fn distinct_resources(tiles: &[&Tile]) -> BTreeSet<Resource> {
    tiles.iter().filter_map(|t| t.resource()).collect()
}

fn resource_pips(tiles: &[&Tile], resources: &[Resource]) -> f64 {
    tiles
        .iter()
        .filter(|t| t.resource().is_some_and(|r| resources.contains(&r)))
        .map(|t| f64::from(t.pips()))
        .sum()
}
