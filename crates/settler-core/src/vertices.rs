//! Vertex graph derived from tile geometry.
//!
//! Vertices are the hex corners where settlements go. The manager merges the
//! corners of all tiles into vertices, records which tiles each vertex touches
//! and which vertices are joined by a tile edge, and owns the settlement
//! placement rule.

use crate::board::{Board, Harbor, Resource};
use crate::error::{AdvisorError, PlacementViolation, Result};
use crate::hex::{CornerKey, HexCoord};
use crate::state::GameState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use tracing::debug;

/// Identifier of a vertex, stable for any radius-2 board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub u32);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl VertexId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A settlement location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    /// Exact corner position
    pub key: CornerKey,
    /// Tiles meeting at this corner (1 on the coast, up to 3 inland)
    pub tiles: Vec<HexCoord>,
    /// Vertices one edge away, ascending
    pub neighbors: Vec<VertexId>,
    /// Harbor this vertex can trade through
    pub harbor: Option<Harbor>,
}

/// Production summary of one vertex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexInfo {
    pub vertex: VertexId,
    /// Pips collected per resource
    pub resource_pips: BTreeMap<Resource, u32>,
    /// Number tokens on the adjacent tiles, ascending
    pub numbers: Vec<u8>,
    pub total_pips: u32,
    /// Chance that a single roll produces anything here
    pub probability: f64,
    pub touches_desert: bool,
    pub harbor: Option<Harbor>,
}

/// Owner of the vertex graph for one board
#[derive(Debug, Clone)]
pub struct VertexManager {
    vertices: Vec<Vertex>,
    by_key: HashMap<CornerKey, VertexId>,
}

impl VertexManager {
    /// Discover every vertex of the board.
    ///
    /// Ids follow discovery order: tiles in scan order, then each tile's
    /// corners counter-clockwise from 0°.
    pub fn new(board: &Board) -> Self {
        let mut vertices: Vec<Vertex> = Vec::new();
        let mut by_key: HashMap<CornerKey, VertexId> = HashMap::new();

        for tile in board.all_tiles() {
            let corners = tile.coord.corners();
            let ids: Vec<VertexId> = corners
                .iter()
                .map(|key| {
                    *by_key.entry(*key).or_insert_with(|| {
                        let id = VertexId(vertices.len() as u32);
                        vertices.push(Vertex {
                            id,
                            key: *key,
                            tiles: Vec::new(),
                            neighbors: Vec::new(),
                            harbor: board.harbor_at_corner(key),
                        });
                        id
                    })
                })
                .collect();

            for (i, id) in ids.iter().enumerate() {
                let next = ids[(i + 1) % ids.len()];
                let vertex = &mut vertices[id.index()];
                vertex.tiles.push(tile.coord);
                if !vertex.neighbors.contains(&next) {
                    vertex.neighbors.push(next);
                }
                let other = &mut vertices[next.index()];
                if !other.neighbors.contains(id) {
                    other.neighbors.push(*id);
                }
            }
        }

        for vertex in &mut vertices {
            vertex.neighbors.sort_unstable();
        }

        debug!(vertices = vertices.len(), "built vertex graph");
        Self { vertices, by_key }
    }

    // ==================== Query Methods ====================

    pub fn vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.vertices
            .get(id.index())
            .ok_or(AdvisorError::VertexNotFound(id))
    }

    /// All vertices in id order
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Coordinates of the tiles meeting at a vertex
    pub fn adjacent_tiles(&self, id: VertexId) -> Result<&[HexCoord]> {
        Ok(&self.vertex(id)?.tiles)
    }

    /// Vertices joined to this one by a tile edge
    pub fn adjacent_vertices(&self, id: VertexId) -> Result<&[VertexId]> {
        Ok(&self.vertex(id)?.neighbors)
    }

    /// Look up the vertex at an exact corner position
    pub fn vertex_at(&self, key: &CornerKey) -> Option<VertexId> {
        self.by_key.get(key).copied()
    }

    /// Number of edges between two vertices
    pub fn graph_distance(&self, from: VertexId, to: VertexId) -> Result<u32> {
        self.vertex(from)?;
        self.vertex(to)?;

        let mut seen = vec![false; self.vertices.len()];
        let mut queue = VecDeque::from([(from, 0u32)]);
        seen[from.index()] = true;

        while let Some((current, dist)) = queue.pop_front() {
            if current == to {
                return Ok(dist);
            }
            for &next in &self.vertices[current.index()].neighbors {
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    queue.push_back((next, dist + 1));
                }
            }
        }

        Err(AdvisorError::InvalidBoard(format!(
            "vertices {} and {} are not connected",
            from, to
        )))
    }

    /// Production summary of a vertex on the given board
    pub fn vertex_info(&self, board: &Board, id: VertexId) -> Result<VertexInfo> {
        let vertex = self.vertex(id)?;
        let mut resource_pips: BTreeMap<Resource, u32> = BTreeMap::new();
        let mut numbers = Vec::new();
        let mut touches_desert = false;

        for coord in &vertex.tiles {
            let tile = board.tile_at(coord)?;
            match tile.resource() {
                Some(resource) => *resource_pips.entry(resource).or_insert(0) += tile.pips(),
                None => touches_desert = true,
            }
            numbers.extend(tile.dice_number);
        }
        numbers.sort_unstable();

        let total_pips: u32 = resource_pips.values().sum();
        Ok(VertexInfo {
            vertex: id,
            resource_pips,
            numbers,
            total_pips,
            probability: f64::from(total_pips) / 36.0,
            touches_desert,
            harbor: vertex.harbor,
        })
    }

    // ==================== Placement Rule ====================

    /// Check whether a settlement may go on `id`.
    ///
    /// The vertex must be empty and no vertex one edge away may hold a
    /// settlement of any player.
    pub fn check_settlement_placement(&self, id: VertexId, state: &GameState) -> Result<()> {
        let vertex = self.vertex(id)?;

        if let Some(by) = state.occupant(id) {
            return Err(AdvisorError::IllegalPlacement {
                vertex: id,
                reason: PlacementViolation::Occupied { by },
            });
        }

        if let Some(&neighbor) = vertex
            .neighbors
            .iter()
            .find(|n| state.occupant(**n).is_some())
        {
            return Err(AdvisorError::IllegalPlacement {
                vertex: id,
                reason: PlacementViolation::DistanceRule { neighbor },
            });
        }

        Ok(())
    }

    pub fn is_legal_settlement_placement(&self, id: VertexId, state: &GameState) -> bool {
        self.check_settlement_placement(id, state).is_ok()
    }

    /// Every vertex a settlement may currently go on, ascending
    pub fn legal_vertices(&self, state: &GameState) -> Vec<VertexId> {
        self.vertices
            .iter()
            .map(|v| v.id)
            .filter(|id| self.is_legal_settlement_placement(*id, state))
            .collect()
    }
}
