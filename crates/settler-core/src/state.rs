//! Game state: who has settled where, and in what order.
//!
//! The state is mutated only through [`GameState::place_settlement`], which
//! asks the [`VertexManager`] for legality. Scoring and recommendation read it.

use crate::error::{AdvisorError, Result};
use crate::vertices::{VertexId, VertexManager};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Player identifier (0-3 for a 4-player game)
pub type PlayerId = u8;

/// Settlements each player places during initial placement
pub const INITIAL_SETTLEMENTS: usize = 2;

const DEFAULT_PLAYERS: u8 = 4;

/// A placed settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub player: PlayerId,
    pub vertex: VertexId,
    /// 1 for the player's first settlement, 2 for the second, ...
    pub sequence_index: u32,
    /// Position in the whole game's placement order, starting at 1
    pub global_index: u32,
}

/// Game phase, derived from settlement counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Some player has fewer than two settlements
    InitialPlacement,
    /// Every player has at least two settlements
    Expansion,
}

/// Settlements on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    turn_order: Vec<PlayerId>,
    player_settlements: BTreeMap<PlayerId, Vec<Settlement>>,
    /// (player, vertex) in placement order
    settlement_order: Vec<(PlayerId, VertexId)>,
    occupancy: BTreeMap<VertexId, PlayerId>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_players(DEFAULT_PLAYERS)
    }
}

impl GameState {
    /// Create an empty game with the given cyclic turn order
    pub fn new(turn_order: Vec<PlayerId>) -> Result<Self> {
        if turn_order.is_empty() {
            return Err(AdvisorError::InvalidState(
                "turn order must name at least one player".to_string(),
            ));
        }
        let unique: BTreeSet<_> = turn_order.iter().collect();
        if unique.len() != turn_order.len() {
            return Err(AdvisorError::InvalidState(format!(
                "turn order {:?} repeats a player",
                turn_order
            )));
        }
        Ok(Self::empty(turn_order))
    }

    /// Create an empty game for players `0..count` (at least one)
    pub fn with_players(count: u8) -> Self {
        Self::empty((0..count.max(1)).collect())
    }

    fn empty(turn_order: Vec<PlayerId>) -> Self {
        let player_settlements = turn_order.iter().map(|&p| (p, Vec::new())).collect();
        Self {
            turn_order,
            player_settlements,
            settlement_order: Vec::new(),
            occupancy: BTreeMap::new(),
        }
    }

    // ==================== Placement ====================

    /// Place a settlement for `player` on `vertex`.
    ///
    /// Legality is decided by [`VertexManager::check_settlement_placement`].
    pub fn place_settlement(
        &mut self,
        player: PlayerId,
        vertex: VertexId,
        vertex_manager: &VertexManager,
    ) -> Result<Settlement> {
        if !self.turn_order.contains(&player) {
            return Err(AdvisorError::PlayerNotFound(player));
        }
        vertex_manager.check_settlement_placement(vertex, self)?;

        let settlements = self.player_settlements.entry(player).or_default();
        let settlement = Settlement {
            player,
            vertex,
            sequence_index: settlements.len() as u32 + 1,
            global_index: self.settlement_order.len() as u32 + 1,
        };
        settlements.push(settlement);
        self.settlement_order.push((player, vertex));
        self.occupancy.insert(vertex, player);

        info!(
            player,
            vertex = %vertex,
            sequence_index = settlement.sequence_index,
            "placed settlement"
        );
        Ok(settlement)
    }

    // ==================== Query Methods ====================

    /// A player's settlements in placement order (empty if none)
    pub fn get_player_settlements(&self, player: PlayerId) -> &[Settlement] {
        self.player_settlements
            .get(&player)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_settlement_count(&self, player: PlayerId) -> usize {
        self.get_player_settlements(player).len()
    }

    /// Ordinal of the player's next settlement
    pub fn next_settlement_number(&self, player: PlayerId) -> u32 {
        self.get_settlement_count(player) as u32 + 1
    }

    /// Player holding the settlement on `vertex`
    pub fn occupant(&self, vertex: VertexId) -> Option<PlayerId> {
        self.occupancy.get(&vertex).copied()
    }

    /// Occupied vertices, ascending
    pub fn occupied_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.occupancy.keys().copied()
    }

    /// (player, vertex) pairs in placement order
    pub fn settlement_order(&self) -> &[(PlayerId, VertexId)] {
        &self.settlement_order
    }

    pub fn turn_order(&self) -> &[PlayerId] {
        &self.turn_order
    }

    pub fn total_settlements(&self) -> usize {
        self.settlement_order.len()
    }

    pub fn phase(&self) -> Phase {
        let placing = self
            .turn_order
            .iter()
            .any(|&p| self.get_settlement_count(p) < INITIAL_SETTLEMENTS);
        if placing {
            Phase::InitialPlacement
        } else {
            Phase::Expansion
        }
    }

    /// Whose turn it is during initial placement.
    ///
    /// Setup uses snake draft order: 0,1,2,3,3,2,1,0. Round `k` runs forward
    /// when `k` is odd and backward when even, and the next player is the
    /// first in the earliest unfinished round holding fewer than `k`
    /// settlements. Returns `None` once the game is in expansion.
    pub fn next_setup_player(&self) -> Option<PlayerId> {
        if self.phase() == Phase::Expansion {
            return None;
        }
        (1..=INITIAL_SETTLEMENTS).find_map(|round| {
            let below = |p: &&PlayerId| self.get_settlement_count(**p) < round;
            if round % 2 == 1 {
                self.turn_order.iter().find(below).copied()
            } else {
                self.turn_order.iter().rev().find(below).copied()
            }
        })
    }

    /// Check stored placements against the board's placement rule.
    ///
    /// Used after loading a saved state, which is only checked for internal
    /// consistency.
    pub fn validate_placements(&self, vertex_manager: &VertexManager) -> Result<()> {
        let mut replay = Self::empty(self.turn_order.clone());
        for &(player, vertex) in &self.settlement_order {
            replay.place_settlement(player, vertex, vertex_manager)?;
        }
        Ok(())
    }

    // ==================== Persistence ====================

    /// Convert to the persisted layout
    pub fn to_json_friendly(&self) -> GameStateJson {
        GameStateJson {
            turn_order: self.turn_order.clone(),
            player_settlements: self
                .player_settlements
                .iter()
                .map(|(&player, settlements)| {
                    let entries = settlements
                        .iter()
                        .map(|s| SettlementJson {
                            vertex_id: s.vertex,
                            sequence_index: s.sequence_index,
                        })
                        .collect();
                    (player, entries)
                })
                .collect(),
            settlement_order: self.settlement_order.clone(),
        }
    }

    /// Rebuild from the persisted layout, rejecting inconsistent data
    pub fn from_json_friendly(json: GameStateJson) -> Result<Self> {
        let mut state = Self::new(json.turn_order)?;

        for (player, entries) in &json.player_settlements {
            if !state.turn_order.contains(player) {
                return Err(AdvisorError::PlayerNotFound(*player));
            }
            for (i, entry) in entries.iter().enumerate() {
                if entry.sequence_index != i as u32 + 1 {
                    return Err(AdvisorError::InvalidState(format!(
                        "player {} settlement {} has sequence index {}",
                        player,
                        i + 1,
                        entry.sequence_index
                    )));
                }
            }
        }

        for (global, &(player, vertex)) in json.settlement_order.iter().enumerate() {
            if !state.turn_order.contains(&player) {
                return Err(AdvisorError::PlayerNotFound(player));
            }
            if let Some(other) = state.occupant(vertex) {
                return Err(AdvisorError::InvalidState(format!(
                    "vertex {} settled twice (players {} and {})",
                    vertex, other, player
                )));
            }

            let settlements = state.player_settlements.entry(player).or_default();
            let sequence_index = settlements.len() as u32 + 1;
            let recorded = json
                .player_settlements
                .get(&player)
                .and_then(|entries| entries.get(settlements.len()));
            if recorded.map(|e| e.vertex_id) != Some(vertex) {
                return Err(AdvisorError::InvalidState(format!(
                    "settlement order entry {} ({} on {}) disagrees with player settlements",
                    global + 1,
                    player,
                    vertex
                )));
            }

            settlements.push(Settlement {
                player,
                vertex,
                sequence_index,
                global_index: global as u32 + 1,
            });
            state.settlement_order.push((player, vertex));
            state.occupancy.insert(vertex, player);
        }

        for (player, entries) in &json.player_settlements {
            if entries.len() != state.get_settlement_count(*player) {
                return Err(AdvisorError::InvalidState(format!(
                    "player {} lists {} settlements but the settlement order has {}",
                    player,
                    entries.len(),
                    state.get_settlement_count(*player)
                )));
            }
        }

        Ok(state)
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json_friendly())?)
    }

    /// Parse and validate a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: GameStateJson = serde_json::from_str(json)?;
        Self::from_json_friendly(parsed)
    }
}

/// Persisted game state layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateJson {
    pub turn_order: Vec<PlayerId>,
    pub player_settlements: BTreeMap<PlayerId, Vec<SettlementJson>>,
    pub settlement_order: Vec<(PlayerId, VertexId)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementJson {
    pub vertex_id: VertexId,
    pub sequence_index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, BoardConfig};
    use crate::error::PlacementViolation;
    use pretty_assertions::assert_eq;

    fn vertex_manager() -> VertexManager {
        VertexManager::new(&Board::create_standard(&BoardConfig::default()).unwrap())
    }

    #[test]
    fn test_new_game_is_in_initial_placement() {
        let state = GameState::default();
        assert_eq!(state.turn_order(), &[0, 1, 2, 3]);
        assert_eq!(state.phase(), Phase::InitialPlacement);
        assert_eq!(state.total_settlements(), 0);
        assert!(state.get_player_settlements(2).is_empty());
    }

    #[test]
    fn test_invalid_turn_orders() {
        assert!(GameState::new(vec![]).is_err());
        assert!(GameState::new(vec![0, 1, 0]).is_err());
        assert!(GameState::new(vec![2, 0]).is_ok());
    }

    #[test]
    fn test_place_settlement_assigns_indices() {
        let vm = vertex_manager();
        let mut state = GameState::default();

        let first = state.place_settlement(0, VertexId(5), &vm).unwrap();
        assert_eq!(first.sequence_index, 1);
        assert_eq!(first.global_index, 1);

        state.place_settlement(1, VertexId(20), &vm).unwrap();
        let second = state.place_settlement(0, VertexId(40), &vm).unwrap();
        assert_eq!(second.sequence_index, 2);
        assert_eq!(second.global_index, 3);

        assert_eq!(state.get_settlement_count(0), 2);
        assert_eq!(state.next_settlement_number(0), 3);
        assert_eq!(state.occupant(VertexId(20)), Some(1));
        assert_eq!(
            state.settlement_order(),
            &[(0, VertexId(5)), (1, VertexId(20)), (0, VertexId(40))]
        );
    }

    #[test]
    fn test_illegal_placements_leave_state_unchanged() {
        let vm = vertex_manager();
        let mut state = GameState::default();
        state.place_settlement(0, VertexId(5), &vm).unwrap();
        let before = state.clone();

        let err = state.place_settlement(1, VertexId(5), &vm).unwrap_err();
        assert_eq!(
            err,
            AdvisorError::IllegalPlacement {
                vertex: VertexId(5),
                reason: PlacementViolation::Occupied { by: 0 },
            }
        );
        assert!(matches!(
            state.place_settlement(0, VertexId(4), &vm),
            Err(AdvisorError::IllegalPlacement { .. })
        ));
        assert_eq!(
            state.place_settlement(9, VertexId(30), &vm),
            Err(AdvisorError::PlayerNotFound(9))
        );
        assert_eq!(
            state.place_settlement(0, VertexId(500), &vm),
            Err(AdvisorError::VertexNotFound(VertexId(500)))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_phase_changes_after_two_each() {
        let vm = vertex_manager();
        let mut state = GameState::with_players(2);
        let spots = [VertexId(0), VertexId(10), VertexId(30), VertexId(50)];
        for (i, vertex) in spots.iter().enumerate() {
            assert_eq!(state.phase(), Phase::InitialPlacement);
            state.place_settlement((i % 2) as PlayerId, *vertex, &vm).unwrap();
        }
        assert_eq!(state.phase(), Phase::Expansion);
    }

    #[test]
    fn test_snake_draft_order() {
        let vm = vertex_manager();
        let mut state = GameState::default();
        let spots = [0, 8, 16, 24, 32, 40, 48, 52];
        let mut order = Vec::new();

        for spot in spots {
            let Some(player) = state.next_setup_player() else {
                break;
            };
            order.push(player);
            let vertex = VertexId(spot);
            if vm.is_legal_settlement_placement(vertex, &state) {
                state.place_settlement(player, vertex, &vm).unwrap();
            } else {
                let fallback = vm.legal_vertices(&state)[0];
                state.place_settlement(player, fallback, &vm).unwrap();
            }
        }

        assert_eq!(order, vec![0, 1, 2, 3, 3, 2, 1, 0]);
        assert_eq!(state.next_setup_player(), None);
        assert_eq!(state.phase(), Phase::Expansion);
    }

    #[test]
    fn test_setup_player_follows_counts_after_out_of_order_placements() {
        let vm = vertex_manager();
        let mut state = GameState::with_players(2);
        for vertex in [0, 20, 40] {
            state.place_settlement(0, VertexId(vertex), &vm).unwrap();
        }
        state.place_settlement(1, VertexId(50), &vm).unwrap();

        assert_eq!(state.phase(), Phase::InitialPlacement);
        assert_eq!(state.get_settlement_count(1), 1);
        assert_eq!(state.next_setup_player(), Some(1));

        let mut state = GameState::with_players(3);
        state.place_settlement(1, VertexId(0), &vm).unwrap();
        assert_eq!(state.next_setup_player(), Some(0));
        state.place_settlement(0, VertexId(20), &vm).unwrap();
        assert_eq!(state.next_setup_player(), Some(2));
    }

    #[test]
    fn test_json_round_trip() {
        let vm = vertex_manager();
        let mut state = GameState::new(vec![2, 0, 1]).unwrap();
        state.place_settlement(2, VertexId(5), &vm).unwrap();
        state.place_settlement(0, VertexId(25), &vm).unwrap();
        state.place_settlement(2, VertexId(45), &vm).unwrap();

        let json = state.to_json().unwrap();
        let restored = GameState::from_json(&json).unwrap();

        assert_eq!(restored, state);
        assert_eq!(restored.get_player_settlements(2), state.get_player_settlements(2));
        assert_eq!(restored.settlement_order(), state.settlement_order());
        assert_eq!(restored.turn_order(), &[2, 0, 1]);
    }

    #[test]
    fn test_persisted_field_names() {
        let vm = vertex_manager();
        let mut state = GameState::with_players(2);
        state.place_settlement(1, VertexId(7), &vm).unwrap();

        let value = serde_json::to_value(state.to_json_friendly()).unwrap();
        assert_eq!(value["turn_order"], serde_json::json!([0, 1]));
        assert_eq!(
            value["player_settlements"]["1"],
            serde_json::json!([{ "vertex_id": 7, "sequence_index": 1 }])
        );
        assert_eq!(value["settlement_order"], serde_json::json!([[1, 7]]));
    }

    #[test]
    fn test_from_json_rejects_inconsistent_state() {
        let vm = vertex_manager();
        let mut state = GameState::with_players(2);
        state.place_settlement(0, VertexId(5), &vm).unwrap();
        let good = state.to_json_friendly();

        let mut wrong_index = good.clone();
        wrong_index.player_settlements.get_mut(&0).unwrap()[0].sequence_index = 2;
        assert!(matches!(
            GameState::from_json_friendly(wrong_index),
            Err(AdvisorError::InvalidState(_))
        ));

        let mut missing_order = good.clone();
        missing_order.settlement_order.clear();
        assert!(GameState::from_json_friendly(missing_order).is_err());

        let mut stranger = good.clone();
        stranger.settlement_order.push((7, VertexId(30)));
        assert_eq!(
            GameState::from_json_friendly(stranger),
            Err(AdvisorError::PlayerNotFound(7))
        );

        assert!(GameState::from_json("{not json").is_err());
    }

    #[test]
    fn test_validate_placements_catches_distance_violations() {
        let vm = vertex_manager();
        let json = GameStateJson {
            turn_order: vec![0, 1],
            player_settlements: BTreeMap::from([
                (0, vec![SettlementJson { vertex_id: VertexId(5), sequence_index: 1 }]),
                (1, vec![SettlementJson { vertex_id: VertexId(0), sequence_index: 1 }]),
            ]),
            settlement_order: vec![(0, VertexId(5)), (1, VertexId(0))],
        };
        let state = GameState::from_json_friendly(json).unwrap();
        assert!(matches!(
            state.validate_placements(&vm),
            Err(AdvisorError::IllegalPlacement { .. })
        ));
    }
}
