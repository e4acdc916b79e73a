//! Integration tests for the settlement advisor.
//!
//! These tests drive the engine the way a front end does: build a board,
//! place settlements, rank candidates, save and restore the game.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use settler_core::*;
use std::collections::{BTreeMap, BTreeSet};

fn standard_board(seed: u64, layout: LayoutMode) -> Board {
    Board::create_standard(&BoardConfig::new(seed, layout)).expect("standard board")
}

/// Board with the desert in the middle and ore 6 beside wheat 8 on the coast
fn board_with_coastal_6_and_8() -> Board {
    use Resource::*;
    let tile = |q, r, res, n| Tile::new_resource(HexCoord::new(q, r), res, n);
    Board::from_tiles(vec![
        Tile::desert(HexCoord::new(0, 0)),
        tile(2, -2, Ore, 6),
        tile(2, -1, Wheat, 8),
        tile(1, 0, Wood, 9),
        tile(1, -1, Sheep, 5),
        tile(0, -1, Brick, 4),
        tile(-1, 0, Wheat, 10),
        tile(-1, 1, Wood, 3),
        tile(0, 1, Sheep, 11),
        tile(2, 0, Brick, 2),
        tile(1, -2, Wood, 10),
        tile(0, -2, Sheep, 9),
        tile(-1, -1, Ore, 3),
        tile(-2, 0, Wheat, 6),
        tile(-2, 1, Brick, 5),
        tile(-2, 2, Ore, 8),
        tile(-1, 2, Wood, 4),
        tile(0, 2, Sheep, 11),
        tile(1, 1, Wheat, 12),
    ])
    .expect("valid explicit board")
}

fn vertex_touching(vm: &VertexManager, coords: &[HexCoord]) -> VertexId {
    let wanted: BTreeSet<HexCoord> = coords.iter().copied().collect();
    vm.vertices()
        .iter()
        .find(|v| v.tiles.iter().copied().collect::<BTreeSet<_>>() == wanted)
        .map(|v| v.id)
        .expect("tiles meet at a vertex")
}

#[test]
fn test_place_then_adjacent_placement_fails() {
    let board = standard_board(0, LayoutMode::Canonical);
    let vm = VertexManager::new(&board);
    let mut state = GameState::default();

    let settlement = state.place_settlement(0, VertexId(5), &vm).unwrap();
    assert_eq!(settlement.sequence_index, 1);
    assert_eq!(settlement.vertex, VertexId(5));

    let neighbor = vm.adjacent_vertices(VertexId(5)).unwrap()[0];
    let result = state.place_settlement(0, neighbor, &vm);
    assert!(
        matches!(result, Err(AdvisorError::IllegalPlacement { .. })),
        "Adjacent placement should fail, got {:?}",
        result
    );
    assert_eq!(state.get_settlement_count(0), 1);
}

#[test]
fn test_uniform_strategy_top_three() {
    let board = standard_board(0, LayoutMode::Canonical);
    let vm = VertexManager::new(&board);
    let recommender = SettlementRecommender::new(&board, &vm);
    let strategy = StrategyProfile::uniform("uniform");

    let recs = recommender
        .recommend_settlements(&GameState::default(), &strategy, 0, 3, None)
        .unwrap();

    assert_eq!(recs.len(), 3);
    assert!(recs[0].total_score >= recs[1].total_score);
    assert!(recs[1].total_score >= recs[2].total_score);
    assert!(recs.iter().all(|r| !r.justification.is_empty()));
}

#[test]
fn test_robber_penalty_for_6_and_8() {
    let board = board_with_coastal_6_and_8();
    let vm = VertexManager::new(&board);
    let scorer = SettlementScorer::new(&board, &vm);
    let state = GameState::default();

    let coast = vertex_touching(&vm, &[HexCoord::new(2, -2), HexCoord::new(2, -1)]);
    let inland = vertex_touching(
        &vm,
        &[HexCoord::new(2, -2), HexCoord::new(2, -1), HexCoord::new(1, -1)],
    );
    let mut strategies = StrategyProfile::all_builtin();
    strategies.push(StrategyProfile::uniform("uniform"));

    for mut strategy in strategies {
        strategy.weights.insert(Factor::RobberPenalty, 1.0);
        for vertex in [coast, inland] {
            let breakdown = scorer.score(vertex, &state, &strategy, 0, None).unwrap();
            assert_eq!(
                breakdown.subscore(Factor::RobberPenalty),
                -10.0,
                "strategy {} at vertex {}",
                strategy.name,
                vertex
            );
            assert_eq!(breakdown.contribution(Factor::RobberPenalty, &strategy), -10.0);
        }
    }
}

#[test]
fn test_same_seed_same_board_and_scores() {
    let a = standard_board(1234, LayoutMode::Shuffled);
    let b = standard_board(1234, LayoutMode::Shuffled);
    assert_eq!(a.to_json_friendly(), b.to_json_friendly());

    let vm_a = VertexManager::new(&a);
    let vm_b = VertexManager::new(&b);
    let state = GameState::default();
    let strategy = StrategyProfile::road_focused();
    let scorer_a = SettlementScorer::new(&a, &vm_a);
    let scorer_b = SettlementScorer::new(&b, &vm_b);

    for vertex in vm_a.vertices() {
        let x = scorer_a.score(vertex.id, &state, &strategy, 1, None).unwrap();
        let y = scorer_b.score(vertex.id, &state, &strategy, 1, None).unwrap();
        assert_eq!(x.total.to_bits(), y.total.to_bits());
        for factor in Factor::ALL {
            assert_eq!(x.subscore(factor).to_bits(), y.subscore(factor).to_bits());
        }
    }
}

#[test]
fn test_read_queries_are_idempotent() {
    let board = standard_board(9, LayoutMode::Shuffled);
    let vm = VertexManager::new(&board);
    let recommender = SettlementRecommender::new(&board, &vm);
    let mut state = GameState::default();
    state.place_settlement(3, VertexId(33), &vm).unwrap();
    let strategy = StrategyProfile::balanced();

    assert_eq!(vm.legal_vertices(&state), vm.legal_vertices(&state));
    let first = recommender
        .recommend_settlements(&state, &strategy, 0, 10, None)
        .unwrap();
    let second = recommender
        .recommend_settlements(&state, &strategy, 0, 10, None)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_full_initial_placement_with_recommendations() {
    let board = standard_board(42, LayoutMode::Shuffled);
    let vm = VertexManager::new(&board);
    let recommender = SettlementRecommender::new(&board, &vm);
    let strategies = StrategyProfile::all_builtin();
    let mut state = GameState::default();

    while let Some(player) = state.next_setup_player() {
        let strategy = &strategies[player as usize % strategies.len()];
        let best = recommender
            .recommend_settlements(&state, strategy, player, 1, None)
            .unwrap();
        state.place_settlement(player, best[0].vertex_id, &vm).unwrap();
    }

    assert_eq!(state.total_settlements(), 8);
    assert_eq!(state.phase(), Phase::Expansion);
    for player in 0..4 {
        let settlements = state.get_player_settlements(player);
        assert_eq!(settlements.len(), 2);
        assert_eq!(settlements[1].sequence_index, 2);
    }
    // Last to place in round one places first in round two
    assert_eq!(state.settlement_order()[3].0, state.settlement_order()[4].0);

    let restored = GameState::from_json(&state.to_json().unwrap()).unwrap();
    assert_eq!(restored, state);
    restored.validate_placements(&vm).unwrap();
}

#[test]
fn test_game_state_round_trip_through_json_friendly() {
    let board = standard_board(5, LayoutMode::Canonical);
    let vm = VertexManager::new(&board);
    let mut state = GameState::new(vec![3, 1, 0]).unwrap();
    state.place_settlement(1, VertexId(7), &vm).unwrap();
    state.place_settlement(3, VertexId(27), &vm).unwrap();
    state.place_settlement(1, VertexId(47), &vm).unwrap();

    let restored = GameState::from_json_friendly(state.to_json_friendly()).unwrap();
    assert_eq!(restored.turn_order(), state.turn_order());
    assert_eq!(restored.settlement_order(), state.settlement_order());
    for &player in state.turn_order() {
        assert_eq!(
            restored.get_player_settlements(player),
            state.get_player_settlements(player)
        );
    }
}

#[test]
fn test_custom_strategy_from_json() {
    let json = r#"{
        "name": "ore_rush",
        "weights": { "production": 1.0, "development": 2.0, "made_up": 4.0 },
        "resource_preferences": { "wood": 0.5, "sheep": 1.0, "wheat": 1.5, "brick": 0.5, "ore": 2.0 }
    }"#;
    let strategy: StrategyProfile = serde_json::from_str(json).unwrap();
    assert_eq!(strategy.weights.len(), 2);
    assert_eq!(strategy.weight(Factor::Balance), 0.0);

    let board = standard_board(3, LayoutMode::Shuffled);
    let vm = VertexManager::new(&board);
    let recs = SettlementRecommender::new(&board, &vm)
        .recommend_settlements(&GameState::default(), &strategy, 0, 5, None)
        .unwrap();
    assert_eq!(recs.len(), 5);
}

#[test]
fn test_vertex_export_shape() {
    let board = standard_board(0, LayoutMode::Canonical);
    let vm = VertexManager::new(&board);
    let exported = serde_json::to_value(vm.vertices()).unwrap();
    let first = &exported[0];
    assert_eq!(first["id"], serde_json::json!(0));
    assert!(first["tiles"].is_array());
    assert!(first["neighbors"].is_array());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_board_distribution(seed in any::<u64>(), shuffled in any::<bool>()) {
        let layout = if shuffled { LayoutMode::Shuffled } else { LayoutMode::Canonical };
        let board = standard_board(seed, layout);

        prop_assert_eq!(board.tile_count(), 19);
        prop_assert!(board.validate().is_ok());

        let mut counts: BTreeMap<Option<Resource>, usize> = BTreeMap::new();
        let mut tokens: Vec<u8> = Vec::new();
        for tile in board.all_tiles() {
            *counts.entry(tile.resource()).or_insert(0) += 1;
            tokens.extend(tile.dice_number);
            if tile.tile_type == TileType::Desert {
                prop_assert!(tile.dice_number.is_none());
            }
        }
        tokens.sort_unstable();
        prop_assert_eq!(tokens, vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12]);
        prop_assert_eq!(counts[&Some(Resource::Wood)], 4);
        prop_assert_eq!(counts[&Some(Resource::Sheep)], 4);
        prop_assert_eq!(counts[&Some(Resource::Wheat)], 4);
        prop_assert_eq!(counts[&Some(Resource::Brick)], 3);
        prop_assert_eq!(counts[&Some(Resource::Ore)], 3);
        prop_assert_eq!(counts[&None], 1);
    }

    #[test]
    fn prop_vertex_graph(seed in any::<u64>()) {
        let board = standard_board(seed, LayoutMode::Shuffled);
        let vm = VertexManager::new(&board);

        prop_assert!((50..=58).contains(&vm.vertex_count()));
        for vertex in vm.vertices() {
            prop_assert!((1..=3).contains(&vertex.tiles.len()));
            prop_assert!((2..=3).contains(&vertex.neighbors.len()));
        }
    }

    #[test]
    fn prop_distance_rule(picks in prop::collection::vec(0u32..54, 1..12)) {
        let board = standard_board(0, LayoutMode::Canonical);
        let vm = VertexManager::new(&board);
        let mut state = GameState::default();

        for (turn, pick) in picks.into_iter().enumerate() {
            let vertex = VertexId(pick);
            let expected = state.occupant(vertex).is_none()
                && vm
                    .adjacent_vertices(vertex)
                    .unwrap()
                    .iter()
                    .all(|n| state.occupant(*n).is_none());
            prop_assert_eq!(vm.is_legal_settlement_placement(vertex, &state), expected);

            let player = (turn % 4) as PlayerId;
            let placed = state.place_settlement(player, vertex, &vm);
            prop_assert_eq!(placed.is_ok(), expected);
        }

        let occupied: Vec<VertexId> = state.occupied_vertices().collect();
        for vertex in vm.vertices() {
            let touches = occupied.contains(&vertex.id)
                || vertex.neighbors.iter().any(|n| occupied.contains(n));
            prop_assert_eq!(vm.is_legal_settlement_placement(vertex.id, &state), !touches);
        }
        for a in &occupied {
            for b in vm.adjacent_vertices(*a).unwrap() {
                prop_assert!(!occupied.contains(b), "{} and {} are both settled", a, b);
            }
        }
    }
}
