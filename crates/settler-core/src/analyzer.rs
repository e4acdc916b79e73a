//! Board-level strategy advice.
//!
//! Looks at the whole board (production per resource, where the 6s and 8s
//! are, which harbors exist) and suggests which built-in strategy profile
//! suits it. All production figures are in pips.

use crate::board::{Board, Harbor, Resource};
use crate::vertices::VertexManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Production thresholds (pips) used by `recommend_strategy`
const ROAD_PRODUCTION_PIPS: u32 = 21;
const DEV_PRODUCTION_PIPS: u32 = 28;
const CITY_PRODUCTION_PIPS: u32 = 18;
const PRODUCTIVE_RESOURCE_PIPS: u32 = 10;

/// Production summary of one resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub tiles: u32,
    pub total_pips: u32,
    pub average_pips: f64,
    /// Any of its tiles carries a 6 or 8
    pub has_high_number: bool,
}

/// What the board offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardCharacteristics {
    pub resources: BTreeMap<Resource, ResourceSummary>,
    /// How many tiles carry each number
    pub number_counts: BTreeMap<u8, u32>,
    /// Resource of every 6/8 tile, in scan order
    pub high_number_resources: Vec<Resource>,
    pub generic_harbors: usize,
    /// Resources with a 2:1 harbor, in harbor order
    pub resource_harbors: Vec<Resource>,
    pub harbor_vertices: usize,
    pub total_vertices: usize,
}

impl BoardCharacteristics {
    pub fn pips(&self, resource: Resource) -> u32 {
        self.resources
            .get(&resource)
            .map(|s| s.total_pips)
            .unwrap_or(0)
    }

    fn has_harbor(&self, resource: Resource) -> bool {
        self.resource_harbors.contains(&resource)
    }
}

/// Suggested profile and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAdvice {
    /// Name of a built-in profile
    pub strategy: String,
    pub explanation: String,
    /// Points each built-in profile collected
    pub scores: BTreeMap<String, u32>,
    pub characteristics: BoardCharacteristics,
}

pub struct BoardAnalyzer<'a> {
    board: &'a Board,
    vertices: &'a VertexManager,
}

impl<'a> BoardAnalyzer<'a> {
    pub fn new(board: &'a Board, vertices: &'a VertexManager) -> Self {
        Self { board, vertices }
    }

    pub fn characteristics(&self) -> BoardCharacteristics {
        let mut resources: BTreeMap<Resource, ResourceSummary> = BTreeMap::new();
        let mut number_counts: BTreeMap<u8, u32> = BTreeMap::new();
        let mut high_number_resources = Vec::new();

        for tile in self.board.all_tiles() {
            if let Some(number) = tile.dice_number {
                *number_counts.entry(number).or_insert(0) += 1;
            }
            let Some(resource) = tile.resource() else {
                continue;
            };
            let summary = resources.entry(resource).or_insert(ResourceSummary {
                tiles: 0,
                total_pips: 0,
                average_pips: 0.0,
                has_high_number: false,
            });
            summary.tiles += 1;
            summary.total_pips += tile.pips();
            summary.has_high_number |= tile.is_high_probability();
            if tile.is_high_probability() {
                high_number_resources.push(resource);
            }
        }
        for summary in resources.values_mut() {
            summary.average_pips = f64::from(summary.total_pips) / f64::from(summary.tiles);
        }

        let mut generic_harbors = 0;
        let mut resource_harbors = Vec::new();
        for harbor in self.board.harbors() {
            match harbor.harbor_type {
                Harbor::Generic => generic_harbors += 1,
                Harbor::Specific(resource) => resource_harbors.push(resource),
            }
        }

        BoardCharacteristics {
            resources,
            number_counts,
            high_number_resources,
            generic_harbors,
            resource_harbors,
            harbor_vertices: self
                .vertices
                .vertices()
                .iter()
                .filter(|v| v.harbor.is_some())
                .count(),
            total_vertices: self.vertices.vertex_count(),
        }
    }

    /// Pick the built-in profile this board rewards most.
    ///
    /// Ties go to the profile listed first (balanced, road, development, city).
    pub fn recommend_strategy(&self) -> StrategyAdvice {
        use Resource::*;

        let c = self.characteristics();
        let mut road = 0;
        let mut dev = 0;
        let mut city = 0;
        let mut balanced = 0;

        if c.pips(Wood) + c.pips(Brick) > ROAD_PRODUCTION_PIPS {
            road += 30;
        }
        road += 15 * [Wood, Brick].iter().filter(|r| c.has_harbor(**r)).count() as u32;

        if c.pips(Ore) + c.pips(Wheat) + c.pips(Sheep) > DEV_PRODUCTION_PIPS {
            dev += 30;
        }
        dev += 10 * [Ore, Wheat, Sheep].iter().filter(|r| c.has_harbor(**r)).count() as u32;

        if c.pips(Ore) + c.pips(Wheat) > CITY_PRODUCTION_PIPS {
            city += 25;
        }
        if c.has_harbor(Ore) {
            city += 20;
        }
        if c.has_harbor(Wheat) {
            city += 15;
        }

        let productive = c
            .resources
            .values()
            .filter(|s| s.total_pips > PRODUCTIVE_RESOURCE_PIPS)
            .count() as u32;
        balanced += 8 * productive + 5 * c.generic_harbors as u32;

        for resource in &c.high_number_resources {
            match resource {
                Wood | Brick => road += 8,
                Ore | Wheat => city += 8,
                Sheep => dev += 6,
            }
        }

        let ranked = [
            ("balanced", balanced),
            ("road_focused", road),
            ("development_focused", dev),
            ("city_focused", city),
        ];
        let mut best = ranked[0];
        for candidate in &ranked[1..] {
            if candidate.1 > best.1 {
                best = *candidate;
            }
        }

        let explanation = match best.0 {
            "road_focused" => explain_road(&c),
            "development_focused" => explain_development(&c),
            "city_focused" => explain_city(&c),
            _ => explain_balanced(&c),
        };

        StrategyAdvice {
            strategy: best.0.to_string(),
            explanation,
            scores: ranked
                .iter()
                .map(|(name, points)| (name.to_string(), *points))
                .collect(),
            characteristics: c,
        }
    }
}

fn sentence(lead: &str, reasons: Vec<String>, fallback: &str) -> String {
    if reasons.is_empty() {
        format!("{} {}.", lead, fallback)
    } else {
        format!("{} {}.", lead, reasons.join(". "))
    }
}

fn harbor_names(c: &BoardCharacteristics, wanted: &[Resource]) -> Vec<&'static str> {
    c.resource_harbors
        .iter()
        .filter(|r| wanted.contains(*r))
        .map(|r| r.name())
        .collect()
}

fn explain_balanced(c: &BoardCharacteristics) -> String {
    let mut reasons = Vec::new();
    let good = c.resources.values().filter(|s| s.total_pips > 9).count();
    if good >= 4 {
        reasons.push(format!("Good diversity with {} productive resources", good));
    }
    if c.generic_harbors >= 2 {
        reasons.push(format!(
            "{} generic harbors provide trading flexibility",
            c.generic_harbors
        ));
    }
    if c.resources.values().all(|s| s.total_pips > 5) {
        reasons.push("All resources have decent production".to_string());
    }
    sentence(
        "This board rewards a balanced strategy.",
        reasons,
        "Even resource distribution favors flexible approach",
    )
}

fn explain_road(c: &BoardCharacteristics) -> String {
    let mut reasons = Vec::new();
    if c.pips(Resource::Wood) > 10 {
        reasons.push(format!("Excellent wood production ({} pips)", c.pips(Resource::Wood)));
    }
    if c.pips(Resource::Brick) > 9 {
        reasons.push(format!("Strong brick production ({} pips)", c.pips(Resource::Brick)));
    }
    let harbors = harbor_names(c, &[Resource::Wood, Resource::Brick]);
    if !harbors.is_empty() {
        reasons.push(format!("{} harbor(s) boost road building", harbors.join(", ")));
    }
    sentence(
        "This board favors road building strategy.",
        reasons,
        "Wood and brick availability supports road expansion",
    )
}

fn explain_development(c: &BoardCharacteristics) -> String {
    let mut reasons = Vec::new();
    if c.pips(Resource::Ore) > 9 {
        reasons.push(format!("Strong ore production ({} pips)", c.pips(Resource::Ore)));
    }
    if c.pips(Resource::Wheat) > 10 {
        reasons.push(format!("Excellent wheat production ({} pips)", c.pips(Resource::Wheat)));
    }
    if c.pips(Resource::Sheep) > 9 {
        reasons.push(format!("Good sheep production ({} pips)", c.pips(Resource::Sheep)));
    }
    let harbors = harbor_names(c, &[Resource::Ore, Resource::Wheat, Resource::Sheep]);
    if !harbors.is_empty() {
        reasons.push(format!(
            "{} harbor(s) support development cards",
            harbors.join(", ")
        ));
    }
    sentence(
        "This board supports development card strategy.",
        reasons,
        "Development card resources are well-positioned",
    )
}

fn explain_city(c: &BoardCharacteristics) -> String {
    let mut reasons = Vec::new();
    if c.pips(Resource::Ore) > 10 {
        reasons.push(format!("Excellent ore production ({} pips)", c.pips(Resource::Ore)));
    }
    if c.pips(Resource::Wheat) > 10 {
        reasons.push(format!("Strong wheat production ({} pips)", c.pips(Resource::Wheat)));
    }
    let harbors = harbor_names(c, &[Resource::Ore, Resource::Wheat]);
    if !harbors.is_empty() {
        reasons.push(format!(
            "{} harbor(s) facilitate city upgrades",
            harbors.join(", ")
        ));
    }
    sentence(
        "This board rewards city building strategy.",
        reasons,
        "Ore and wheat positioning favors city development",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardConfig, LayoutMode};
    use crate::scoring::tests::fixed_board;
    use crate::strategy::{StrategyProfile, BUILTIN_STRATEGIES};

    #[test]
    fn test_characteristics_of_standard_board() {
        let board = Board::create_standard(&BoardConfig::new(8, LayoutMode::Shuffled)).unwrap();
        let vm = VertexManager::new(&board);
        let c = BoardAnalyzer::new(&board, &vm).characteristics();

        let total: u32 = c.resources.values().map(|s| s.total_pips).sum();
        assert_eq!(total, 58, "standard tokens carry 58 pips");
        assert_eq!(c.number_counts.values().sum::<u32>(), 18);
        assert_eq!(c.number_counts.get(&7), None);
        assert_eq!(c.high_number_resources.len(), 4);
        assert_eq!(c.generic_harbors, 4);
        assert_eq!(c.resource_harbors.len(), 5);
        assert_eq!(c.harbor_vertices, 18);
        assert_eq!(c.total_vertices, 54);
        assert_eq!(c.resources[&Resource::Ore].tiles, 3);
    }

    #[test]
    fn test_fixed_board_favors_cities() {
        let board = fixed_board();
        let vm = VertexManager::new(&board);
        let advice = BoardAnalyzer::new(&board, &vm).recommend_strategy();

        assert_eq!(advice.characteristics.pips(Resource::Wheat), 19);
        assert_eq!(advice.scores["city_focused"], 92);
        assert_eq!(advice.scores["road_focused"], 60);
        assert_eq!(advice.scores["development_focused"], 60);
        assert_eq!(advice.scores["balanced"], 36);
        assert_eq!(advice.strategy, "city_focused");
        assert!(advice
            .explanation
            .starts_with("This board rewards city building strategy."));
        assert!(advice.explanation.contains("Strong wheat production (19 pips)"));
    }

    #[test]
    fn test_advice_names_a_builtin_profile() {
        for seed in 0..20 {
            let board =
                Board::create_standard(&BoardConfig::new(seed, LayoutMode::Shuffled)).unwrap();
            let vm = VertexManager::new(&board);
            let advice = BoardAnalyzer::new(&board, &vm).recommend_strategy();
            assert!(BUILTIN_STRATEGIES.contains(&advice.strategy.as_str()));
            assert!(StrategyProfile::builtin(&advice.strategy).is_some());
            assert_eq!(advice.scores.len(), 4);
        }
    }
}
