//! Ranked settlement recommendations.
//!
//! The recommender scores every legal vertex, ranks them, and explains each
//! pick in a short sentence built from its strongest factors.

use crate::board::{Board, Harbor};
use crate::error::{AdvisorError, Result};
use crate::scoring::{ScoreBreakdown, SettlementScorer};
use crate::state::{GameState, PlayerId};
use crate::strategy::{Factor, StrategyProfile};
use crate::vertices::{VertexId, VertexManager};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Recommendations shown in the summary report
const REPORT_LIMIT: usize = 5;

/// Blocking sub-score worth mentioning
const BLOCKING_NOTE_THRESHOLD: f64 = 3.0;

/// Total above which an otherwise unremarkable vertex is still "solid"
const SOLID_TOTAL_THRESHOLD: f64 = 10.0;

/// A ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// 1 for the best candidate; 0 when analysed outside a ranking
    pub rank: usize,
    pub vertex_id: VertexId,
    pub total_score: f64,
    pub breakdown: ScoreBreakdown,
    pub justification: String,
}

/// Ranks legal vertices for one board
#[derive(Debug, Clone, Copy)]
pub struct SettlementRecommender<'a> {
    board: &'a Board,
    vertices: &'a VertexManager,
    scorer: SettlementScorer<'a>,
}

impl<'a> SettlementRecommender<'a> {
    pub fn new(board: &'a Board, vertices: &'a VertexManager) -> Self {
        Self {
            board,
            vertices,
            scorer: SettlementScorer::new(board, vertices),
        }
    }

    /// The best `top_k` legal vertices for `player`, best first.
    ///
    /// Equal totals are ordered by lower vertex id. Fails with
    /// [`AdvisorError::EmptyBoard`] when no vertex is legal.
    pub fn recommend_settlements(
        &self,
        state: &GameState,
        strategy: &StrategyProfile,
        player: PlayerId,
        top_k: usize,
        settlement_number: Option<u32>,
    ) -> Result<Vec<Recommendation>> {
        let legal = self.vertices.legal_vertices(state);
        if legal.is_empty() {
            return Err(AdvisorError::EmptyBoard);
        }

        let mut scored = legal
            .iter()
            .map(|&v| self.scorer.score(v, state, strategy, player, settlement_number))
            .collect::<Result<Vec<_>>>()?;
        scored.sort_by(compare_scored);

        debug!(
            strategy = %strategy.name,
            player,
            legal = legal.len(),
            top_k,
            "ranked settlement candidates"
        );

        scored
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(i, breakdown)| self.recommendation(i + 1, breakdown, strategy))
            .collect()
    }

    /// Score and explain a single vertex without ranking it
    pub fn analyze_placement(
        &self,
        vertex: VertexId,
        state: &GameState,
        strategy: &StrategyProfile,
        player: PlayerId,
        settlement_number: Option<u32>,
    ) -> Result<Recommendation> {
        let breakdown = self
            .scorer
            .score(vertex, state, strategy, player, settlement_number)?;
        self.recommendation(0, breakdown, strategy)
    }

    /// How each built-in profile scores one vertex
    pub fn analyze_vertex(
        &self,
        vertex: VertexId,
        state: &GameState,
        player: PlayerId,
    ) -> Result<Vec<(String, ScoreBreakdown)>> {
        StrategyProfile::all_builtin()
            .into_iter()
            .map(|profile| {
                let breakdown = self.scorer.score(vertex, state, &profile, player, None)?;
                Ok((profile.name, breakdown))
            })
            .collect()
    }

    fn recommendation(
        &self,
        rank: usize,
        breakdown: ScoreBreakdown,
        strategy: &StrategyProfile,
    ) -> Result<Recommendation> {
        let justification = self.justification(&breakdown, strategy)?;
        Ok(Recommendation {
            rank,
            vertex_id: breakdown.vertex,
            total_score: breakdown.total,
            breakdown,
            justification,
        })
    }

    /// One-line explanation of a score
    pub fn justification(
        &self,
        breakdown: &ScoreBreakdown,
        strategy: &StrategyProfile,
    ) -> Result<String> {
        let info = self.vertices.vertex_info(self.board, breakdown.vertex)?;
        let n = breakdown.settlement_number;
        let focus = match n {
            0 | 1 => "Focus on production and diversity",
            2 => "Complement existing resources",
            _ => "Advanced strategy",
        };
        let mut notes = vec![format!("{} settlement: {}", ordinal(n.max(1)), focus)];

        let mut contributions: Vec<(Factor, f64)> = Factor::ALL
            .iter()
            .map(|&f| (f, breakdown.contribution(f, strategy)))
            .filter(|(_, c)| *c > 0.0)
            .collect();
        contributions.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        if !contributions.is_empty() {
            let top: Vec<String> = contributions
                .iter()
                .take(2)
                .map(|(f, c)| format!("{} (+{:.1})", f, c))
                .collect();
            notes.push(format!("Strongest factors: {}", top.join(", ")));
        }

        match info.resource_pips.len() {
            0 | 1 => {}
            2 => notes.push("Good resource diversity".to_string()),
            _ => notes.push("Excellent resource diversity".to_string()),
        }

        let high: Vec<String> = info
            .numbers
            .iter()
            .filter(|n| matches!(**n, 6 | 8))
            .map(u8::to_string)
            .collect();
        if !high.is_empty() {
            notes.push(format!("High-probability numbers: {}", high.join(", ")));
        }
        if high.len() >= 2 {
            notes.push("High robber risk (multiple 6s/8s)".to_string());
        }

        if breakdown.subscore(Factor::Blocking) >= BLOCKING_NOTE_THRESHOLD {
            notes.push("Good blocking position".to_string());
        }

        match info.harbor {
            Some(Harbor::Generic) => notes.push("3:1 harbor access".to_string()),
            Some(Harbor::Specific(resource)) => {
                notes.push(format!("2:1 {} harbor access", resource.name()))
            }
            None => {}
        }

        if notes.len() == 1 {
            notes.push(if breakdown.total > SOLID_TOTAL_THRESHOLD {
                "Solid overall placement".to_string()
            } else {
                "Limited strategic value".to_string()
            });
        }

        Ok(notes.join("; "))
    }

    /// Plain-text report of the leading recommendations
    pub fn summary_report(
        &self,
        recommendations: &[Recommendation],
        strategy: &StrategyProfile,
        state: &GameState,
    ) -> String {
        if recommendations.is_empty() {
            return "No recommendations available.".to_string();
        }

        let description = if strategy.description.is_empty() {
            "Custom strategy"
        } else {
            strategy.description.as_str()
        };
        let mut lines = vec![
            format!("Settlement Recommendations ({} strategy)", strategy.name),
            "=".repeat(60),
            String::new(),
            format!("Strategy: {}", description),
            format!("Board validated: {}", self.board.validate().is_ok()),
            format!("Total vertices analyzed: {}", self.vertices.vertex_count()),
            format!(
                "Legal placements found: {}",
                self.vertices.legal_vertices(state).len()
            ),
            String::new(),
            "Top Recommendations:".to_string(),
            "-".repeat(30),
        ];

        for rec in recommendations.iter().take(REPORT_LIMIT) {
            lines.push(format!("#{} - Vertex {}", rec.rank, rec.vertex_id));
            lines.push(format!("    Score: {:.1}", rec.total_score));
            lines.push(format!("    Why: {}", rec.justification));
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

/// Higher total first, then lower vertex id
fn compare_scored(a: &ScoreBreakdown, b: &ScoreBreakdown) -> Ordering {
    b.total.total_cmp(&a.total).then(a.vertex.cmp(&b.vertex))
}

/// 1st, 2nd, 3rd, 4th, ..., 11th, 12th, 13th, ..., 21st
fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
