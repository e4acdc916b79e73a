//! Output formats for the advisor.

use serde::Serialize;
use settler_core::{
    BoardJson, GameState, Phase, PlayerId, Recommendation, SettlementRecommender, StrategyAdvice,
    StrategyProfile,
};

/// Everything the advisor prints in JSON mode
#[derive(Debug, Clone, Serialize)]
pub struct AdvisorReport<'a> {
    pub strategy: &'a StrategyProfile,
    pub player: PlayerId,
    pub phase: Phase,
    pub board: BoardJson,
    pub recommendations: &'a [Recommendation],
    pub board_advice: &'a StrategyAdvice,
}

/// Human-readable report: recommendations followed by board-level advice
pub fn render_text(
    recommender: &SettlementRecommender<'_>,
    recommendations: &[Recommendation],
    strategy: &StrategyProfile,
    state: &GameState,
    advice: &StrategyAdvice,
) -> String {
    let mut out = recommender.summary_report(recommendations, strategy, state);
    out.push_str("\n\nBoard Analysis:\n");
    out.push_str(&"-".repeat(30));
    out.push_str(&format!(
        "\nSuggested strategy: {}\n{}\n",
        advice.strategy, advice.explanation
    ));
    out
}
