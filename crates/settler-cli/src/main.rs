//! Settler command-line advisor.

use anyhow::Context;
use settler_core::{Board, BoardAnalyzer, SettlementRecommender, VertexManager};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod report;

use config::{CliConfig, OutputFormat};
use report::AdvisorReport;

fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so stdout stays clean for reports)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CliConfig::from_env()?;

    info!(
        seed = config.board.seed,
        layout = ?config.board.layout,
        "Building board"
    );
    let board = Board::create_standard(&config.board).context("failed to build the board")?;
    let vertices = VertexManager::new(&board);

    let state = config.load_state()?;
    state
        .validate_placements(&vertices)
        .context("saved game state does not fit this board")?;
    let strategy = config.load_strategy()?;

    let recommender = SettlementRecommender::new(&board, &vertices);
    let recommendations = recommender
        .recommend_settlements(&state, &strategy, config.player, config.top_k, None)
        .with_context(|| format!("no recommendation for player {}", config.player))?;
    let advice = BoardAnalyzer::new(&board, &vertices).recommend_strategy();

    info!(
        strategy = %strategy.name,
        player = config.player,
        returned = recommendations.len(),
        "Ranked settlement spots"
    );

    match config.format {
        OutputFormat::Text => {
            println!(
                "{}",
                report::render_text(&recommender, &recommendations, &strategy, &state, &advice)
            );
        }
        OutputFormat::Json => {
            let report = AdvisorReport {
                strategy: &strategy,
                player: config.player,
                phase: state.phase(),
                board: board.to_json_friendly(),
                recommendations: &recommendations,
                board_advice: &advice,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
