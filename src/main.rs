//! Skillfive - command-line entry point
//!
//! Runs the game server or an AI self-play game.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Command};
use rand::SeedableRng;
use rand::rngs::StdRng;
use skillfive::{
    AppState, Difficulty, Match, MatchId, MatchMode, MatchService, MatchStore, MatchType,
    MemoryStore, Player, PlayerSlot, RoomRegistry, ServerConfig, SqliteStore, TurnResult,
    choose_move, router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,skillfive=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            host,
            database,
        } => serve(config, port, host, database).await,
        Command::Selfplay { difficulty, seed } => selfplay(difficulty, seed),
    }
}

/// Run the game server
#[instrument(skip_all)]
async fn serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
    database: Option<String>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(database) = database {
        config = config.with_database(database);
    }
    config.validate()?;

    let store: Arc<dyn MatchStore> = match config.database() {
        Some(path) => Arc::new(SqliteStore::open(path)?),
        None => {
            info!("No database configured, matches are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let registry = RoomRegistry::new(store, config.room_settings());
    let service = MatchService::new(registry, *config.ai_difficulty());
    let app = router(AppState::new(service, *config.subscriber_buffer()));

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(host = %config.host(), port = config.port(), "Server ready");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Play the AI against itself
#[instrument]
fn selfplay(difficulty: Difficulty, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let now = Utc::now();
    let mut game = Match::new(
        MatchId::generate(&mut rng),
        MatchMode::Regular,
        MatchType::LocalPvP,
        PlayerSlot::new("selfplay", Player::Black, vec![]),
        Some(PlayerSlot::new("selfplay", Player::White, vec![])),
        Some(difficulty),
        now,
    );

    let outcome = loop {
        let player = game.current_player;
        let blocked = game.blocked_cells_for(player, now);
        let Some(at) = choose_move(&game.board, player, difficulty, &blocked, &mut rng) else {
            break "draw (no legal moves)".to_string();
        };
        match game.submit_move(player, at.row as i32, at.col as i32, now)? {
            TurnResult::Continue => {}
            TurnResult::Won { winner, .. } => break format!("{} wins", winner),
            TurnResult::Draw => break "draw".to_string(),
        }
    };

    println!("{}", game.board.display());
    println!("{} after {} moves", outcome, game.move_log.len());
    Ok(())
}
