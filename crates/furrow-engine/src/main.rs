//! Replay host for the Furrow farming progression system.
//!
//! Stands in for a live game server: it loads configuration and saved
//! profiles, seeds an in-memory world, and replays a scripted stream of
//! join/quit/place/break events on a paced tick loop.
//!
//! # Startup Sequence
//!
//! 1. Load `farming.yaml` and `levels.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the farming context and load profiles
//! 4. Load the replay script (first argument, default `replay.yaml`)
//! 5. Run the replay until its last tick or Ctrl-C
//! 6. Save profiles and log the leaderboard

mod error;
mod replay;
mod script;

use std::path::{Path, PathBuf};

use furrow_core::config::{FarmingConfig, LevelsConfig};
use furrow_core::context::FarmingContext;
use furrow_core::storage::YamlProfileStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::script::ReplayScript;

/// Number of leaderboard rows logged at shutdown.
const LEADERBOARD_ROWS: usize = 10;

/// Application entry point for the replay host.
///
/// # Errors
///
/// Returns an error if configuration, saved profiles, or the replay script
/// cannot be loaded, or if the tick counter overflows.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let farming = load_or_default(Path::new("farming.yaml"), FarmingConfig::from_file)?;
    let levels = load_or_default(Path::new("levels.yaml"), LevelsConfig::from_file)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&farming.logging.level)),
        )
        .with_target(true)
        .init();

    info!("furrow-engine starting");

    // 3. Build the context and hydrate profiles.
    let mut ctx = FarmingContext::from_config(&farming, &levels);
    let store = YamlProfileStore::new(&farming.storage.players_file);
    ctx.load(&store)?;

    // 4. Load the replay script.
    let script_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("replay.yaml"), PathBuf::from);
    let script = load_or_default(&script_path, ReplayScript::from_file)?;
    let mut world = replay::seed_world(&script);
    info!(
        script = %script_path.display(),
        soil = script.soil.len(),
        events = script.events.len(),
        "Replay script loaded"
    );

    // 5. Run until done or interrupted.
    let summary = replay::run_replay(
        &mut ctx,
        &mut world,
        &script,
        &store,
        farming.storage.autosave_interval_ticks,
        shutdown_signal(),
    )
    .await?;

    // 6. Report.
    replay::log_leaderboard(&ctx, LEADERBOARD_ROWS);
    if summary.save_failures > 0 {
        warn!(failures = summary.save_failures, "Some profile saves failed");
    }
    info!(
        ticks = summary.ticks,
        interrupted = summary.interrupted,
        "furrow-engine shutdown complete"
    );

    Ok(())
}

/// Load a YAML document, or fall back to defaults if the file is absent.
fn load_or_default<T, E>(path: &Path, load: fn(&Path) -> Result<T, E>) -> Result<T, EngineError>
where
    T: Default,
    EngineError: From<E>,
{
    if path.exists() {
        Ok(load(path)?)
    } else {
        Ok(T::default())
    }
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Ctrl-C handler unavailable, replay will run to completion");
        std::future::pending::<()>().await;
    }
}
