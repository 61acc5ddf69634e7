//! The replay loop: applies scripted host events to the farming context and
//! advances logical ticks, paced in real time.
//!
//! Each iteration applies every event stamped with the current tick, then
//! advances the clock (firing any due replant or growth actions), then
//! sleeps for the configured interval. Profiles are saved when an actor
//! quits, every `autosave_interval_ticks`, and once more when the loop ends.

use std::future::Future;
use std::time::Duration;

use furrow_core::context::{BreakOutcome, FarmingContext, PlaceOutcome};
use furrow_core::storage::ProfileStore;
use furrow_types::BlockKind;
use furrow_world::{InMemoryWorld, WorldAccess};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::script::{ReplayScript, ScriptAction, ScriptEvent};

/// Counters describing a finished replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Ticks advanced.
    pub ticks: u64,
    /// Script events applied.
    pub events: usize,
    /// Rewarded harvests.
    pub harvests: usize,
    /// Placements or breaks the farming rules cancelled.
    pub denied: usize,
    /// Scheduled actions that changed the world.
    pub applied: usize,
    /// Scheduled actions dropped after revalidation.
    pub abstained: usize,
    /// Successful profile saves.
    pub saves: usize,
    /// Failed profile saves.
    pub save_failures: usize,
    /// Whether the replay was stopped before its last tick.
    pub interrupted: bool,
}

/// Build the starting world from the script's seeded soil.
pub fn seed_world(script: &ReplayScript) -> InMemoryWorld {
    let mut world = InMemoryWorld::new();
    for &pos in &script.soil {
        world.place(pos, BlockKind::FARMLAND);
    }
    for &pos in &script.soul_sand {
        world.place(pos, BlockKind::SOUL_SAND);
    }
    world
}

/// Run `script` to completion or until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`EngineError::Clock`] if the tick counter overflows.
pub async fn run_replay<S, F>(
    ctx: &mut FarmingContext,
    world: &mut InMemoryWorld,
    script: &ReplayScript,
    store: &S,
    autosave_interval_ticks: u64,
    shutdown: F,
) -> Result<ReplaySummary, EngineError>
where
    S: ProfileStore + ?Sized,
    F: Future<Output = ()>,
{
    let mut summary = ReplaySummary::default();
    let interval = Duration::from_millis(script.tick_interval_ms);
    let last_tick = script.last_tick();
    let mut events = script.events.iter().peekable();
    tokio::pin!(shutdown);

    info!(
        last_tick,
        events = script.events.len(),
        tick_interval_ms = script.tick_interval_ms,
        "Replay starting"
    );

    loop {
        let now = ctx.current_tick();
        while let Some(event) = events.next_if(|e| e.tick <= now) {
            apply_event(ctx, world, store, event, &mut summary);
        }

        if now >= last_tick {
            break;
        }

        let report = ctx.advance_tick(world)?;
        summary.ticks = summary.ticks.saturating_add(1);
        summary.applied = summary.applied.saturating_add(report.applied);
        summary.abstained = summary.abstained.saturating_add(report.abstained);

        if report.tick.checked_rem(autosave_interval_ticks) == Some(0) {
            debug!(tick = report.tick, "Autosave");
            record_save(ctx, store, &mut summary);
        }

        tokio::select! {
            biased;
            () = &mut shutdown => {
                warn!(tick = report.tick, "Shutdown requested, stopping replay");
                summary.interrupted = true;
                break;
            }
            () = tokio::time::sleep(interval) => {}
        }
    }

    record_save(ctx, store, &mut summary);
    info!(
        ticks = summary.ticks,
        events = summary.events,
        harvests = summary.harvests,
        denied = summary.denied,
        applied = summary.applied,
        abstained = summary.abstained,
        pending = ctx.pending_actions(),
        "Replay finished"
    );
    Ok(summary)
}

fn apply_event<S>(
    ctx: &mut FarmingContext,
    world: &mut InMemoryWorld,
    store: &S,
    event: &ScriptEvent,
    summary: &mut ReplaySummary,
) where
    S: ProfileStore + ?Sized,
{
    summary.events = summary.events.saturating_add(1);
    match &event.action {
        ScriptAction::Join { actor, name } => ctx.on_join(*actor, name),
        ScriptAction::Quit { actor, name } => {
            if ctx.on_quit(*actor, name) {
                record_save(ctx, store, summary);
            }
        }
        ScriptAction::Place {
            actor,
            name,
            pos,
            block,
        } => {
            world.place(*pos, block.clone());
            match ctx.on_block_place(*actor, name, *pos, block, &*world) {
                PlaceOutcome::Denied {
                    required_level,
                    current_level,
                } => {
                    info!(
                        %actor,
                        name = %name,
                        crop = %block,
                        required_level,
                        current_level,
                        "Planting cancelled: level too low"
                    );
                    world.remove(*pos);
                    summary.denied = summary.denied.saturating_add(1);
                }
                PlaceOutcome::Planted { .. } | PlaceOutcome::Ignored => {}
            }
        }
        ScriptAction::Break {
            actor,
            name,
            pos,
            tool,
        } => match ctx.on_block_break(*actor, name, *pos, tool, &*world) {
            BreakOutcome::Denied => {
                info!(%actor, name = %name, %pos, %tool, "Break cancelled: crop is not ready");
                summary.denied = summary.denied.saturating_add(1);
            }
            BreakOutcome::Harvested(harvest) => {
                let percent = harvest.progress.percent();
                info!(
                    %actor,
                    name = %name,
                    crop = %harvest.crop,
                    xp = harvest.xp_awarded,
                    level = harvest.level_after,
                    %percent,
                    replant = harvest.replant.is_some(),
                    "Harvest"
                );
                world.remove(*pos);
                summary.harvests = summary.harvests.saturating_add(1);
            }
            BreakOutcome::ClearedImmature | BreakOutcome::Ignored => {
                world.remove(*pos);
            }
        },
        ScriptAction::Grow { pos, age } => world.set_maturity(*pos, *age),
        ScriptAction::Set { pos, block } => world.set_block(*pos, block.clone(), 0),
    }
}

fn record_save<S>(ctx: &FarmingContext, store: &S, summary: &mut ReplaySummary)
where
    S: ProfileStore + ?Sized,
{
    if ctx.save(store).is_ok() {
        summary.saves = summary.saves.saturating_add(1);
    } else {
        summary.save_failures = summary.save_failures.saturating_add(1);
    }
}

/// Log the top `limit` actors.
pub fn log_leaderboard(ctx: &FarmingContext, limit: usize) {
    let top = ctx.leaderboard(limit);
    if top.is_empty() {
        info!("Leaderboard is empty");
        return;
    }
    for entry in top {
        let percent = entry.profile.progress(ctx.curve()).percent();
        info!(
            rank = entry.rank,
            name = entry.profile.display_name(),
            actor = %entry.actor_id,
            level = entry.level,
            xp = entry.profile.xp(),
            %percent,
            "Leaderboard"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use furrow_core::config::{FarmingConfig, LevelsConfig};
    use furrow_core::storage::YamlProfileStore;
    use furrow_types::{ActorId, BlockPos};
    use uuid::Uuid;

    use super::*;

    const FARMING: &str = r"
auto_refarm:
  delay_ticks: 10
crop_xp:
  wheat: 100
unlock_levels:
  beetroots: 3
";

    fn scratch_store() -> (YamlProfileStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("furrow-replay-{}", Uuid::now_v7().simple()));
        (YamlProfileStore::new(dir.join("players.yaml")), dir)
    }

    fn context() -> FarmingContext {
        FarmingContext::from_config(
            &FarmingConfig::parse(FARMING).unwrap(),
            &LevelsConfig::default(),
        )
    }

    fn script(actor: ActorId) -> ReplayScript {
        let yaml = format!(
            r"
run_ticks: 30
soil:
  - {{ x: 0, y: 63, z: 0 }}
events:
  - {{ tick: 0, event: join, actor: {actor}, name: Steve }}
  - {{ tick: 1, event: place, actor: {actor}, name: Steve, pos: {{ x: 0, y: 64, z: 0 }}, block: wheat }}
  - {{ tick: 2, event: break, actor: {actor}, name: Steve, pos: {{ x: 0, y: 64, z: 0 }} }}
  - {{ tick: 3, event: grow, pos: {{ x: 0, y: 64, z: 0 }}, age: 7 }}
  - {{ tick: 4, event: break, actor: {actor}, name: Steve, pos: {{ x: 0, y: 64, z: 0 }} }}
  - {{ tick: 5, event: place, actor: {actor}, name: Steve, pos: {{ x: 5, y: 64, z: 5 }}, block: beetroots }}
  - {{ tick: 20, event: quit, actor: {actor}, name: Steve }}
"
        );
        ReplayScript::parse(&yaml).unwrap()
    }

    #[tokio::test]
    async fn replays_harvest_and_replant() {
        let actor = ActorId::new();
        let script = script(actor);
        let (store, dir) = scratch_store();
        let mut ctx = context();
        let mut world = seed_world(&script);

        let summary = run_replay(
            &mut ctx,
            &mut world,
            &script,
            &store,
            0,
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(summary.ticks, 30);
        assert_eq!(summary.events, 7);
        assert_eq!(summary.harvests, 1);
        // Immature break with bare hands, then beetroots below level 3.
        assert_eq!(summary.denied, 2);
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.saves, 2);
        assert!(!summary.interrupted);

        assert_eq!(world.block_at(BlockPos::new(0, 64, 0)), BlockKind::WHEAT);
        assert!(world.block_at(BlockPos::new(5, 64, 5)).is_air());
        assert_eq!(ctx.current_level(actor), 1);
        assert_eq!(store.load().unwrap().len(), 1);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn shutdown_stops_early_and_still_saves() {
        let actor = ActorId::new();
        let script = script(actor);
        let (store, dir) = scratch_store();
        let mut ctx = context();
        let mut world = seed_world(&script);

        let summary = run_replay(&mut ctx, &mut world, &script, &store, 0, async {})
            .await
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.ticks, 1);
        assert_eq!(summary.saves, 1);
        assert_eq!(store.load().unwrap().len(), 1);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn autosave_runs_on_interval() {
        let script = ReplayScript::parse("run_ticks: 25\n").unwrap();
        let (store, dir) = scratch_store();
        let mut ctx = context();
        let mut world = seed_world(&script);

        let summary = run_replay(
            &mut ctx,
            &mut world,
            &script,
            &store,
            10,
            std::future::pending(),
        )
        .await
        .unwrap();

        // Ticks 10 and 20, plus the final save.
        assert_eq!(summary.saves, 3);
        std::fs::remove_dir_all(dir).ok();
    }
}
