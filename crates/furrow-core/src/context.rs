//! The process-scoped farming context and its host event handlers.
//!
//! A single [`FarmingContext`] owns the level curve, crop catalog, profile
//! registry, lifecycle scheduler, and deferred-action queue. It is built
//! once at startup and driven from the host's update loop: every handler
//! and every tick runs on that one logical thread, so nothing here locks.
//!
//! Handlers translate host events into progression changes and scheduled
//! actions, and report what happened so the host can cancel the event or
//! notify the actor.

use furrow_progression::{LeaderboardEntry, LevelCurve, LevelProgress, ProfileRegistry};
use furrow_types::{ActorId, BlockKind, BlockPos, ToolKind};
use furrow_world::{CropCatalog, Maturity, WorldAccess};
use tracing::{debug, error, info};

use crate::clock::ClockError;
use crate::config::{FarmingConfig, LevelsConfig};
use crate::lifecycle::{CropLifecycleScheduler, FireOutcome, ScheduledAction};
use crate::queue::{ActionQueue, DeferredTasks};
use crate::storage::{ProfileStore, StorageError};

// ---------------------------------------------------------------------------
// Harvest rules
// ---------------------------------------------------------------------------

/// Tool and auto-refarm rules applied when a crop is broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestRules {
    /// Whether mature harvests are replanted.
    pub auto_refarm: bool,
    /// Skip replanting when the harvest used a harvesting tool.
    pub only_without_tool: bool,
    /// Suffix identifying harvesting tools.
    pub tool_suffix: String,
}

impl Default for HarvestRules {
    fn default() -> Self {
        Self {
            auto_refarm: true,
            only_without_tool: true,
            tool_suffix: "_hoe".to_owned(),
        }
    }
}

impl HarvestRules {
    /// Rules from the farming configuration.
    pub fn from_config(config: &FarmingConfig) -> Self {
        Self {
            auto_refarm: config.auto_refarm.enabled,
            only_without_tool: config.auto_refarm.only_when_not_using_hoe,
            tool_suffix: config.harvest_tool_suffix.clone(),
        }
    }

    /// Whether `tool` is a harvesting tool.
    pub fn is_harvest_tool(&self, tool: &ToolKind) -> bool {
        tool.has_suffix(&self.tool_suffix)
    }

    /// Whether a mature harvest made with `tool` is replanted.
    pub fn replants_after(&self, tool: &ToolKind) -> bool {
        self.auto_refarm && (!self.only_without_tool || !self.is_harvest_tool(tool))
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of [`FarmingContext::on_block_place`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// The block is not a tracked crop.
    Ignored,
    /// The actor's level is below the crop's unlock level; the host should
    /// cancel the placement.
    Denied {
        /// Level needed to plant this crop.
        required_level: u32,
        /// The actor's current level.
        current_level: u32,
    },
    /// The crop may be planted.
    Planted {
        /// Forced growth scheduled under the fixed growth policy.
        growth: Option<ScheduledAction>,
    },
}

/// Result of [`FarmingContext::on_block_break`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakOutcome {
    /// The block is not a tracked crop.
    Ignored,
    /// The crop is immature and the tool is not a harvesting tool; the host
    /// should cancel the break.
    Denied,
    /// An immature crop was cleared with a harvesting tool. No XP.
    ClearedImmature,
    /// A mature crop was harvested.
    Harvested(Harvest),
}

/// Details of a rewarded harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    /// The crop harvested.
    pub crop: BlockKind,
    /// XP awarded.
    pub xp_awarded: u32,
    /// Level before the award.
    pub level_before: u32,
    /// Level after the award.
    pub level_after: u32,
    /// Position within the new level.
    pub progress: LevelProgress,
    /// Replant scheduled by auto-refarm, if any.
    pub replant: Option<ScheduledAction>,
}

impl Harvest {
    /// Whether the award crossed at least one level boundary.
    pub const fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// What one call to [`FarmingContext::advance_tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The tick that was just entered.
    pub tick: u64,
    /// Actions that mutated the world.
    pub applied: usize,
    /// Actions dropped after revalidation.
    pub abstained: usize,
}

// ---------------------------------------------------------------------------
// FarmingContext
// ---------------------------------------------------------------------------

/// Everything the farming handlers need, owned in one place.
#[derive(Debug, Clone)]
pub struct FarmingContext {
    curve: LevelCurve,
    catalog: CropCatalog,
    registry: ProfileRegistry,
    lifecycle: CropLifecycleScheduler,
    rules: HarvestRules,
    queue: ActionQueue<ScheduledAction>,
}

impl FarmingContext {
    /// Assemble a context from its parts, with no profiles and nothing
    /// scheduled.
    pub fn new(
        curve: LevelCurve,
        catalog: CropCatalog,
        lifecycle: CropLifecycleScheduler,
        rules: HarvestRules,
    ) -> Self {
        Self {
            curve,
            catalog,
            registry: ProfileRegistry::new(),
            lifecycle,
            rules,
            queue: ActionQueue::new(),
        }
    }

    /// Build a context from both configuration documents.
    pub fn from_config(farming: &FarmingConfig, levels: &LevelsConfig) -> Self {
        let curve = levels.build_curve();
        let catalog = farming.crop_catalog();
        let lifecycle = CropLifecycleScheduler::new(
            farming.growth_policy(),
            farming.replant_delay_ticks(),
            farming.fixed_grow_ticks(),
        );
        info!(
            model = %curve.model(),
            ceiling = ?curve.ceiling(),
            crops = catalog.tracked_count(),
            policy = %lifecycle.policy(),
            "Farming context ready"
        );
        Self::new(curve, catalog, lifecycle, HarvestRules::from_config(farming))
    }

    // -- Accessors ----------------------------------------------------------

    /// The active level curve.
    pub const fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    /// The crop catalog.
    pub const fn catalog(&self) -> &CropCatalog {
        &self.catalog
    }

    /// The profile registry.
    pub const fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// The lifecycle scheduler settings.
    pub const fn lifecycle(&self) -> &CropLifecycleScheduler {
        &self.lifecycle
    }

    /// Harvest and auto-refarm rules.
    pub const fn rules(&self) -> &HarvestRules {
        &self.rules
    }

    /// The current logical tick.
    pub fn current_tick(&self) -> u64 {
        self.queue.current_tick()
    }

    /// Number of scheduled actions not yet fired.
    pub fn pending_actions(&self) -> usize {
        self.queue.len()
    }

    // -- Host events --------------------------------------------------------

    /// An actor connected.
    pub fn on_join(&mut self, actor: ActorId, name: &str) {
        let profile = self.registry.get_or_create(actor);
        profile.refresh_display_name(name);
        info!(%actor, name, level = profile.current_level(&self.curve), "Actor joined");
    }

    /// An actor disconnected. Their profile stays cached.
    ///
    /// Returns `true`: a disconnect is always a point at which profiles
    /// should be saved.
    pub fn on_quit(&mut self, actor: ActorId, name: &str) -> bool {
        self.registry.get_or_create(actor).refresh_display_name(name);
        debug!(%actor, name, "Actor left");
        true
    }

    /// An actor placed `kind` at `pos`.
    pub fn on_block_place<W>(
        &mut self,
        actor: ActorId,
        name: &str,
        pos: BlockPos,
        kind: &BlockKind,
        world: &W,
    ) -> PlaceOutcome
    where
        W: WorldAccess + ?Sized,
    {
        if !self.catalog.is_tracked(kind) {
            return PlaceOutcome::Ignored;
        }

        let profile = self.registry.get_or_create(actor);
        profile.refresh_display_name(name);
        let level = profile.current_level(&self.curve);
        let required = self.catalog.rule(kind).unlock_level;
        if level < required {
            debug!(%actor, crop = %kind, level, required, "Planting denied");
            return PlaceOutcome::Denied {
                required_level: required,
                current_level: level,
            };
        }

        let growth = self.lifecycle.on_planted(&mut self.queue, world, pos, kind);
        PlaceOutcome::Planted { growth }
    }

    /// An actor is breaking the block at `pos` while holding `tool`.
    ///
    /// Must be called before the host removes the block, since the crop
    /// kind and maturity are read from `world`.
    pub fn on_block_break<W>(
        &mut self,
        actor: ActorId,
        name: &str,
        pos: BlockPos,
        tool: &ToolKind,
        world: &W,
    ) -> BreakOutcome
    where
        W: WorldAccess + ?Sized,
    {
        let crop = world.block_at(pos);
        if !self.catalog.is_tracked(&crop) {
            return BreakOutcome::Ignored;
        }

        let profile = self.registry.get_or_create(actor);
        profile.refresh_display_name(name);

        let mature = world.maturity_at(pos).is_none_or(Maturity::is_mature);
        if !mature {
            if self.rules.is_harvest_tool(tool) {
                return BreakOutcome::ClearedImmature;
            }
            debug!(%actor, crop = %crop, %tool, "Immature break denied");
            return BreakOutcome::Denied;
        }

        let xp_awarded = self.catalog.rule(&crop).xp_reward;
        let level_before = profile.current_level(&self.curve);
        let total = profile.add_xp(i64::from(xp_awarded));
        let level_after = profile.current_level(&self.curve);
        let progress = profile.progress(&self.curve);
        if level_after > level_before {
            info!(%actor, name, level = level_after, xp = total, "Farming level up");
        }

        let replant = self
            .rules
            .replants_after(tool)
            .then(|| self.lifecycle.schedule_replant(&mut self.queue, pos, crop.clone()));

        BreakOutcome::Harvested(Harvest {
            crop,
            xp_awarded,
            level_before,
            level_after,
            progress,
            replant,
        })
    }

    /// Advance one tick and fire every action that has come due.
    ///
    /// Actions fire in deadline order, then in the order they were
    /// scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the clock cannot advance.
    pub fn advance_tick<W>(&mut self, world: &mut W) -> Result<TickReport, ClockError>
    where
        W: WorldAccess + ?Sized,
    {
        let tick = self.queue.advance()?;
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };
        while let Some(pending) = self.queue.pop_due() {
            match self.lifecycle.fire(&mut self.queue, world, &pending.task) {
                FireOutcome::Applied { .. } => report.applied = report.applied.saturating_add(1),
                FireOutcome::Abstained(_) => {
                    report.abstained = report.abstained.saturating_add(1);
                }
            }
        }
        Ok(report)
    }

    // -- Queries ------------------------------------------------------------

    /// Level of `actor`; 0 if the actor has never been seen.
    pub fn current_level(&self, actor: ActorId) -> u32 {
        self.registry.current_level(actor, &self.curve)
    }

    /// Progress of `actor` through their current level.
    pub fn progress(&self, actor: ActorId) -> Option<LevelProgress> {
        self.registry
            .get(actor)
            .map(|profile| profile.progress(&self.curve))
    }

    /// The top `limit` actors by level, then XP.
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry<'_>> {
        self.registry.top_n(limit, &self.curve)
    }

    /// The actor at 1-based `position` on the leaderboard.
    pub fn ranked_at(&self, position: usize) -> Option<LeaderboardEntry<'_>> {
        self.registry.ranked_at(position, &self.curve)
    }

    // -- Persistence --------------------------------------------------------

    /// Hydrate profiles from `store`.
    ///
    /// On failure the error is logged and current profiles are kept.
    pub fn load<S>(&mut self, store: &S) -> Result<usize, StorageError>
    where
        S: ProfileStore + ?Sized,
    {
        match store.load() {
            Ok(records) => {
                let loaded = self.registry.load_all(records);
                info!(profiles = loaded, "Loaded farming profiles");
                Ok(loaded)
            }
            Err(err) => {
                error!(error = %err, "Failed to load farming profiles");
                Err(err)
            }
        }
    }

    /// Write every profile to `store`.
    ///
    /// On failure the error is logged; in-memory profiles are untouched.
    pub fn save<S>(&self, store: &S) -> Result<usize, StorageError>
    where
        S: ProfileStore + ?Sized,
    {
        let records = self.registry.snapshot_all();
        match store.save(&records) {
            Ok(()) => {
                debug!(profiles = records.len(), "Saved farming profiles");
                Ok(records.len())
            }
            Err(err) => {
                error!(error = %err, profiles = records.len(), "Failed to save farming profiles");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::collections::BTreeMap;

    use furrow_types::GrowthPolicy;
    use furrow_world::InMemoryWorld;

    use super::*;

    const POS: BlockPos = BlockPos::new(0, 64, 0);

    fn context(policy: GrowthPolicy) -> FarmingContext {
        FarmingContext::new(
            LevelCurve::flat(100),
            CropCatalog::from_tables(
                BTreeMap::from([(BlockKind::WHEAT, 60), (BlockKind::new("melon"), 10)]),
                BTreeMap::from([(BlockKind::BEETROOTS, 2)]),
            ),
            CropLifecycleScheduler::new(policy, 20, 50),
            HarvestRules::default(),
        )
    }

    fn farm_with(kind: BlockKind, age: u8) -> InMemoryWorld {
        let mut world = InMemoryWorld::new();
        world.place(POS.below(), BlockKind::FARMLAND);
        world.set_block(POS, kind, age);
        world
    }

    #[test]
    fn harvest_rules_gate_replanting() {
        let rules = HarvestRules::default();
        assert!(rules.replants_after(&ToolKind::new("air")));
        assert!(!rules.replants_after(&ToolKind::new("iron_hoe")));

        let any_tool = HarvestRules {
            only_without_tool: false,
            ..HarvestRules::default()
        };
        assert!(any_tool.replants_after(&ToolKind::new("iron_hoe")));

        let disabled = HarvestRules {
            auto_refarm: false,
            ..HarvestRules::default()
        };
        assert!(!disabled.replants_after(&ToolKind::new("stick")));
    }

    #[test]
    fn untracked_blocks_are_ignored_without_creating_profiles() {
        let mut ctx = context(GrowthPolicy::Vanilla);
        let world = farm_with(BlockKind::CARROTS, 7);
        let actor = ActorId::new();

        let placed = ctx.on_block_place(actor, "A", POS, &BlockKind::CARROTS, &world);
        let broken = ctx.on_block_break(actor, "A", POS, &ToolKind::new("air"), &world);
        assert_eq!(placed, PlaceOutcome::Ignored);
        assert_eq!(broken, BreakOutcome::Ignored);
        assert!(ctx.registry().is_empty());
    }

    #[test]
    fn join_and_quit_refresh_name() {
        let mut ctx = context(GrowthPolicy::Vanilla);
        let actor = ActorId::new();
        ctx.on_join(actor, "Steve");
        assert!(ctx.on_quit(actor, "Steve2"));
        assert_eq!(ctx.registry().get(actor).unwrap().display_name(), "Steve2");
        assert_eq!(ctx.current_level(actor), 0);
    }

    #[test]
    fn immature_break_needs_harvest_tool() {
        let mut ctx = context(GrowthPolicy::Vanilla);
        let world = farm_with(BlockKind::WHEAT, 3);
        let actor = ActorId::new();

        let bare = ctx.on_block_break(actor, "A", POS, &ToolKind::new("air"), &world);
        let hoe = ctx.on_block_break(actor, "A", POS, &ToolKind::new("stone_hoe"), &world);
        assert_eq!(bare, BreakOutcome::Denied);
        assert_eq!(hoe, BreakOutcome::ClearedImmature);
        assert_eq!(ctx.registry().get(actor).unwrap().xp(), 0);
        assert_eq!(ctx.pending_actions(), 0);
    }

    #[test]
    fn mature_harvest_awards_xp_and_levels_up() {
        let mut ctx = context(GrowthPolicy::Vanilla);
        let world = farm_with(BlockKind::WHEAT, 7);
        let actor = ActorId::new();

        let BreakOutcome::Harvested(first) =
            ctx.on_block_break(actor, "A", POS, &ToolKind::new("air"), &world)
        else {
            panic!("mature wheat should be harvested");
        };
        assert_eq!(first.xp_awarded, 60);
        assert!(!first.leveled_up());
        assert_eq!(first.progress.xp_into_level, 60);
        assert!(first.replant.is_some());

        let BreakOutcome::Harvested(second) =
            ctx.on_block_break(actor, "A", POS, &ToolKind::new("golden_hoe"), &world)
        else {
            panic!("mature wheat should be harvested");
        };
        assert!(second.leveled_up());
        assert_eq!(second.level_after, 1);
        assert!(second.replant.is_none());
    }

    #[test]
    fn non_ageable_tracked_block_counts_as_mature() {
        let mut ctx = context(GrowthPolicy::Vanilla);
        let world = farm_with(BlockKind::new("melon"), 0);
        let outcome = ctx.on_block_break(ActorId::new(), "A", POS, &ToolKind::new("air"), &world);
        assert!(matches!(outcome, BreakOutcome::Harvested(h) if h.xp_awarded == 10));
    }

    #[test]
    fn fixed_policy_schedules_growth_on_plant() {
        let mut ctx = context(GrowthPolicy::Fixed);
        let mut world = farm_with(BlockKind::WHEAT, 0);

        let outcome = ctx.on_block_place(ActorId::new(), "A", POS, &BlockKind::WHEAT, &world);
        let PlaceOutcome::Planted { growth: Some(growth) } = outcome else {
            panic!("expected growth to be scheduled");
        };
        assert_eq!(growth.fire_after_ticks, 50);

        for _ in 0..49 {
            ctx.advance_tick(&mut world).unwrap();
        }
        assert!(!world.maturity_at(POS).unwrap().is_mature());
        let report = ctx.advance_tick(&mut world).unwrap();
        assert_eq!(report.tick, 50);
        assert_eq!(report.applied, 1);
        assert!(world.maturity_at(POS).unwrap().is_mature());
    }

    #[test]
    fn progress_and_leaderboard_queries() {
        let mut ctx = context(GrowthPolicy::Vanilla);
        let world = farm_with(BlockKind::WHEAT, 7);
        let busy = ActorId::new();
        let idle = ActorId::new();
        ctx.on_join(idle, "Idle");
        for _ in 0..4 {
            ctx.on_block_break(busy, "Busy", POS, &ToolKind::new("air"), &world);
        }

        assert_eq!(ctx.current_level(busy), 2);
        assert_eq!(ctx.progress(busy).unwrap().xp_into_level, 40);
        assert!(ctx.progress(ActorId::new()).is_none());
        assert_eq!(ctx.leaderboard(10).len(), 2);
        assert_eq!(ctx.ranked_at(1).unwrap().actor_id, busy);
        assert_eq!(ctx.ranked_at(2).unwrap().actor_id, idle);
    }
}
