//! Crop lifecycle scheduling: delayed replanting and fixed-duration growth.
//!
//! Both action kinds follow one pattern. The intent (position, crop, kind)
//! is captured when the triggering event happens and submitted to a
//! [`DeferredTasks`] facility. When the task fires, the world is queried
//! again and the action is applied only if the world still matches what
//! was expected; otherwise it is dropped. There is no retry and no explicit
//! cancellation.
//!
//! ```text
//! Pending --(delay elapses)--> Applied | Abstained
//! ```

use furrow_types::{BlockKind, BlockPos, GrowthPolicy, ScheduledActionKind};
use furrow_world::{WorldAccess, soil_supports};
use tracing::{debug, trace};

use crate::queue::DeferredTasks;

// ---------------------------------------------------------------------------
// ScheduledAction
// ---------------------------------------------------------------------------

/// Captured intent of a deferred world mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAction {
    /// Where the action applies.
    pub target: BlockPos,
    /// The crop the action concerns.
    pub crop: BlockKind,
    /// What to do when the action fires.
    pub kind: ScheduledActionKind,
    /// Ticks between scheduling and firing (at least 1).
    pub fire_after_ticks: u64,
    /// Tick at which the action was scheduled.
    pub issued_at_tick: u64,
}

/// Result of firing a scheduled action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// The world matched expectations and was mutated.
    Applied {
        /// Follow-up growth scheduled by a successful replant.
        follow_up: Option<ScheduledAction>,
    },
    /// The world changed during the delay; nothing was touched.
    Abstained(AbstainReason),
}

impl FireOutcome {
    /// Whether the action mutated the world.
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Why a fired action did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbstainReason {
    /// The block under the target no longer supports the crop.
    SoilChanged {
        /// What is under the target now.
        found: BlockKind,
    },
    /// Something already occupies the target.
    Occupied {
        /// What is at the target now.
        found: BlockKind,
    },
    /// The target no longer holds the crop that was planted.
    CropReplaced {
        /// What is at the target now.
        found: BlockKind,
    },
    /// The crop has no maturity progression.
    NotAgeable,
}

impl core::fmt::Display for AbstainReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SoilChanged { found } => write!(f, "soil is now {found}"),
            Self::Occupied { found } => write!(f, "target occupied by {found}"),
            Self::CropReplaced { found } => write!(f, "crop replaced by {found}"),
            Self::NotAgeable => f.write_str("crop does not age"),
        }
    }
}

// ---------------------------------------------------------------------------
// CropLifecycleScheduler
// ---------------------------------------------------------------------------

/// Issues and revalidates delayed replant and growth actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropLifecycleScheduler {
    policy: GrowthPolicy,
    replant_delay_ticks: u64,
    fixed_grow_ticks: u64,
}

impl CropLifecycleScheduler {
    /// Create a scheduler. Delays below 1 are raised to 1.
    pub fn new(policy: GrowthPolicy, replant_delay_ticks: u64, fixed_grow_ticks: u64) -> Self {
        Self {
            policy,
            replant_delay_ticks: replant_delay_ticks.max(1),
            fixed_grow_ticks: fixed_grow_ticks.max(1),
        }
    }

    /// Active growth policy.
    pub const fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Delay between harvest and replant.
    pub const fn replant_delay_ticks(&self) -> u64 {
        self.replant_delay_ticks
    }

    /// Delay between planting and forced maturity.
    pub const fn fixed_grow_ticks(&self) -> u64 {
        self.fixed_grow_ticks
    }

    /// Schedule a replant of `crop` at `target`.
    pub fn schedule_replant<Q>(
        &self,
        tasks: &mut Q,
        target: BlockPos,
        crop: BlockKind,
    ) -> ScheduledAction
    where
        Q: DeferredTasks<ScheduledAction> + ?Sized,
    {
        self.submit(
            tasks,
            target,
            crop,
            ScheduledActionKind::Replant,
            self.replant_delay_ticks,
        )
    }

    /// Schedule forced maturity of `crop` at `target`.
    ///
    /// Callers normally go through [`Self::on_planted`], which applies the
    /// policy and ageability checks first.
    pub fn schedule_fixed_growth<Q>(
        &self,
        tasks: &mut Q,
        target: BlockPos,
        crop: BlockKind,
    ) -> ScheduledAction
    where
        Q: DeferredTasks<ScheduledAction> + ?Sized,
    {
        self.submit(
            tasks,
            target,
            crop,
            ScheduledActionKind::MatureGrowth,
            self.fixed_grow_ticks,
        )
    }

    /// React to `crop` having been planted at `target`.
    ///
    /// Under [`GrowthPolicy::Fixed`], ageable crops get a growth action;
    /// otherwise nothing is scheduled.
    pub fn on_planted<Q, W>(
        &self,
        tasks: &mut Q,
        world: &W,
        target: BlockPos,
        crop: &BlockKind,
    ) -> Option<ScheduledAction>
    where
        Q: DeferredTasks<ScheduledAction> + ?Sized,
        W: WorldAccess + ?Sized,
    {
        if self.policy != GrowthPolicy::Fixed || !world.is_ageable(crop) {
            return None;
        }
        Some(self.schedule_fixed_growth(tasks, target, crop.clone()))
    }

    /// Revalidate and apply a due action.
    pub fn fire<Q, W>(&self, tasks: &mut Q, world: &mut W, action: &ScheduledAction) -> FireOutcome
    where
        Q: DeferredTasks<ScheduledAction> + ?Sized,
        W: WorldAccess + ?Sized,
    {
        let outcome = match action.kind {
            ScheduledActionKind::Replant => self.fire_replant(tasks, world, action),
            ScheduledActionKind::MatureGrowth => fire_growth(world, action),
        };
        match &outcome {
            FireOutcome::Applied { .. } => trace!(
                kind = %action.kind,
                pos = %action.target,
                crop = %action.crop,
                "Scheduled action applied"
            ),
            FireOutcome::Abstained(reason) => debug!(
                kind = %action.kind,
                pos = %action.target,
                crop = %action.crop,
                issued_at = action.issued_at_tick,
                %reason,
                "Scheduled action abstained"
            ),
        }
        outcome
    }

    fn fire_replant<Q, W>(
        &self,
        tasks: &mut Q,
        world: &mut W,
        action: &ScheduledAction,
    ) -> FireOutcome
    where
        Q: DeferredTasks<ScheduledAction> + ?Sized,
        W: WorldAccess + ?Sized,
    {
        let soil = world.block_at(action.target.below());
        if !soil_supports(&action.crop, &soil) {
            return FireOutcome::Abstained(AbstainReason::SoilChanged { found: soil });
        }
        let current = world.block_at(action.target);
        if !current.is_air() {
            return FireOutcome::Abstained(AbstainReason::Occupied { found: current });
        }

        world.set_block(action.target, action.crop.clone(), 0);
        let follow_up = self.on_planted(tasks, &*world, action.target, &action.crop);
        FireOutcome::Applied { follow_up }
    }

    fn submit<Q>(
        &self,
        tasks: &mut Q,
        target: BlockPos,
        crop: BlockKind,
        kind: ScheduledActionKind,
        delay: u64,
    ) -> ScheduledAction
    where
        Q: DeferredTasks<ScheduledAction> + ?Sized,
    {
        let action = ScheduledAction {
            target,
            crop,
            kind,
            fire_after_ticks: delay,
            issued_at_tick: tasks.current_tick(),
        };
        trace!(%kind, pos = %target, crop = %action.crop, delay, "Scheduling action");
        tasks.run_after(delay, action.clone());
        action
    }
}

fn fire_growth<W>(world: &mut W, action: &ScheduledAction) -> FireOutcome
where
    W: WorldAccess + ?Sized,
{
    let current = world.block_at(action.target);
    if current != action.crop {
        return FireOutcome::Abstained(AbstainReason::CropReplaced { found: current });
    }
    let Some(max) = world.max_maturity(&current) else {
        return FireOutcome::Abstained(AbstainReason::NotAgeable);
    };
    world.set_maturity(action.target, max);
    FireOutcome::Applied { follow_up: None }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use furrow_world::InMemoryWorld;

    use super::*;
    use crate::queue::ActionQueue;

    const CROP: BlockPos = BlockPos::new(3, 64, 3);

    fn farm() -> InMemoryWorld {
        let mut world = InMemoryWorld::new();
        world.place(CROP.below(), BlockKind::FARMLAND);
        world
    }

    fn fixed() -> CropLifecycleScheduler {
        CropLifecycleScheduler::new(GrowthPolicy::Fixed, 100, 1200)
    }

    #[test]
    fn delays_are_at_least_one() {
        let scheduler = CropLifecycleScheduler::new(GrowthPolicy::Vanilla, 0, 0);
        assert_eq!(scheduler.replant_delay_ticks(), 1);
        assert_eq!(scheduler.fixed_grow_ticks(), 1);
    }

    #[test]
    fn schedule_records_intent() {
        let mut queue = ActionQueue::new();
        let action = fixed().schedule_replant(&mut queue, CROP, BlockKind::WHEAT);
        assert_eq!(action.kind, ScheduledActionKind::Replant);
        assert_eq!(action.fire_after_ticks, 100);
        assert_eq!(action.issued_at_tick, 0);
        assert_eq!(queue.peek_tick(), Some(100));
    }

    #[test]
    fn replant_into_empty_farmland() {
        let mut queue = ActionQueue::new();
        let mut world = farm();
        let scheduler = CropLifecycleScheduler::new(GrowthPolicy::Vanilla, 100, 1200);
        let action = scheduler.schedule_replant(&mut queue, CROP, BlockKind::WHEAT);

        let outcome = scheduler.fire(&mut queue, &mut world, &action);
        assert_eq!(outcome, FireOutcome::Applied { follow_up: None });
        assert_eq!(world.block_at(CROP), BlockKind::WHEAT);
        assert_eq!(world.maturity_at(CROP).unwrap().age, 0);
    }

    #[test]
    fn replant_under_fixed_policy_schedules_growth() {
        let mut queue = ActionQueue::new();
        let mut world = farm();
        let scheduler = fixed();
        let action = scheduler.schedule_replant(&mut queue, CROP, BlockKind::CARROTS);

        let FireOutcome::Applied { follow_up } = scheduler.fire(&mut queue, &mut world, &action) else {
            panic!("replant should apply");
        };
        let growth = follow_up.unwrap();
        assert_eq!(growth.kind, ScheduledActionKind::MatureGrowth);
        assert_eq!(growth.fire_after_ticks, 1200);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn replant_abstains_when_occupied() {
        let mut queue = ActionQueue::new();
        let mut world = farm();
        world.place(CROP, BlockKind::new("pumpkin"));
        let action = fixed().schedule_replant(&mut queue, CROP, BlockKind::WHEAT);

        let outcome = fixed().fire(&mut queue, &mut world, &action);
        assert_eq!(
            outcome,
            FireOutcome::Abstained(AbstainReason::Occupied {
                found: BlockKind::new("pumpkin")
            })
        );
        assert_eq!(world.block_at(CROP), BlockKind::new("pumpkin"));
    }

    #[test]
    fn replant_abstains_when_soil_changed() {
        let mut queue = ActionQueue::new();
        let mut world = farm();
        world.place(CROP.below(), BlockKind::new("dirt"));
        let action = fixed().schedule_replant(&mut queue, CROP, BlockKind::WHEAT);

        let outcome = fixed().fire(&mut queue, &mut world, &action);
        assert!(matches!(
            outcome,
            FireOutcome::Abstained(AbstainReason::SoilChanged { .. })
        ));
        assert!(world.block_at(CROP).is_air());
    }

    #[test]
    fn nether_wart_replants_on_soul_sand() {
        let mut queue = ActionQueue::new();
        let mut world = InMemoryWorld::new();
        world.place(CROP.below(), BlockKind::SOUL_SAND);
        let scheduler = CropLifecycleScheduler::new(GrowthPolicy::Vanilla, 20, 1);

        let wart = scheduler.schedule_replant(&mut queue, CROP, BlockKind::NETHER_WART);
        assert!(scheduler.fire(&mut queue, &mut world, &wart).is_applied());

        world.remove(CROP);
        let wheat = scheduler.schedule_replant(&mut queue, CROP, BlockKind::WHEAT);
        assert!(!scheduler.fire(&mut queue, &mut world, &wheat).is_applied());
    }

    #[test]
    fn growth_matures_in_one_step() {
        let mut queue = ActionQueue::new();
        let mut world = farm();
        world.place(CROP, BlockKind::WHEAT);
        let action = fixed()
            .on_planted(&mut queue, &world, CROP, &BlockKind::WHEAT)
            .unwrap();

        assert!(fixed().fire(&mut queue, &mut world, &action).is_applied());
        assert!(world.maturity_at(CROP).unwrap().is_mature());
    }

    #[test]
    fn growth_abstains_when_crop_replaced() {
        let mut queue = ActionQueue::new();
        let mut world = farm();
        world.place(CROP, BlockKind::WHEAT);
        let action = fixed().schedule_fixed_growth(&mut queue, CROP, BlockKind::WHEAT);
        world.place(CROP, BlockKind::POTATOES);

        let outcome = fixed().fire(&mut queue, &mut world, &action);
        assert_eq!(
            outcome,
            FireOutcome::Abstained(AbstainReason::CropReplaced {
                found: BlockKind::POTATOES
            })
        );
        assert_eq!(world.maturity_at(CROP).unwrap().age, 0);
    }

    #[test]
    fn growth_abstains_for_non_ageable() {
        let mut queue = ActionQueue::new();
        let mut world = farm();
        let melon = BlockKind::new("melon");
        world.place(CROP, melon.clone());
        let action = fixed().schedule_fixed_growth(&mut queue, CROP, melon);

        assert_eq!(
            fixed().fire(&mut queue, &mut world, &action),
            FireOutcome::Abstained(AbstainReason::NotAgeable)
        );
    }

    #[test]
    fn vanilla_policy_never_schedules_growth() {
        let mut queue = ActionQueue::new();
        let world = farm();
        let scheduler = CropLifecycleScheduler::new(GrowthPolicy::Vanilla, 100, 1200);
        assert!(
            scheduler
                .on_planted(&mut queue, &world, CROP, &BlockKind::WHEAT)
                .is_none()
        );
        assert!(
            fixed()
                .on_planted(&mut queue, &world, CROP, &BlockKind::new("melon"))
                .is_none()
        );
        assert!(queue.is_empty());
    }
}
