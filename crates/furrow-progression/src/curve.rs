//! XP-to-level curves.
//!
//! A [`LevelCurve`] maps cumulative XP to a level and back under one of
//! three growth models:
//!
//! - **Linear** -- cost of level `L` is `base + (L - 1) * increment`.
//! - **Exponential** -- cost of level `L` is `base * multiplier^(L - 1)`.
//! - **Custom** -- explicit level-to-cost table.
//!
//! Linear and exponential curves precompute the first
//! [`PRECOMPUTED_LEVELS`] levels. Any level outside the precomputed or
//! explicit range costs the curve's default cost.
//!
//! # Curve Ceiling
//!
//! A cost of 0 at some level halts progression permanently at the level
//! below it. Derived costs are always floored at 1, so only a zero default
//! cost (or a zero table entry supplied directly) can produce a ceiling.
//!
//! # Lookup Strategy
//!
//! Cumulative costs are stored as prefix sums over the table range, so
//! [`LevelCurve::level_for_xp`] is a binary search plus one division for the
//! default-cost tail. Sums saturate at `u64::MAX`.

use std::collections::BTreeMap;

use furrow_types::CurveModel;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of levels precomputed for linear and exponential curves.
pub const PRECOMPUTED_LEVELS: u32 = 1000;

/// Highest level an explicit cost table may name.
pub const MAX_TABLE_LEVEL: u32 = 100_000;

/// Default XP cost for levels outside the precomputed or explicit range.
pub const DEFAULT_COST_PER_LEVEL: u64 = 300;

// ---------------------------------------------------------------------------
// Model parameters
// ---------------------------------------------------------------------------

/// Parameters of an arithmetic (linear) curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearParams {
    /// Cost of level 1.
    pub base: u64,
    /// Added cost per level.
    pub increment: u64,
    /// Round each cost to the nearest multiple of this (0 disables).
    pub round_to: u64,
}

/// Parameters of a geometric (exponential) curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExponentialParams {
    /// Cost of level 1.
    pub base: u64,
    /// Growth factor per level.
    pub multiplier: Decimal,
    /// Round each cost to the nearest multiple of this (0 disables).
    pub round_to: u64,
}

// ---------------------------------------------------------------------------
// LevelCurve
// ---------------------------------------------------------------------------

/// Immutable XP curve built once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCurve {
    /// Growth model this curve was built from.
    model: CurveModel,
    /// Per-level costs for the precomputed or explicit range.
    costs: BTreeMap<u32, u64>,
    /// Cost of every level not present in `costs`.
    default_cost: u64,
    /// `cumulative[i]` is the total XP needed to reach level `i + 1`.
    /// Stops before the first zero-cost level.
    cumulative: Vec<u64>,
    /// Highest reachable level, if a zero cost caps the curve.
    ceiling: Option<u32>,
}

impl LevelCurve {
    /// Build a linear curve.
    ///
    /// Costs for levels `1..=PRECOMPUTED_LEVELS` are
    /// `base + (level - 1) * increment`, rounded to the nearest multiple of
    /// `round_to` when it is non-zero, and floored at 1.
    pub fn linear(params: LinearParams, default_cost: u64) -> Self {
        let mut costs = BTreeMap::new();
        for level in 1..=PRECOMPUTED_LEVELS {
            let steps = u64::from(level.saturating_sub(1));
            let raw = params
                .base
                .saturating_add(steps.saturating_mul(params.increment));
            costs.insert(level, round_to_multiple(raw, params.round_to).max(1));
        }
        Self::from_costs(CurveModel::Linear, costs, default_cost)
    }

    /// Build an exponential curve.
    ///
    /// Costs for levels `1..=PRECOMPUTED_LEVELS` are
    /// `base * multiplier^(level - 1)`, computed in fixed-point decimal.
    /// With rounding enabled the value is rounded to the nearest multiple of
    /// `round_to` (midpoints away from zero); otherwise it is floored. Every
    /// cost is floored at 1 and saturates at `u64::MAX`.
    pub fn exponential(params: ExponentialParams, default_cost: u64) -> Self {
        let mut costs = BTreeMap::new();
        let mut exact = Some(Decimal::from(params.base));
        for level in 1..=PRECOMPUTED_LEVELS {
            let cost = exact.map_or(u64::MAX, |value| decimal_cost(value, params.round_to));
            costs.insert(level, cost.max(1));
            exact = exact.and_then(|value| value.checked_mul(params.multiplier));
        }
        Self::from_costs(CurveModel::Exponential, costs, default_cost)
    }

    /// Build a curve from an explicit level-to-cost table.
    ///
    /// Level 0 and levels above [`MAX_TABLE_LEVEL`] are dropped with a
    /// warning. Costs are used as given; a zero cost is a curve ceiling.
    pub fn custom(table: BTreeMap<u32, u64>, default_cost: u64) -> Self {
        let mut costs = BTreeMap::new();
        for (level, cost) in table {
            if level == 0 || level > MAX_TABLE_LEVEL {
                warn!(level, max = MAX_TABLE_LEVEL, "Ignoring out-of-range level in cost table");
                continue;
            }
            costs.insert(level, cost);
        }
        Self::from_costs(CurveModel::Custom, costs, default_cost)
    }

    /// Build a curve where every level costs `default_cost`.
    ///
    /// Used as the fallback when the configured growth model is unknown.
    pub fn flat(default_cost: u64) -> Self {
        Self::custom(BTreeMap::new(), default_cost)
    }

    fn from_costs(model: CurveModel, costs: BTreeMap<u32, u64>, default_cost: u64) -> Self {
        let table_len = costs.keys().next_back().copied().unwrap_or(0);
        let mut cumulative = Vec::new();
        let mut ceiling = None;
        let mut total: u64 = 0;

        for level in 1..=table_len {
            let cost = costs.get(&level).copied().unwrap_or(default_cost);
            if cost == 0 {
                ceiling = Some(level.saturating_sub(1));
                break;
            }
            total = total.saturating_add(cost);
            cumulative.push(total);
        }

        if ceiling.is_none() && default_cost == 0 {
            ceiling = Some(table_len);
        }

        Self {
            model,
            costs,
            default_cost,
            cumulative,
            ceiling,
        }
    }

    /// The growth model this curve was built from.
    pub const fn model(&self) -> CurveModel {
        self.model
    }

    /// Cost of every level outside the precomputed or explicit range.
    pub const fn default_cost(&self) -> u64 {
        self.default_cost
    }

    /// Highest reachable level, or `None` if the curve is unbounded.
    pub const fn ceiling(&self) -> Option<u32> {
        self.ceiling
    }

    /// XP needed to advance from `level - 1` to `level`.
    ///
    /// Returns 0 for level 0, and for any level whose cost is a ceiling.
    pub fn cost_for_level(&self, level: u32) -> u64 {
        if level == 0 {
            return 0;
        }
        self.costs.get(&level).copied().unwrap_or(self.default_cost)
    }

    /// Cumulative XP needed to reach `level` from zero.
    ///
    /// Levels past the ceiling cost nothing more, so the result stops
    /// growing there.
    pub fn xp_for_level(&self, level: u32) -> u64 {
        let level = self.ceiling.map_or(level, |cap| level.min(cap));
        if level == 0 {
            return 0;
        }

        let dense = self.dense_len();
        if level <= dense {
            let idx = usize::try_from(level.saturating_sub(1)).unwrap_or(usize::MAX);
            return self.cumulative.get(idx).copied().unwrap_or(u64::MAX);
        }

        let tail_levels = u64::from(level.saturating_sub(dense));
        self.table_total()
            .saturating_add(tail_levels.saturating_mul(self.default_cost))
    }

    /// Highest level whose cumulative cost is covered by `xp`.
    pub fn level_for_xp(&self, xp: u64) -> u32 {
        let paid = self.cumulative.partition_point(|&total| total <= xp);
        let paid = u32::try_from(paid).unwrap_or(u32::MAX);

        if paid < self.dense_len() || self.ceiling.is_some() {
            return self.ceiling.map_or(paid, |cap| paid.min(cap));
        }

        let remaining = xp.saturating_sub(self.table_total());
        let extra = remaining.checked_div(self.default_cost).unwrap_or(0);
        paid.saturating_add(u32::try_from(extra).unwrap_or(u32::MAX))
    }

    /// Number of levels covered by the prefix-sum table.
    fn dense_len(&self) -> u32 {
        u32::try_from(self.cumulative.len()).unwrap_or(u32::MAX)
    }

    /// Total XP of every level in the prefix-sum table.
    fn table_total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::linear(
            LinearParams {
                base: 100,
                increment: 50,
                round_to: 5,
            },
            DEFAULT_COST_PER_LEVEL,
        )
    }
}

// ---------------------------------------------------------------------------
// Rounding helpers
// ---------------------------------------------------------------------------

/// Round `value` to the nearest multiple of `step`, midpoints upward.
///
/// A `step` of 0 leaves the value unchanged.
fn round_to_multiple(value: u64, step: u64) -> u64 {
    value
        .saturating_add(step / 2)
        .checked_div(step)
        .map_or(value, |multiples| multiples.saturating_mul(step))
}

/// Convert an exact decimal cost to an integer cost.
fn decimal_cost(value: Decimal, round_to: u64) -> u64 {
    let whole = if round_to > 0 {
        let step = Decimal::from(round_to);
        value
            .checked_div(step)
            .map(|ratio| ratio.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|multiples| multiples.checked_mul(step))
    } else {
        Some(value.floor())
    };
    whole.and_then(|w| w.to_u64()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
