//! Per-actor progression state: an XP counter and a cached display name.
//!
//! The level is never stored. It is derived from XP through whichever
//! [`LevelCurve`] is active, so a curve change applies to every profile
//! immediately without migrating data.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::curve::LevelCurve;

// ---------------------------------------------------------------------------
// ProgressionProfile
// ---------------------------------------------------------------------------

/// Mutable progression state for a single actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionProfile {
    /// Best-effort human-readable name; may be stale or empty.
    display_name: String,
    /// Accumulated XP. Only grows.
    xp: u64,
}

impl ProgressionProfile {
    /// Create an empty profile (no name, zero XP).
    pub const fn new() -> Self {
        Self {
            display_name: String::new(),
            xp: 0,
        }
    }

    /// Create a profile from persisted values.
    pub const fn from_parts(display_name: String, xp: u64) -> Self {
        Self { display_name, xp }
    }

    /// Accumulated XP.
    pub const fn xp(&self) -> u64 {
        self.xp
    }

    /// Last observed display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Award XP. Zero and negative amounts are ignored.
    ///
    /// Returns the XP total after the award.
    pub fn add_xp(&mut self, amount: i64) -> u64 {
        let delta = u64::try_from(amount).unwrap_or(0);
        self.xp = self.xp.saturating_add(delta);
        self.xp
    }

    /// Overwrite the cached display name.
    pub fn refresh_display_name(&mut self, name: &str) {
        name.clone_into(&mut self.display_name);
    }

    /// Level derived from the current XP under `curve`.
    pub fn current_level(&self, curve: &LevelCurve) -> u32 {
        curve.level_for_xp(self.xp)
    }

    /// Position within the current level under `curve`.
    pub fn progress(&self, curve: &LevelCurve) -> LevelProgress {
        let level = self.current_level(curve);
        let level_start = curve.xp_for_level(level);
        let next_start = curve.xp_for_level(level.saturating_add(1));
        LevelProgress {
            level,
            xp_into_level: self.xp.saturating_sub(level_start),
            xp_needed: next_start.saturating_sub(level_start),
        }
    }
}

// ---------------------------------------------------------------------------
// LevelProgress
// ---------------------------------------------------------------------------

/// How far an actor is through their current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Current level.
    pub level: u32,
    /// XP earned since reaching `level`.
    pub xp_into_level: u64,
    /// XP the next level costs in total (0 at a curve ceiling).
    pub xp_needed: u64,
}

impl LevelProgress {
    /// Percentage of the next level earned, to one decimal place.
    ///
    /// Returns zero when the next level is unreachable.
    pub fn percent(&self) -> Decimal {
        if self.xp_needed == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.xp_into_level)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(Decimal::from(self.xp_needed)))
            .map_or(Decimal::ZERO, |pct| {
                pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
            })
    }
}
