//! XP curves, per-actor progression profiles, and ranking for Furrow.
//!
//! This crate is pure logic: no I/O, no clocks, no host types. It turns
//! configured curve parameters into a [`LevelCurve`], keeps one
//! [`ProgressionProfile`] per actor in a [`ProfileRegistry`], and answers
//! level and leaderboard queries.
//!
//! # Modules
//!
//! - [`curve`] -- Linear, exponential, and custom XP curves with ceiling
//!   handling and prefix-sum lookups.
//! - [`profile`] -- Per-actor XP counter, display name, and level progress.
//! - [`registry`] -- Create-on-first-access profile map, leaderboard
//!   queries, and bulk hydrate/dehydrate.

pub mod curve;
pub mod profile;
pub mod registry;

// Re-export primary types at crate root.
pub use curve::{
    DEFAULT_COST_PER_LEVEL, ExponentialParams, LevelCurve, LinearParams, MAX_TABLE_LEVEL,
    PRECOMPUTED_LEVELS,
};
pub use profile::{LevelProgress, ProgressionProfile};
pub use registry::{LeaderboardEntry, ProfileRegistry};
