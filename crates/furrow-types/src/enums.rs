//! Enumeration types shared across the workspace.
//!
//! Every enum that can appear in configuration has a case-insensitive
//! `parse` so loaders can report unknown names instead of failing.

use serde::{Deserialize, Serialize};

/// Growth model used to derive per-level XP costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveModel {
    /// Arithmetic sequence: `base + (level - 1) * increment`.
    Linear,
    /// Geometric sequence: `base * multiplier^(level - 1)`.
    Exponential,
    /// Explicit level-to-cost table.
    Custom,
}

impl CurveModel {
    /// Parse a model name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Some(Self::Linear),
            "exponential" => Some(Self::Exponential),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

impl core::fmt::Display for CurveModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Linear => "linear",
            Self::Exponential => "exponential",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// How crops reach maturity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// The host's ambient simulation grows crops.
    #[default]
    Vanilla,
    /// Crops are force-matured after a fixed delay.
    Fixed,
}

impl GrowthPolicy {
    /// Parse a policy name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "vanilla" => Some(Self::Vanilla),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

impl core::fmt::Display for GrowthPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Vanilla => f.write_str("vanilla"),
            Self::Fixed => f.write_str("fixed"),
        }
    }
}

/// The kind of deferred world mutation a scheduled action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledActionKind {
    /// Re-plant a harvested crop at its initial growth stage.
    Replant,
    /// Set a planted crop to full maturity.
    MatureGrowth,
}

impl core::fmt::Display for ScheduledActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Replant => f.write_str("replant"),
            Self::MatureGrowth => f.write_str("mature_growth"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_model_parse_ignores_case() {
        assert_eq!(CurveModel::parse("LINEAR"), Some(CurveModel::Linear));
        assert_eq!(CurveModel::parse(" Exponential "), Some(CurveModel::Exponential));
        assert_eq!(CurveModel::parse("custom"), Some(CurveModel::Custom));
        assert_eq!(CurveModel::parse("quadratic"), None);
    }

    #[test]
    fn growth_policy_parse_and_default() {
        assert_eq!(GrowthPolicy::parse("FIXED"), Some(GrowthPolicy::Fixed));
        assert_eq!(GrowthPolicy::parse("vanilla"), Some(GrowthPolicy::Vanilla));
        assert_eq!(GrowthPolicy::parse("instant"), None);
        assert_eq!(GrowthPolicy::default(), GrowthPolicy::Vanilla);
    }

    #[test]
    fn action_kind_display() {
        assert_eq!(ScheduledActionKind::Replant.to_string(), "replant");
        assert_eq!(ScheduledActionKind::MatureGrowth.to_string(), "mature_growth");
    }
}
