//! Per-crop XP rewards, unlock levels, and soil requirements.
//!
//! The catalog is built from configuration at startup and read-only
//! afterwards. A block kind is *tracked* when it appears in either the XP
//! table or the unlock table; untracked kinds are ignored by the farming
//! handlers entirely.

use std::collections::BTreeMap;

use furrow_types::BlockKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CropRule
// ---------------------------------------------------------------------------

/// XP reward and unlock requirement for one crop kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRule {
    /// XP awarded for harvesting a mature crop.
    pub xp_reward: u32,
    /// Minimum farming level needed to plant (0 = unrestricted).
    pub unlock_level: u32,
}

// ---------------------------------------------------------------------------
// CropCatalog
// ---------------------------------------------------------------------------

/// Read-only table of crop rules keyed by block kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropCatalog {
    xp_rewards: BTreeMap<BlockKind, u32>,
    unlock_levels: BTreeMap<BlockKind, u32>,
}

impl CropCatalog {
    /// Create an empty catalog (nothing tracked).
    pub const fn new() -> Self {
        Self {
            xp_rewards: BTreeMap::new(),
            unlock_levels: BTreeMap::new(),
        }
    }

    /// Build a catalog from separate XP and unlock tables.
    pub const fn from_tables(
        xp_rewards: BTreeMap<BlockKind, u32>,
        unlock_levels: BTreeMap<BlockKind, u32>,
    ) -> Self {
        Self {
            xp_rewards,
            unlock_levels,
        }
    }

    /// Whether `kind` appears in either table.
    pub fn is_tracked(&self, kind: &BlockKind) -> bool {
        self.xp_rewards.contains_key(kind) || self.unlock_levels.contains_key(kind)
    }

    /// The rule for `kind`; absent entries default to 0.
    pub fn rule(&self, kind: &BlockKind) -> CropRule {
        CropRule {
            xp_reward: self.xp_rewards.get(kind).copied().unwrap_or(0),
            unlock_level: self.unlock_levels.get(kind).copied().unwrap_or(0),
        }
    }

    /// Whether an actor at `level` may plant `kind`.
    pub fn is_unlocked(&self, kind: &BlockKind, level: u32) -> bool {
        level >= self.rule(kind).unlock_level
    }

    /// Number of tracked kinds.
    pub fn tracked_count(&self) -> usize {
        self.xp_rewards
            .keys()
            .chain(self.unlock_levels.keys().filter(|k| !self.xp_rewards.contains_key(*k)))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Soil
// ---------------------------------------------------------------------------

/// Whether `soil` is a valid base block for `crop`.
///
/// Farmland supports every crop; soul sand additionally supports nether wart.
pub fn soil_supports(crop: &BlockKind, soil: &BlockKind) -> bool {
    *soil == BlockKind::FARMLAND
        || (*crop == BlockKind::NETHER_WART && *soil == BlockKind::SOUL_SAND)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CropCatalog {
        CropCatalog::from_tables(
            BTreeMap::from([(BlockKind::WHEAT, 5), (BlockKind::CARROTS, 8)]),
            BTreeMap::from([(BlockKind::CARROTS, 3), (BlockKind::NETHER_WART, 10)]),
        )
    }

    #[test]
    fn tracked_if_in_either_table() {
        let catalog = catalog();
        assert!(catalog.is_tracked(&BlockKind::WHEAT));
        assert!(catalog.is_tracked(&BlockKind::CARROTS));
        assert!(catalog.is_tracked(&BlockKind::NETHER_WART));
        assert!(!catalog.is_tracked(&BlockKind::POTATOES));
        assert_eq!(catalog.tracked_count(), 3);
    }

    #[test]
    fn missing_values_default_to_zero() {
        let catalog = catalog();
        assert_eq!(
            catalog.rule(&BlockKind::WHEAT),
            CropRule {
                xp_reward: 5,
                unlock_level: 0
            }
        );
        assert_eq!(catalog.rule(&BlockKind::NETHER_WART).xp_reward, 0);
        assert_eq!(catalog.rule(&BlockKind::POTATOES), CropRule::default());
    }

    #[test]
    fn unlock_gate_is_inclusive() {
        let catalog = CropCatalog::from_tables(
            BTreeMap::new(),
            BTreeMap::from([(BlockKind::BEETROOTS, 5)]),
        );
        assert!(!catalog.is_unlocked(&BlockKind::BEETROOTS, 4));
        assert!(catalog.is_unlocked(&BlockKind::BEETROOTS, 5));
        assert!(catalog.is_unlocked(&BlockKind::WHEAT, 0));
    }

    #[test]
    fn soil_rules() {
        assert!(soil_supports(&BlockKind::WHEAT, &BlockKind::FARMLAND));
        assert!(!soil_supports(&BlockKind::WHEAT, &BlockKind::SOUL_SAND));
        assert!(soil_supports(&BlockKind::NETHER_WART, &BlockKind::SOUL_SAND));
        assert!(!soil_supports(&BlockKind::CARROTS, &BlockKind::new("dirt")));
    }
}
