//! Core value types: world coordinates, block and tool identifiers, and the
//! persistence record for a single actor.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::ids::ActorId;

// ---------------------------------------------------------------------------
// BlockPos
// ---------------------------------------------------------------------------

/// Integer coordinate of a single block in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// East-west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North-south axis.
    pub z: i32,
}

impl BlockPos {
    /// Create a position from its three components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The position directly underneath this one (the soil of a crop).
    ///
    /// Saturates at the bottom of the coordinate range.
    pub const fn below(self) -> Self {
        Self {
            x: self.x,
            y: self.y.saturating_sub(1),
            z: self.z,
        }
    }
}

impl core::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// BlockKind
// ---------------------------------------------------------------------------

/// Opaque identifier of a block type (`"wheat"`, `"farmland"`, `"air"`).
///
/// Identifiers are normalised to lower case so configuration keys and host
/// names compare equal regardless of spelling.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BlockKind(Cow<'static, str>);

impl BlockKind {
    /// The empty block.
    pub const AIR: Self = Self(Cow::Borrowed("air"));
    /// Tilled soil that ordinary crops grow on.
    pub const FARMLAND: Self = Self(Cow::Borrowed("farmland"));
    /// Soil that additionally supports nether wart.
    pub const SOUL_SAND: Self = Self(Cow::Borrowed("soul_sand"));
    /// The one crop that also grows on soul sand.
    pub const NETHER_WART: Self = Self(Cow::Borrowed("nether_wart"));
    /// Wheat.
    pub const WHEAT: Self = Self(Cow::Borrowed("wheat"));
    /// Carrots.
    pub const CARROTS: Self = Self(Cow::Borrowed("carrots"));
    /// Potatoes.
    pub const POTATOES: Self = Self(Cow::Borrowed("potatoes"));
    /// Beetroots.
    pub const BEETROOTS: Self = Self(Cow::Borrowed("beetroots"));

    /// Create a block kind from a host or configuration name.
    pub fn new(name: &str) -> Self {
        Self(Cow::Owned(name.trim().to_ascii_lowercase()))
    }

    /// The normalised identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the empty block.
    pub fn is_air(&self) -> bool {
        *self == Self::AIR
    }
}

impl From<String> for BlockKind {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        kind.0.into_owned()
    }
}

impl core::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ToolKind
// ---------------------------------------------------------------------------

/// Opaque identifier of the item an actor holds while acting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolKind(String);

impl ToolKind {
    /// Create a tool kind from a host name, normalised to lower case.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_lowercase())
    }

    /// The normalised identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier ends with `suffix` (compared in lower case).
    pub fn has_suffix(&self, suffix: &str) -> bool {
        !suffix.is_empty() && self.0.ends_with(&suffix.to_ascii_lowercase())
    }
}

impl core::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ProfileRecord
// ---------------------------------------------------------------------------

/// Persisted form of one actor's progression: the hydrate/dehydrate unit
/// exchanged with the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// The actor this record belongs to.
    pub actor_id: ActorId,
    /// Last display name observed for the actor (may be empty).
    pub display_name: String,
    /// Accumulated farming XP.
    pub xp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_moves_down_one() {
        let pos = BlockPos::new(4, 64, -2);
        assert_eq!(pos.below(), BlockPos::new(4, 63, -2));
        assert_eq!(BlockPos::new(0, i32::MIN, 0).below().y, i32::MIN);
    }

    #[test]
    fn block_kind_normalises_case() {
        assert_eq!(BlockKind::new(" WHEAT "), BlockKind::WHEAT);
        assert_eq!(BlockKind::new("Nether_Wart"), BlockKind::NETHER_WART);
        assert!(BlockKind::new("Air").is_air());
        assert!(!BlockKind::FARMLAND.is_air());
    }

    #[test]
    fn block_kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&BlockKind::CARROTS).ok();
        assert_eq!(json.as_deref(), Some("\"carrots\""));
        let back: Option<BlockKind> = serde_json::from_str("\"POTATOES\"").ok();
        assert_eq!(back, Some(BlockKind::POTATOES));
    }

    #[test]
    fn tool_suffix_match() {
        let hoe = ToolKind::new("DIAMOND_HOE");
        assert!(hoe.has_suffix("_hoe"));
        assert!(hoe.has_suffix("_HOE"));
        assert!(!ToolKind::new("iron_shovel").has_suffix("_hoe"));
        assert!(!hoe.has_suffix(""));
    }
}
