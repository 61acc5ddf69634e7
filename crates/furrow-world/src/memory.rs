//! A self-contained block grid implementing [`WorldAccess`].
//!
//! Used by the replay host and by tests. Positions that were never set
//! read back as air.

use std::collections::BTreeMap;

use furrow_types::{BlockKind, BlockPos};
use tracing::trace;

use crate::access::{Maturity, WorldAccess};

/// One occupied cell.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    kind: BlockKind,
    age: u8,
}

/// Sparse in-memory world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryWorld {
    blocks: BTreeMap<BlockPos, Cell>,
    ageable: BTreeMap<BlockKind, u8>,
}

impl Default for InMemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWorld {
    /// Create an empty world with the standard crop growth stages.
    pub fn new() -> Self {
        Self::with_ageable(BTreeMap::from([
            (BlockKind::WHEAT, 7),
            (BlockKind::CARROTS, 7),
            (BlockKind::POTATOES, 7),
            (BlockKind::BEETROOTS, 3),
            (BlockKind::NETHER_WART, 3),
        ]))
    }

    /// Create an empty world with a custom table of fully grown stages.
    pub const fn with_ageable(ageable: BTreeMap<BlockKind, u8>) -> Self {
        Self {
            blocks: BTreeMap::new(),
            ageable,
        }
    }

    /// Put a block at `pos` at growth stage 0.
    pub fn place(&mut self, pos: BlockPos, kind: BlockKind) {
        self.set_block(pos, kind, 0);
    }

    /// Clear `pos` back to air, returning what was there.
    pub fn remove(&mut self, pos: BlockPos) -> BlockKind {
        self.blocks
            .remove(&pos)
            .map_or(BlockKind::AIR, |cell| cell.kind)
    }

    /// Number of non-air cells.
    pub fn occupied(&self) -> usize {
        self.blocks.len()
    }
}

impl WorldAccess for InMemoryWorld {
    fn max_maturity(&self, kind: &BlockKind) -> Option<u8> {
        self.ageable.get(kind).copied()
    }

    fn block_at(&self, pos: BlockPos) -> BlockKind {
        self.blocks
            .get(&pos)
            .map_or(BlockKind::AIR, |cell| cell.kind.clone())
    }

    fn maturity_at(&self, pos: BlockPos) -> Option<Maturity> {
        let cell = self.blocks.get(&pos)?;
        let max = self.max_maturity(&cell.kind)?;
        Some(Maturity { age: cell.age, max })
    }

    fn set_block(&mut self, pos: BlockPos, kind: BlockKind, initial_maturity: u8) {
        trace!(%pos, %kind, initial_maturity, "set_block");
        if kind.is_air() {
            self.blocks.remove(&pos);
            return;
        }
        let age = self
            .max_maturity(&kind)
            .map_or(0, |max| initial_maturity.min(max));
        self.blocks.insert(pos, Cell { kind, age });
    }

    fn set_maturity(&mut self, pos: BlockPos, value: u8) {
        let Some(kind) = self.blocks.get(&pos).map(|cell| cell.kind.clone()) else {
            return;
        };
        let Some(max) = self.max_maturity(&kind) else {
            return;
        };
        if let Some(cell) = self.blocks.get_mut(&pos) {
            cell.age = value.min(max);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const POS: BlockPos = BlockPos::new(0, 65, 0);

    #[test]
    fn unset_positions_are_air() {
        let world = InMemoryWorld::new();
        assert!(world.block_at(POS).is_air());
        assert!(world.maturity_at(POS).is_none());
    }

    #[test]
    fn placed_crop_starts_immature() {
        let mut world = InMemoryWorld::new();
        world.place(POS, BlockKind::WHEAT);
        assert_eq!(world.block_at(POS), BlockKind::WHEAT);
        assert_eq!(world.maturity_at(POS), Some(Maturity { age: 0, max: 7 }));
    }

    #[test]
    fn maturity_is_clamped_to_max() {
        let mut world = InMemoryWorld::new();
        world.set_block(POS, BlockKind::BEETROOTS, 200);
        assert_eq!(world.maturity_at(POS).unwrap().age, 3);
        world.set_maturity(POS, 1);
        assert_eq!(world.maturity_at(POS).unwrap().age, 1);
        world.set_maturity(POS, 9);
        assert!(world.maturity_at(POS).unwrap().is_mature());
    }

    #[test]
    fn non_ageable_blocks_have_no_maturity() {
        let mut world = InMemoryWorld::new();
        world.place(POS.below(), BlockKind::FARMLAND);
        world.set_maturity(POS.below(), 5);
        assert!(!world.is_ageable(&BlockKind::FARMLAND));
        assert!(world.maturity_at(POS.below()).is_none());
    }

    #[test]
    fn setting_air_clears_the_cell() {
        let mut world = InMemoryWorld::new();
        world.place(POS, BlockKind::CARROTS);
        world.set_block(POS, BlockKind::AIR, 0);
        assert_eq!(world.occupied(), 0);
        world.place(POS, BlockKind::CARROTS);
        assert_eq!(world.remove(POS), BlockKind::CARROTS);
        assert_eq!(world.remove(POS), BlockKind::AIR);
    }
}
