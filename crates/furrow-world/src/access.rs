//! The narrow capability surface through which the core reads and mutates
//! the host world.
//!
//! Every call is synchronous and reflects live world truth at call time.
//! The crop lifecycle scheduler re-queries through this trait when a
//! deferred action fires, because the world may have changed since the
//! action was scheduled.

use furrow_types::{BlockKind, BlockPos};
use serde::{Deserialize, Serialize};

/// Growth stage of an ageable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maturity {
    /// Current growth stage (0 is freshly planted).
    pub age: u8,
    /// Fully grown stage for this block kind.
    pub max: u8,
}

impl Maturity {
    /// Whether the block has reached its final growth stage.
    pub const fn is_mature(self) -> bool {
        self.age >= self.max
    }
}

/// Host world operations needed by the farming core.
pub trait WorldAccess {
    /// Fully grown stage of `kind`, or `None` if it does not age.
    fn max_maturity(&self, kind: &BlockKind) -> Option<u8>;

    /// Whether `kind` has a bounded maturity progression.
    fn is_ageable(&self, kind: &BlockKind) -> bool {
        self.max_maturity(kind).is_some()
    }

    /// The block currently at `pos` ([`BlockKind::AIR`] when empty).
    fn block_at(&self, pos: BlockPos) -> BlockKind;

    /// Growth stage of the block at `pos`, or `None` if it does not age.
    fn maturity_at(&self, pos: BlockPos) -> Option<Maturity>;

    /// Replace the block at `pos`, starting ageable kinds at
    /// `initial_maturity`.
    fn set_block(&mut self, pos: BlockPos, kind: BlockKind, initial_maturity: u8);

    /// Set the growth stage of the ageable block at `pos`.
    ///
    /// Has no effect on blocks that do not age.
    fn set_maturity(&mut self, pos: BlockPos, value: u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maturity_reaches_max() {
        assert!(!Maturity { age: 0, max: 7 }.is_mature());
        assert!(!Maturity { age: 6, max: 7 }.is_mature());
        assert!(Maturity { age: 7, max: 7 }.is_mature());
    }
}
