//! Shared type definitions for the Furrow farming progression system.
//!
//! This crate is the single source of truth for the value types passed
//! between the progression engine, the crop lifecycle scheduler, and the
//! host integration layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for actor identities
//! - [`enums`] -- Curve models, growth policies, scheduled action kinds
//! - [`structs`] -- Block positions, block/tool identifiers, persistence records

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{CurveModel, GrowthPolicy, ScheduledActionKind};
pub use ids::ActorId;
pub use structs::{BlockKind, BlockPos, ProfileRecord, ToolKind};
