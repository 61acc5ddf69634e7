//! World-facing layer for Furrow: the capability trait the core uses to
//! read and mutate host blocks, the crop catalog, and an in-memory world.
//!
//! # Modules
//!
//! - [`access`] -- [`WorldAccess`] trait and crop [`Maturity`]
//! - [`crop`] -- Per-crop XP and unlock rules, soil compatibility
//! - [`memory`] -- Sparse [`InMemoryWorld`] for replay and tests

pub mod access;
pub mod crop;
pub mod memory;

pub use access::{Maturity, WorldAccess};
pub use crop::{CropCatalog, CropRule, soil_supports};
pub use memory::InMemoryWorld;
