//! Configuration, tick clock, crop lifecycle scheduling, and the farming
//! context for Furrow.
//!
//! This crate wires the pure progression logic to the host world. It owns
//! the deferred-action queue that replaces the host's "run after N ticks"
//! primitive and the handlers that turn place/break/join/quit events into
//! XP awards and scheduled replant or growth actions.
//!
//! # Modules
//!
//! - [`clock`] -- Monotonic logical tick counter.
//! - [`config`] -- `farming.yaml` and `levels.yaml` loading into
//!   strongly-typed structs, curve and catalog construction.
//! - [`context`] -- [`FarmingContext`] with the host event handlers and
//!   ranking queries.
//! - [`lifecycle`] -- [`CropLifecycleScheduler`]: replant and fixed growth
//!   with revalidation at fire time.
//! - [`queue`] -- [`DeferredTasks`] trait and the [`ActionQueue`] min-heap.
//! - [`storage`] -- [`ProfileStore`] trait and the YAML-backed store.
//!
//! [`FarmingContext`]: context::FarmingContext
//! [`CropLifecycleScheduler`]: lifecycle::CropLifecycleScheduler
//! [`DeferredTasks`]: queue::DeferredTasks
//! [`ActionQueue`]: queue::ActionQueue
//! [`ProfileStore`]: storage::ProfileStore

pub mod clock;
pub mod config;
pub mod context;
pub mod lifecycle;
pub mod queue;
pub mod storage;
