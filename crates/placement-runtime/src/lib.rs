//! Placement Runtime - Serialized event dispatch for the placement controller
//!
//! Frame ticks, anchor notifications and gestures may be produced on
//! different threads. This crate funnels them through one queue into a
//! single task that owns the [`placement_core::PlacementController`], so
//! every state transition happens on one path and two events are never
//! handled at the same time.

pub mod dispatcher;

pub use dispatcher::{DispatchError, Dispatcher, DispatcherHandle};
