//! Placement Core - Surface tracking state machine and tap-to-place pipeline
//!
//! This crate holds everything with real state in the AR placement flow:
//! - Tracking quality classification into user-facing status messages
//! - Grid-sampled surface coverage checks against the current frame
//! - The Scanning / Aiming / Ready application state machine
//! - Plane overlay bookkeeping driven by anchor lifecycle events
//! - Resolving screen taps into furniture placements
//!
//! The AR/rendering engine sits behind the [`ArEngine`] trait; the
//! [`PlacementController`] ties the pieces together and processes one
//! [`ArEvent`] at a time.

pub mod anchor;
pub mod config;
pub mod controller;
pub mod coverage;
pub mod engine;
pub mod event;
pub mod geometry;
pub mod overlay;
pub mod placement;
pub mod scene;
pub mod state;
pub mod tracking;

pub use anchor::{AnchorId, PlaneAlignment, PlaneAnchor};
pub use config::{ConfigError, CoverageConfig, FurnitureConfig, PlacementConfig};
pub use controller::PlacementController;
pub use coverage::SurfaceSampler;
pub use engine::{
    ArEngine, HitResult, HitTestKind, RunOptions, SessionConfig, ViewOptions, WorldAlignment,
};
pub use event::{AnchorEvent, ArEvent, Notification};
pub use geometry::{ScreenPoint, Vec3, Viewport};
pub use overlay::{OverlayChange, PlaneOverlayManager, PlaneSurface};
pub use placement::{PlacedObject, PlacementResolver};
pub use scene::{DebugOptions, FurnitureNode, NodeId, NodeKind, OverlayGeometry, OverlayMaterial};
pub use state::{ApplicationState, StateMachine};
pub use tracking::{LimitedReason, TrackingQuality, TrackingStatus};
