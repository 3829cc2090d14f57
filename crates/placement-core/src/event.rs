//! Events flowing into and out of the controller

use serde::{Deserialize, Serialize};

use crate::anchor::{AnchorId, PlaneAnchor};
use crate::geometry::{ScreenPoint, Viewport};
use crate::placement::PlacedObject;
use crate::state::ApplicationState;
use crate::tracking::TrackingQuality;

/// Anchor payload; only plane anchors are of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnchorEvent {
    Plane(PlaneAnchor),
    /// Image, face, or other anchors the controller ignores
    Other { id: AnchorId },
}

impl AnchorEvent {
    pub fn id(&self) -> &AnchorId {
        match self {
            Self::Plane(plane) => &plane.id,
            Self::Other { id } => id,
        }
    }
}

/// Input notifications from the engine and the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArEvent {
    /// Camera tracking quality changed
    TrackingChanged(TrackingQuality),
    /// A frame is about to be rendered into a view of this size
    Frame(Viewport),
    AnchorAdded(AnchorEvent),
    AnchorUpdated(AnchorEvent),
    AnchorRemoved(AnchorEvent),
    Tap(ScreenPoint),
    /// Remove placed furniture, keep the floor grid
    ClearRequested,
    /// Start over with a fresh session
    ResetRequested,
    SessionFailed(String),
    SessionInterrupted,
    SessionInterruptionEnded,
}

impl ArEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::TrackingChanged(_) => "tracking_changed",
            Self::Frame(_) => "frame",
            Self::AnchorAdded(_) => "anchor_added",
            Self::AnchorUpdated(_) => "anchor_updated",
            Self::AnchorRemoved(_) => "anchor_removed",
            Self::Tap(_) => "tap",
            Self::ClearRequested => "clear_requested",
            Self::ResetRequested => "reset_requested",
            Self::SessionFailed(_) => "session_failed",
            Self::SessionInterrupted => "session_interrupted",
            Self::SessionInterruptionEnded => "session_interruption_ended",
        }
    }
}

/// What changed as a result of handling an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    StateChanged {
        from: ApplicationState,
        to: ApplicationState,
    },
    StatusChanged { text: String },
    SurfaceAdded { anchor: AnchorId },
    SurfaceUpdated { anchor: AnchorId },
    SurfaceRemoved { anchor: AnchorId },
    ObjectPlaced { object: PlacedObject },
    ObjectsCleared { furniture: usize, overlays: usize },
    SessionReset,
}
