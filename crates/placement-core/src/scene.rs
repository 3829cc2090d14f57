//! Scene node descriptions handed to the rendering engine

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use uuid::Uuid;

use crate::anchor::{PlaneAlignment, PlaneAnchor};
use crate::geometry::Vec3;

/// Identifier of a scene node created at the controller's request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a controller-owned node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Grid overlay on a horizontal plane; survives "clear furniture"
    HorizontalOverlay,
    VerticalOverlay,
    Furniture,
}

impl NodeKind {
    pub fn overlay_for(alignment: PlaneAlignment) -> Self {
        match alignment {
            PlaneAlignment::Horizontal => Self::HorizontalOverlay,
            PlaneAlignment::Vertical => Self::VerticalOverlay,
        }
    }

    pub fn is_overlay(&self) -> bool {
        matches!(self, Self::HorizontalOverlay | Self::VerticalOverlay)
    }
}

/// Surface material of a plane overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMaterial {
    /// Textured floor grid
    Grid,
    /// Engine default material
    Plain,
}

/// Flat double-sided plane drawn over a detected surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayGeometry {
    pub width: f64,
    pub depth: f64,
    /// Position relative to the anchor node
    pub position: Vec3,
    /// Euler angles (radians) aligning the plane with the anchor
    pub euler_angles: Vec3,
    pub double_sided: bool,
    pub material: OverlayMaterial,
}

impl OverlayGeometry {
    /// Overlay matching the anchor's latest center and extent
    pub fn from_anchor(anchor: &PlaneAnchor) -> Self {
        Self {
            width: anchor.width(),
            depth: anchor.depth(),
            position: anchor.center,
            euler_angles: Vec3::new(-FRAC_PI_2, 0.0, 0.0),
            double_sided: true,
            material: match anchor.alignment {
                PlaneAlignment::Horizontal => OverlayMaterial::Grid,
                PlaneAlignment::Vertical => OverlayMaterial::Plain,
            },
        }
    }
}

/// Furniture instance requested from the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureNode {
    /// Scene file the model is loaded from
    pub model_path: String,
    /// Node inside the scene file to instantiate
    pub node_name: String,
    pub position: Vec3,
    pub scale: Vec3,
}

/// Debug visualizations the engine draws on top of the camera feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebugOptions {
    #[serde(default)]
    pub world_origin: bool,
    #[serde(default)]
    pub feature_points: bool,
}

impl DebugOptions {
    pub const NONE: DebugOptions = DebugOptions {
        world_origin: false,
        feature_points: false,
    };

    pub const FEATURE_POINTS: DebugOptions = DebugOptions {
        world_origin: false,
        feature_points: true,
    };
}
