//! Anchor types reported by the AR engine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Vec3;

/// Stable identifier of an engine anchor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub String);

impl AnchorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate an identifier for engines that do not hand one out
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Orientation class of a detected plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneAlignment {
    Horizontal,
    Vertical,
}

impl PlaneAlignment {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Horizontal)
    }
}

impl std::fmt::Display for PlaneAlignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Horizontal => write!(f, "Horizontal"),
            Self::Vertical => write!(f, "Vertical"),
        }
    }
}

/// A detected planar surface as reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneAnchor {
    pub id: AnchorId,
    pub alignment: PlaneAlignment,
    /// Center of the plane relative to the anchor node
    pub center: Vec3,
    /// Estimated size; `x` is the width and `z` the depth, `y` is unused
    pub extent: Vec3,
}

impl PlaneAnchor {
    pub fn new(id: AnchorId, alignment: PlaneAlignment, center: Vec3, extent: Vec3) -> Self {
        Self {
            id,
            alignment,
            center,
            extent,
        }
    }

    pub fn width(&self) -> f64 {
        self.extent.x
    }

    pub fn depth(&self) -> f64 {
        self.extent.z
    }
}
