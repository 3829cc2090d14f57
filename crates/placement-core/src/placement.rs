//! Tap-to-place furniture resolution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::FurnitureConfig;
use crate::engine::{ArEngine, HitResult, HitTestKind};
use crate::geometry::{ScreenPoint, Vec3};
use crate::scene::{FurnitureNode, NodeId, NodeKind};

/// A furniture instance committed to the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub node: NodeId,
    pub position: Vec3,
    pub scale: Vec3,
    pub model_path: String,
    pub placed_at: DateTime<Utc>,
}

impl PlacedObject {
    pub fn kind(&self) -> NodeKind {
        NodeKind::Furniture
    }
}

/// Turns screen taps into placed furniture
#[derive(Debug)]
pub struct PlacementResolver {
    furniture: FurnitureConfig,
    placed: Vec<PlacedObject>,
}

impl PlacementResolver {
    pub fn new(furniture: FurnitureConfig) -> Self {
        Self {
            furniture,
            placed: Vec::new(),
        }
    }

    /// Place furniture on the nearest horizontal surface under `point`.
    /// Tapping where no surface is detected does nothing.
    pub fn on_tap<E: ArEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        point: ScreenPoint,
    ) -> Option<PlacedObject> {
        let hits = engine.hit_test(point, HitTestKind::HorizontalPlaneEstimate);
        let Some(nearest) = nearest_hit(&hits) else {
            debug!(point = %point, "Tap missed every surface");
            return None;
        };

        let node = NodeId::new();
        let furniture = FurnitureNode {
            model_path: self.furniture.model_path.clone(),
            node_name: self.furniture.node_name.clone(),
            position: nearest.world_position,
            scale: Vec3::splat(self.furniture.scale),
        };
        engine.add_furniture(node, &furniture);

        let placed = PlacedObject {
            node,
            position: furniture.position,
            scale: furniture.scale,
            model_path: furniture.model_path,
            placed_at: Utc::now(),
        };
        info!(
            node = %node,
            position = %placed.position,
            distance = nearest.distance,
            "Placed furniture"
        );
        self.placed.push(placed.clone());
        Some(placed)
    }

    /// Remove every placed object. Returns how many were removed.
    pub fn clear<E: ArEngine + ?Sized>(&mut self, engine: &mut E) -> usize {
        let count = self.placed.len();
        for object in self.placed.drain(..) {
            engine.remove_node(object.node);
        }
        count
    }

    pub fn placed(&self) -> &[PlacedObject] {
        &self.placed
    }
}

/// Closest intersection; ties keep the engine's order
fn nearest_hit(hits: &[HitResult]) -> Option<&HitResult> {
    hits.iter().reduce(|best, hit| {
        if hit.distance < best.distance {
            hit
        } else {
            best
        }
    })
}
