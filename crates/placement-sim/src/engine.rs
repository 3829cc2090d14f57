//! Simulated AR engine
//!
//! The simulated world is a set of rectangular screen regions, each showing
//! a patch of horizontal surface. A hit-test inside a region returns a world
//! position interpolated across the patch. The engine records every scene
//! mutation so the final scene can be reported.

use placement_core::{
    AnchorId, ArEngine, DebugOptions, FurnitureNode, HitResult, HitTestKind, NodeId,
    OverlayGeometry, RunOptions, ScreenPoint, SessionConfig, Vec3, ViewOptions,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace};

/// A horizontal surface patch visible in a screen region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfacePatch {
    /// Screen rectangle as [left, top, right, bottom]
    pub rect: [f64; 4],
    /// World position under the rectangle's top-left corner
    pub origin: [f64; 3],
    /// World extent (x, z) spanned by the rectangle
    pub size: [f64; 2],
    /// Camera distance reported for hits on this patch
    pub distance: f64,
}

impl SurfacePatch {
    fn hit(&self, point: ScreenPoint) -> Option<HitResult> {
        let [left, top, right, bottom] = self.rect;
        if point.x < left || point.x > right || point.y < top || point.y > bottom {
            return None;
        }
        let u = if right > left {
            (point.x - left) / (right - left)
        } else {
            0.0
        };
        let v = if bottom > top {
            (point.y - top) / (bottom - top)
        } else {
            0.0
        };
        let origin = Vec3::from_array(self.origin);
        let offset = Vec3::new(u * self.size[0], 0.0, v * self.size[1]);
        Some(HitResult::new(origin + offset, self.distance))
    }
}

/// What the simulated camera currently sees
#[derive(Debug, Default)]
pub struct SimWorld {
    patches: Vec<SurfacePatch>,
}

impl SimWorld {
    pub fn shared() -> Arc<Mutex<SimWorld>> {
        Arc::new(Mutex::new(SimWorld::default()))
    }

    pub fn add_patch(&mut self, patch: SurfacePatch) {
        self.patches.push(patch);
    }

    pub fn clear(&mut self) {
        self.patches.clear();
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    fn hit_test(&self, point: ScreenPoint) -> Vec<HitResult> {
        let mut hits: Vec<HitResult> = self.patches.iter().filter_map(|p| p.hit(point)).collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Lock the world, recovering from a panicked writer
pub fn lock_world(world: &Mutex<SimWorld>) -> MutexGuard<'_, SimWorld> {
    world.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Kind of node present in the simulated scene graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimNode {
    Overlay {
        anchor: AnchorId,
        geometry: OverlayGeometry,
    },
    Furniture(FurnitureNode),
}

/// Engine that answers hit-tests from a [`SimWorld`] and records the scene
pub struct SimEngine {
    world: Arc<Mutex<SimWorld>>,
    supported: bool,
    nodes: HashMap<NodeId, SimNode>,
    sessions: Vec<RunOptions>,
    view: Option<ViewOptions>,
    status: String,
    debug_options: DebugOptions,
}

impl SimEngine {
    pub fn new(world: Arc<Mutex<SimWorld>>, supported: bool) -> Self {
        Self {
            world,
            supported,
            nodes: HashMap::new(),
            sessions: Vec::new(),
            view: None,
            status: String::new(),
            debug_options: DebugOptions::NONE,
        }
    }

    pub fn nodes(&self) -> &HashMap<NodeId, SimNode> {
        &self.nodes
    }

    pub fn sessions(&self) -> &[RunOptions] {
        &self.sessions
    }

    pub fn view(&self) -> Option<&ViewOptions> {
        self.view.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn debug_options(&self) -> DebugOptions {
        self.debug_options
    }

    fn drop_anchor_children(&mut self, anchor: &AnchorId) {
        self.nodes
            .retain(|_, node| !matches!(node, SimNode::Overlay { anchor: a, .. } if a == anchor));
    }
}

impl ArEngine for SimEngine {
    fn supports_world_tracking(&self) -> bool {
        self.supported
    }

    fn hit_test(&self, point: ScreenPoint, kind: HitTestKind) -> Vec<HitResult> {
        let hits = lock_world(&self.world).hit_test(point);
        trace!(point = %point, ?kind, hits = hits.len(), "Hit test");
        hits
    }

    fn run_session(&mut self, config: &SessionConfig, options: RunOptions) {
        debug!(?config, ?options, "Running session");
        if options.remove_existing_anchors {
            self.nodes.retain(|_, node| !matches!(node, SimNode::Overlay { .. }));
        }
        self.sessions.push(options);
    }

    fn configure_view(&mut self, options: &ViewOptions) {
        self.debug_options = options.debug_options;
        self.view = Some(options.clone());
    }

    fn set_status_text(&mut self, text: &str) {
        debug!(text, "Status");
        self.status = text.to_string();
    }

    fn set_debug_options(&mut self, options: DebugOptions) {
        self.debug_options = options;
    }

    fn add_overlay(&mut self, anchor: &AnchorId, node: NodeId, geometry: &OverlayGeometry) {
        self.nodes.insert(
            node,
            SimNode::Overlay {
                anchor: anchor.clone(),
                geometry: *geometry,
            },
        );
    }

    fn replace_overlay(&mut self, anchor: &AnchorId, node: NodeId, geometry: &OverlayGeometry) {
        self.drop_anchor_children(anchor);
        self.add_overlay(anchor, node, geometry);
    }

    fn add_furniture(&mut self, node: NodeId, furniture: &FurnitureNode) {
        self.nodes.insert(node, SimNode::Furniture(furniture.clone()));
    }

    fn remove_node(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }
}
