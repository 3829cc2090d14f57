//! Boundary to the external AR/rendering engine
//!
//! The controller never talks to a concrete AR framework. Everything it needs
//! (hit-testing, session control, scene mutation, status display) goes through
//! [`ArEngine`]. All calls are synchronous and expected to complete; failures
//! come back as [`crate::ArEvent`]s on the notification stream instead.

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorId;
use crate::geometry::{ScreenPoint, Vec3};
use crate::scene::{DebugOptions, FurnitureNode, NodeId, OverlayGeometry};

/// Surface types a hit-test may intersect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTestKind {
    /// Horizontal planes estimated from the current frame
    HorizontalPlaneEstimate,
}

/// One intersection of a screen ray with a detected surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    pub world_position: Vec3,
    /// Distance from the camera in meters
    pub distance: f64,
}

impl HitResult {
    pub fn new(world_position: Vec3, distance: f64) -> Self {
        Self {
            world_position,
            distance,
        }
    }
}

/// How the session maps the real world onto scene coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldAlignment {
    #[default]
    Gravity,
    GravityAndHeading,
    Camera,
}

/// World-tracking session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub world_alignment: WorldAlignment,
    #[serde(default = "default_true")]
    pub horizontal_plane_detection: bool,
    #[serde(default = "default_true")]
    pub light_estimation: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            world_alignment: WorldAlignment::Gravity,
            horizontal_plane_detection: true,
            light_estimation: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Options for (re)running a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunOptions {
    pub reset_tracking: bool,
    pub remove_existing_anchors: bool,
}

impl RunOptions {
    /// Start over from scratch: new world origin, no anchors
    pub const RESET: RunOptions = RunOptions {
        reset_tracking: true,
        remove_existing_anchors: true,
    };
}

/// View settings applied once when the controller starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    #[serde(default = "default_true")]
    pub automatically_updates_lighting: bool,
    #[serde(default = "default_true")]
    pub show_statistics: bool,
    #[serde(default = "default_fps")]
    pub preferred_fps: u32,
    /// Multisample count; 0 disables antialiasing
    #[serde(default = "default_msaa")]
    pub antialiasing_samples: u32,
    #[serde(default = "default_debug_options")]
    pub debug_options: DebugOptions,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            automatically_updates_lighting: true,
            show_statistics: true,
            preferred_fps: default_fps(),
            antialiasing_samples: default_msaa(),
            debug_options: default_debug_options(),
        }
    }
}

fn default_fps() -> u32 {
    60
}

fn default_msaa() -> u32 {
    2
}

fn default_debug_options() -> DebugOptions {
    DebugOptions {
        world_origin: true,
        feature_points: true,
    }
}

/// The AR/rendering engine as seen from the controller
pub trait ArEngine {
    /// Whether the device supports world tracking at all
    fn supports_world_tracking(&self) -> bool {
        true
    }

    /// Hit-test the current frame, nearest result first
    fn hit_test(&self, point: ScreenPoint, kind: HitTestKind) -> Vec<HitResult>;

    /// Run (or rerun) the AR session
    fn run_session(&mut self, config: &SessionConfig, options: RunOptions);

    /// Apply view settings
    fn configure_view(&mut self, options: &ViewOptions);

    fn set_status_text(&mut self, text: &str);

    fn set_debug_options(&mut self, options: DebugOptions);

    /// Attach an overlay node to the anchor's node
    fn add_overlay(&mut self, anchor: &AnchorId, node: NodeId, geometry: &OverlayGeometry);

    /// Swap every overlay child of the anchor's node for a single new one
    fn replace_overlay(&mut self, anchor: &AnchorId, node: NodeId, geometry: &OverlayGeometry);

    fn add_furniture(&mut self, node: NodeId, furniture: &FurnitureNode);

    /// Detach a node from the scene graph
    fn remove_node(&mut self, node: NodeId);
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording engine used by the unit tests

    use super::*;
    use std::collections::{HashMap, HashSet};

    #[derive(Debug, Clone, PartialEq)]
    pub enum SceneCall {
        AddOverlay(AnchorId, NodeId),
        ReplaceOverlay(AnchorId, NodeId),
        AddFurniture(NodeId),
        RemoveNode(NodeId),
    }

    #[derive(Debug, Default)]
    pub struct MockEngine {
        /// Points that hit a surface, with their results
        pub hits: HashMap<(i64, i64), Vec<HitResult>>,
        /// Every point hits when set
        pub hit_everywhere: Option<HitResult>,
        pub unsupported: bool,
        pub hit_tests: std::cell::Cell<usize>,
        pub calls: Vec<SceneCall>,
        pub live_nodes: HashSet<NodeId>,
        pub anchor_children: HashMap<AnchorId, Vec<NodeId>>,
        pub overlays: HashMap<NodeId, OverlayGeometry>,
        pub furniture: HashMap<NodeId, FurnitureNode>,
        pub sessions: Vec<RunOptions>,
        pub views: usize,
        pub status: String,
        pub debug: Option<DebugOptions>,
    }

    fn key(point: ScreenPoint) -> (i64, i64) {
        (point.x.round() as i64, point.y.round() as i64)
    }

    impl MockEngine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_hit(&mut self, point: ScreenPoint, results: Vec<HitResult>) {
            self.hits.insert(key(point), results);
        }

        pub fn clear_hits(&mut self) {
            self.hits.clear();
            self.hit_everywhere = None;
        }
    }

    impl ArEngine for MockEngine {
        fn supports_world_tracking(&self) -> bool {
            !self.unsupported
        }

        fn hit_test(&self, point: ScreenPoint, _kind: HitTestKind) -> Vec<HitResult> {
            self.hit_tests.set(self.hit_tests.get() + 1);
            if let Some(hit) = self.hit_everywhere {
                return vec![hit];
            }
            self.hits.get(&key(point)).cloned().unwrap_or_default()
        }

        fn run_session(&mut self, _config: &SessionConfig, options: RunOptions) {
            self.sessions.push(options);
        }

        fn configure_view(&mut self, _options: &ViewOptions) {
            self.views += 1;
        }

        fn set_status_text(&mut self, text: &str) {
            self.status = text.to_string();
        }

        fn set_debug_options(&mut self, options: DebugOptions) {
            self.debug = Some(options);
        }

        fn add_overlay(&mut self, anchor: &AnchorId, node: NodeId, geometry: &OverlayGeometry) {
            self.calls.push(SceneCall::AddOverlay(anchor.clone(), node));
            self.live_nodes.insert(node);
            self.overlays.insert(node, *geometry);
            self.anchor_children.entry(anchor.clone()).or_default().push(node);
        }

        fn replace_overlay(&mut self, anchor: &AnchorId, node: NodeId, geometry: &OverlayGeometry) {
            self.calls.push(SceneCall::ReplaceOverlay(anchor.clone(), node));
            for old in self.anchor_children.remove(anchor).unwrap_or_default() {
                self.live_nodes.remove(&old);
                self.overlays.remove(&old);
            }
            self.live_nodes.insert(node);
            self.overlays.insert(node, *geometry);
            self.anchor_children.insert(anchor.clone(), vec![node]);
        }

        fn add_furniture(&mut self, node: NodeId, furniture: &FurnitureNode) {
            self.calls.push(SceneCall::AddFurniture(node));
            self.live_nodes.insert(node);
            self.furniture.insert(node, furniture.clone());
        }

        fn remove_node(&mut self, node: NodeId) {
            self.calls.push(SceneCall::RemoveNode(node));
            self.live_nodes.remove(&node);
            self.overlays.remove(&node);
            self.furniture.remove(&node);
            for children in self.anchor_children.values_mut() {
                children.retain(|n| *n != node);
            }
        }
    }
}
