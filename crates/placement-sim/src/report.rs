//! End-of-run session report

use chrono::{DateTime, Utc};
use placement_core::{
    AnchorId, ApplicationState, DebugOptions, Notification, PlacedObject, PlacementController,
    PlaneAlignment,
};
use serde::Serialize;

use crate::engine::SimEngine;

#[derive(Debug, Clone, Serialize)]
pub struct SurfaceReport {
    pub anchor: AnchorId,
    pub alignment: PlaneAlignment,
    pub width: f64,
    pub depth: f64,
    pub has_overlay: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub scenario: Option<String>,
    pub finished_at: DateTime<Utc>,
    pub state: ApplicationState,
    /// Status line as displayed by the engine
    pub status_text: String,
    pub debug_overlays: DebugOptions,
    pub view_configured: bool,
    pub sessions_run: usize,
    pub scene_nodes: usize,
    /// State transitions in order, e.g. "scanning -> ready"
    pub transitions: Vec<String>,
    pub notifications: usize,
    pub surfaces: Vec<SurfaceReport>,
    pub placed: Vec<PlacedObject>,
}

impl SessionReport {
    pub fn new(
        scenario: Option<String>,
        controller: &PlacementController<SimEngine>,
        notifications: &[Notification],
    ) -> Self {
        let mut surfaces: Vec<SurfaceReport> = controller
            .surfaces()
            .map(|s| SurfaceReport {
                anchor: s.id().clone(),
                alignment: s.alignment(),
                width: s.geometry.width,
                depth: s.geometry.depth,
                has_overlay: s.overlay.is_some(),
            })
            .collect();
        surfaces.sort_by(|a, b| a.anchor.cmp(&b.anchor));

        let transitions = notifications
            .iter()
            .filter_map(|n| match n {
                Notification::StateChanged { from, to } => Some(format!("{from} -> {to}")),
                _ => None,
            })
            .collect();

        Self {
            scenario,
            finished_at: Utc::now(),
            state: controller.state(),
            status_text: controller.engine().status().to_string(),
            debug_overlays: controller.engine().debug_options(),
            view_configured: controller.engine().view().is_some(),
            sessions_run: controller.engine().sessions().len(),
            scene_nodes: controller.engine().nodes().len(),
            transitions,
            notifications: notifications.len(),
            surfaces,
            placed: controller.placed_objects().to_vec(),
        }
    }

    /// Human-readable summary
    pub fn print(&self) {
        println!(
            "Scenario: {}",
            self.scenario.as_deref().unwrap_or("(unnamed)")
        );
        println!("Final state: {}", self.state);
        println!("Status: {}", self.status_text);
        println!("Sessions run: {}", self.sessions_run);
        if !self.view_configured {
            println!("View never configured (world tracking unsupported)");
        }
        if !self.transitions.is_empty() {
            println!("Transitions: {}", self.transitions.join(", "));
        }
        println!("Surfaces ({}):", self.surfaces.len());
        for surface in &self.surfaces {
            println!(
                "  - {} {} {:.2} x {:.2}{}",
                surface.anchor,
                surface.alignment,
                surface.width,
                surface.depth,
                if surface.has_overlay {
                    ""
                } else {
                    " (no overlay)"
                }
            );
        }
        println!("Placed objects ({}):", self.placed.len());
        for object in &self.placed {
            println!("  - {} at {}", object.model_path, object.position);
        }
        println!("Scene nodes: {}", self.scene_nodes);
    }
}
