//! Plane overlay bookkeeping
//!
//! Keeps one overlay node per tracked plane anchor. Updates rebuild the
//! overlay from the new anchor geometry instead of patching it, so the drawn
//! plane never lags behind the anchor's latest center and extent.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::anchor::{AnchorId, PlaneAlignment, PlaneAnchor};
use crate::engine::ArEngine;
use crate::scene::{NodeId, NodeKind, OverlayGeometry};

/// A detected plane and the overlay drawn for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneSurface {
    pub anchor: PlaneAnchor,
    /// Overlay node; `None` once a clear removed a vertical overlay
    pub overlay: Option<NodeId>,
    pub geometry: OverlayGeometry,
}

impl PlaneSurface {
    pub fn id(&self) -> &AnchorId {
        &self.anchor.id
    }

    pub fn alignment(&self) -> PlaneAlignment {
        self.anchor.alignment
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::overlay_for(self.anchor.alignment)
    }
}

/// Result of feeding an anchor event to the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayChange {
    /// A new overlay was drawn for a previously unknown anchor
    Added(PlaneAlignment),
    /// The anchor's overlay was rebuilt from new geometry
    Updated(PlaneAlignment),
    Removed,
    /// Nothing tracked under that identity
    Unknown,
}

impl OverlayChange {
    /// Whether a horizontal overlay was (re)drawn
    pub fn drew_horizontal(&self) -> bool {
        matches!(
            self,
            Self::Added(PlaneAlignment::Horizontal) | Self::Updated(PlaneAlignment::Horizontal)
        )
    }
}

/// Tracks every live plane anchor and its overlay node
#[derive(Debug, Default)]
pub struct PlaneOverlayManager {
    surfaces: HashMap<AnchorId, PlaneSurface>,
}

impl PlaneOverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw an overlay for a newly detected plane
    pub fn on_anchor_added<E: ArEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        anchor: &PlaneAnchor,
    ) -> OverlayChange {
        if self.surfaces.contains_key(&anchor.id) {
            debug!(anchor = %anchor.id, "Anchor added twice, refreshing overlay");
            return self.on_anchor_updated(engine, anchor);
        }

        info!(
            anchor = %anchor.id,
            alignment = %anchor.alignment,
            center = %anchor.center,
            "Found plane"
        );

        let node = NodeId::new();
        let geometry = OverlayGeometry::from_anchor(anchor);
        engine.add_overlay(&anchor.id, node, &geometry);
        self.surfaces.insert(
            anchor.id.clone(),
            PlaneSurface {
                anchor: anchor.clone(),
                overlay: Some(node),
                geometry,
            },
        );
        OverlayChange::Added(anchor.alignment)
    }

    /// Replace the overlay with one built from the updated geometry
    pub fn on_anchor_updated<E: ArEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        anchor: &PlaneAnchor,
    ) -> OverlayChange {
        let Some(surface) = self.surfaces.get_mut(&anchor.id) else {
            debug!(anchor = %anchor.id, "Update for untracked anchor, treating as new");
            return self.on_anchor_added(engine, anchor);
        };

        let node = NodeId::new();
        let geometry = OverlayGeometry::from_anchor(anchor);
        engine.replace_overlay(&anchor.id, node, &geometry);

        surface.anchor = anchor.clone();
        surface.overlay = Some(node);
        surface.geometry = geometry;

        debug!(
            anchor = %anchor.id,
            width = geometry.width,
            depth = geometry.depth,
            "Refreshed plane overlay"
        );
        OverlayChange::Updated(anchor.alignment)
    }

    /// Drop the overlay of an anchor the engine stopped tracking
    pub fn on_anchor_removed<E: ArEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        id: &AnchorId,
    ) -> OverlayChange {
        match self.surfaces.remove(id) {
            Some(surface) => {
                if let Some(node) = surface.overlay {
                    engine.remove_node(node);
                }
                info!(anchor = %id, alignment = %surface.anchor.alignment, "Plane removed");
                OverlayChange::Removed
            }
            None => {
                debug!(anchor = %id, "Removal for untracked anchor ignored");
                OverlayChange::Unknown
            }
        }
    }

    /// Remove vertical overlays, keeping the surfaces tracked. Returns how many
    /// nodes were removed.
    pub fn clear_vertical<E: ArEngine + ?Sized>(&mut self, engine: &mut E) -> usize {
        let mut removed = 0;
        for surface in self.surfaces.values_mut() {
            if surface.alignment() != PlaneAlignment::Vertical {
                continue;
            }
            if let Some(node) = surface.overlay.take() {
                engine.remove_node(node);
                removed += 1;
            }
        }
        removed
    }

    /// Remove every overlay and forget every surface
    pub fn remove_all<E: ArEngine + ?Sized>(&mut self, engine: &mut E) -> usize {
        let count = self.surfaces.len();
        for (_, surface) in self.surfaces.drain() {
            if let Some(node) = surface.overlay {
                engine.remove_node(node);
            }
        }
        count
    }

    pub fn get(&self, id: &AnchorId) -> Option<&PlaneSurface> {
        self.surfaces.get(id)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &PlaneSurface> {
        self.surfaces.values()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Number of overlay nodes currently in the scene
    pub fn overlay_count(&self) -> usize {
        self.surfaces.values().filter(|s| s.overlay.is_some()).count()
    }
}
