//! Placement controller
//!
//! Owns the application state, every tracked surface and every placed object,
//! and processes one [`ArEvent`] at a time. Callers are expected to feed it
//! from a single serialized path (see `placement-runtime`); nothing in here
//! blocks or locks.
//!
//! Frame handling order is fixed: the tracking status from the latest
//! tracking event is already in place, the application state is recomputed,
//! then the status line and debug overlays are pushed to the engine.

use tracing::{debug, info, warn};

use crate::anchor::AnchorId;
use crate::config::PlacementConfig;
use crate::coverage::SurfaceSampler;
use crate::engine::{ArEngine, RunOptions};
use crate::event::{AnchorEvent, ArEvent, Notification};
use crate::geometry::{ScreenPoint, Viewport};
use crate::overlay::{OverlayChange, PlaneOverlayManager, PlaneSurface};
use crate::placement::{PlacedObject, PlacementResolver};
use crate::scene::DebugOptions;
use crate::state::{ApplicationState, StateMachine};
use crate::tracking::{TrackingQuality, TrackingStatus};

const SESSION_INTERRUPTED: &str = "AR session was interrupted!";
const SESSION_INTERRUPTION_ENDED: &str = "AR session interruption ended.";

/// Surface tracking state machine and placement pipeline around an engine
pub struct PlacementController<E> {
    engine: E,
    config: PlacementConfig,
    machine: StateMachine,
    sampler: SurfaceSampler,
    overlays: PlaneOverlayManager,
    placement: PlacementResolver,
    tracking: TrackingStatus,
    /// Tracking or session problem shown instead of placement guidance
    tracking_message: String,
    /// Last status line pushed to the engine
    status_text: String,
    /// Last debug overlay set pushed to the engine
    debug_options: Option<DebugOptions>,
    session_running: bool,
}

impl<E: ArEngine> PlacementController<E> {
    pub fn new(engine: E, config: PlacementConfig) -> Self {
        Self {
            engine,
            sampler: SurfaceSampler::new(config.coverage.grid_divisions),
            placement: PlacementResolver::new(config.furniture.clone()),
            config,
            machine: StateMachine::new(),
            overlays: PlaneOverlayManager::new(),
            tracking: TrackingStatus::default(),
            tracking_message: TrackingStatus::default().message().to_string(),
            status_text: String::new(),
            debug_options: None,
            session_running: false,
        }
    }

    /// Configure the view and run the AR session. Returns false when the
    /// device cannot do world tracking, in which case no session is started.
    pub fn start(&mut self) -> bool {
        if !self.engine.supports_world_tracking() {
            warn!("World tracking not supported on this device, session not started");
            return false;
        }

        self.engine.configure_view(&self.config.view);
        self.debug_options = Some(self.config.view.debug_options);
        self.engine.run_session(&self.config.session, RunOptions::default());
        self.session_running = true;

        info!(
            alignment = ?self.config.session.world_alignment,
            plane_detection = self.config.session.horizontal_plane_detection,
            light_estimation = self.config.session.light_estimation,
            "AR session started"
        );
        true
    }

    /// Process one event, returning what changed
    pub fn handle(&mut self, event: ArEvent) -> Vec<Notification> {
        let mut out = Vec::new();
        match event {
            ArEvent::TrackingChanged(quality) => self.on_tracking_changed(quality),
            ArEvent::Frame(viewport) => self.on_frame(viewport, &mut out),
            ArEvent::AnchorAdded(anchor) | ArEvent::AnchorUpdated(anchor) => {
                self.on_anchor_changed(anchor, &mut out)
            }
            ArEvent::AnchorRemoved(anchor) => self.on_anchor_removed(anchor.id(), &mut out),
            ArEvent::Tap(point) => self.on_tap(point, &mut out),
            ArEvent::ClearRequested => self.clear(&mut out),
            ArEvent::ResetRequested => {
                info!("Session reset requested");
                self.reset(&mut out);
            }
            ArEvent::SessionFailed(error) => {
                warn!(error = %error, "AR session failed");
                self.tracking_message = format!("AR session failure: {error}");
            }
            ArEvent::SessionInterrupted => {
                warn!("AR session interrupted");
                self.tracking_message = SESSION_INTERRUPTED.to_string();
            }
            ArEvent::SessionInterruptionEnded => {
                info!("AR session interruption ended, resetting");
                self.tracking_message = SESSION_INTERRUPTION_ENDED.to_string();
                self.reset(&mut out);
            }
        }
        out
    }

    fn on_tracking_changed(&mut self, quality: TrackingQuality) {
        let status = TrackingStatus::classify(quality);
        if status != self.tracking {
            debug!(from = ?self.tracking, to = ?status, "Tracking status changed");
        }
        self.tracking = status;
        self.tracking_message = status.message().to_string();
    }

    fn on_frame(&mut self, viewport: Viewport, out: &mut Vec<Notification>) {
        let from = self.machine.state();
        let sampler = &self.sampler;
        let engine = &self.engine;
        let to = self
            .machine
            .on_frame(|| sampler.is_surface_visible(engine, viewport));
        push_transition(from, to, out);
        self.render_status(out);
    }

    fn on_anchor_changed(&mut self, anchor: AnchorEvent, out: &mut Vec<Notification>) {
        let plane = match anchor {
            AnchorEvent::Plane(plane) => plane,
            AnchorEvent::Other { id } => {
                debug!(anchor = %id, "Ignoring non-plane anchor");
                return;
            }
        };

        let change = if self.overlays.get(&plane.id).is_some() {
            self.overlays.on_anchor_updated(&mut self.engine, &plane)
        } else {
            self.overlays.on_anchor_added(&mut self.engine, &plane)
        };

        match change {
            OverlayChange::Added(_) => out.push(Notification::SurfaceAdded {
                anchor: plane.id.clone(),
            }),
            OverlayChange::Updated(_) => out.push(Notification::SurfaceUpdated {
                anchor: plane.id.clone(),
            }),
            OverlayChange::Removed | OverlayChange::Unknown => {}
        }

        if change.drew_horizontal() {
            let from = self.machine.state();
            let to = self.machine.surface_detected();
            push_transition(from, to, out);
        }
    }

    fn on_anchor_removed(&mut self, id: &AnchorId, out: &mut Vec<Notification>) {
        if self.overlays.on_anchor_removed(&mut self.engine, id) == OverlayChange::Removed {
            out.push(Notification::SurfaceRemoved { anchor: id.clone() });
        }
    }

    fn on_tap(&mut self, point: ScreenPoint, out: &mut Vec<Notification>) {
        if let Some(object) = self.placement.on_tap(&mut self.engine, point) {
            out.push(Notification::ObjectPlaced { object });
        }
    }

    /// Remove placed furniture and vertical overlays; horizontal grids stay
    fn clear(&mut self, out: &mut Vec<Notification>) {
        let furniture = self.placement.clear(&mut self.engine);
        let overlays = self.overlays.clear_vertical(&mut self.engine);
        info!(furniture, overlays, "Cleared furniture");
        out.push(Notification::ObjectsCleared {
            furniture,
            overlays,
        });
    }

    /// Drop every entity, rerun the session from scratch, go back to scanning
    fn reset(&mut self, out: &mut Vec<Notification>) {
        self.clear(out);
        let surfaces = self.overlays.remove_all(&mut self.engine);

        if self.session_running {
            self.engine.run_session(&self.config.session, RunOptions::RESET);
        }

        let from = self.machine.state();
        self.machine.reset();
        push_transition(from, self.machine.state(), out);

        info!(surfaces, "Session reset");
        out.push(Notification::SessionReset);
    }

    fn render_status(&mut self, out: &mut Vec<Notification>) {
        let state = self.machine.state();

        let debug_options = state.debug_options();
        if self.debug_options != Some(debug_options) {
            self.engine.set_debug_options(debug_options);
            self.debug_options = Some(debug_options);
        }

        let text = self.machine.status_text(&self.tracking_message);
        if text != self.status_text {
            self.status_text = text.to_string();
            self.engine.set_status_text(&self.status_text);
            out.push(Notification::StatusChanged {
                text: self.status_text.clone(),
            });
        }
    }

    pub fn state(&self) -> ApplicationState {
        self.machine.state()
    }

    pub fn tracking_status(&self) -> TrackingStatus {
        self.tracking
    }

    /// Current tracking/session problem, empty when there is none
    pub fn tracking_message(&self) -> &str {
        &self.tracking_message
    }

    /// Status line as last shown to the user
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn is_session_running(&self) -> bool {
        self.session_running
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &PlaneSurface> {
        self.overlays.surfaces()
    }

    pub fn surface_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn placed_objects(&self) -> &[PlacedObject] {
        self.placement.placed()
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}

fn push_transition(from: ApplicationState, to: ApplicationState, out: &mut Vec<Notification>) {
    if from != to {
        info!(from = %from, to = %to, "Application state changed");
        out.push(Notification::StateChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{PlaneAlignment, PlaneAnchor};
    use crate::engine::mock::MockEngine;
    use crate::engine::HitResult;
    use crate::geometry::Vec3;
    use crate::scene::NodeKind;
    use crate::tracking::LimitedReason;

    const VIEW: Viewport = Viewport::new(375.0, 812.0);

    fn controller() -> PlacementController<MockEngine> {
        let mut c = PlacementController::new(MockEngine::new(), PlacementConfig::default());
        assert!(c.start());
        c
    }

    fn plane(id: &str, alignment: PlaneAlignment) -> AnchorEvent {
        AnchorEvent::Plane(PlaneAnchor::new(
            AnchorId::new(id),
            alignment,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 2.0),
        ))
    }

    fn surface_everywhere(c: &mut PlacementController<MockEngine>) {
        c.engine_mut().hit_everywhere = Some(HitResult::new(Vec3::new(0.1, -1.0, -0.5), 1.1));
    }

    /// Drive the controller into `Ready` with a floor and a wall
    fn ready_with_content() -> PlacementController<MockEngine> {
        let mut c = controller();
        c.handle(ArEvent::AnchorAdded(plane("floor", PlaneAlignment::Horizontal)));
        c.handle(ArEvent::AnchorAdded(plane("wall", PlaneAlignment::Vertical)));
        surface_everywhere(&mut c);
        c.handle(ArEvent::Tap(ScreenPoint::new(100.0, 400.0)));
        c.handle(ArEvent::Frame(VIEW));
        assert_eq!(c.state(), ApplicationState::Ready);
        assert_eq!(c.placed_objects().len(), 1);
        c
    }

    #[test]
    fn test_fresh_controller_tracking_is_consistent() {
        let c = PlacementController::new(MockEngine::new(), PlacementConfig::default());
        assert_eq!(c.tracking_status(), TrackingStatus::Normal);
        assert_eq!(c.tracking_message(), c.tracking_status().message());
        assert_eq!(c.status_text(), "");
    }

    #[test]
    fn test_start_configures_session_and_view() {
        let c = controller();
        assert!(c.is_session_running());
        assert_eq!(c.engine().sessions, vec![RunOptions::default()]);
        assert_eq!(c.engine().views, 1);
    }

    #[test]
    fn test_unsupported_device_does_not_start() {
        let mut engine = MockEngine::new();
        engine.unsupported = true;
        let mut c = PlacementController::new(engine, PlacementConfig::default());
        assert!(!c.start());
        assert!(c.engine().sessions.is_empty());
        assert!(!c.is_session_running());
    }

    #[test]
    fn test_visibility_alone_never_leaves_scanning() {
        let mut c = controller();
        surface_everywhere(&mut c);
        for _ in 0..30 {
            c.handle(ArEvent::Frame(VIEW));
        }
        assert_eq!(c.state(), ApplicationState::Scanning);
        assert_eq!(c.engine().hit_tests.get(), 0);
        assert_eq!(c.engine().debug, Some(DebugOptions::FEATURE_POINTS));
        assert_eq!(c.status_text(), ApplicationState::Scanning.message());
    }

    #[test]
    fn test_horizontal_anchor_forces_ready() {
        let mut c = controller();
        let out = c.handle(ArEvent::AnchorAdded(plane("floor", PlaneAlignment::Horizontal)));
        assert_eq!(c.state(), ApplicationState::Ready);
        assert!(out.contains(&Notification::StateChanged {
            from: ApplicationState::Scanning,
            to: ApplicationState::Ready,
        }));
    }

    #[test]
    fn test_vertical_anchor_does_not_force_ready() {
        let mut c = controller();
        c.handle(ArEvent::AnchorAdded(plane("wall", PlaneAlignment::Vertical)));
        assert_eq!(c.state(), ApplicationState::Scanning);
        assert_eq!(c.surface_count(), 1);
    }

    #[test]
    fn test_horizontal_update_forces_ready_from_aiming() {
        let mut c = controller();
        c.handle(ArEvent::AnchorAdded(plane("floor", PlaneAlignment::Horizontal)));
        c.handle(ArEvent::Frame(VIEW));
        assert_eq!(c.state(), ApplicationState::Aiming);

        let out = c.handle(ArEvent::AnchorUpdated(plane("floor", PlaneAlignment::Horizontal)));
        assert_eq!(c.state(), ApplicationState::Ready);
        assert!(out.contains(&Notification::SurfaceUpdated {
            anchor: AnchorId::new("floor")
        }));
    }

    #[test]
    fn test_ready_aiming_follow_visibility() {
        let mut c = controller();
        c.handle(ArEvent::AnchorAdded(plane("floor", PlaneAlignment::Horizontal)));

        c.handle(ArEvent::Frame(VIEW));
        assert_eq!(c.state(), ApplicationState::Aiming);
        assert_eq!(c.status_text(), ApplicationState::Aiming.message());
        assert_eq!(c.engine().debug, Some(DebugOptions::NONE));

        surface_everywhere(&mut c);
        c.handle(ArEvent::Frame(VIEW));
        assert_eq!(c.state(), ApplicationState::Ready);

        c.engine_mut().clear_hits();
        c.handle(ArEvent::Frame(VIEW));
        assert_eq!(c.state(), ApplicationState::Aiming);
    }

    #[test]
    fn test_tracking_message_overrides_and_recovers() {
        let mut c = controller();
        c.handle(ArEvent::TrackingChanged(TrackingQuality::Limited(
            LimitedReason::ExcessiveMotion,
        )));
        assert_eq!(c.state(), ApplicationState::Scanning);
        let out = c.handle(ArEvent::Frame(VIEW));
        let expected = TrackingStatus::Limited(LimitedReason::ExcessiveMotion).message();
        assert_eq!(c.status_text(), expected);
        assert_eq!(c.engine().status, expected);
        assert!(out.contains(&Notification::StatusChanged {
            text: expected.to_string()
        }));

        c.handle(ArEvent::TrackingChanged(TrackingQuality::Normal));
        c.handle(ArEvent::Frame(VIEW));
        assert_eq!(c.status_text(), ApplicationState::Scanning.message());
        assert!(c.tracking_status().is_normal());
    }

    #[test]
    fn test_unchanged_status_is_not_renotified() {
        let mut c = controller();
        assert!(!c.handle(ArEvent::Frame(VIEW)).is_empty());
        assert!(c.handle(ArEvent::Frame(VIEW)).is_empty());
    }

    #[test]
    fn test_tap_without_hit_changes_nothing() {
        let mut c = controller();
        c.handle(ArEvent::AnchorAdded(plane("floor", PlaneAlignment::Horizontal)));
        let out = c.handle(ArEvent::Tap(ScreenPoint::new(10.0, 10.0)));
        assert!(out.is_empty());
        assert!(c.placed_objects().is_empty());
        assert_eq!(c.state(), ApplicationState::Ready);
    }

    #[test]
    fn test_tap_with_hit_places_one_object() {
        let mut c = controller();
        let tap = ScreenPoint::new(180.0, 500.0);
        c.engine_mut().add_hit(
            tap,
            vec![
                HitResult::new(Vec3::new(0.3, -1.1, -0.9), 0.9),
                HitResult::new(Vec3::new(0.6, -1.4, -2.2), 2.0),
            ],
        );
        let out = c.handle(ArEvent::Tap(tap));

        assert_eq!(c.placed_objects().len(), 1);
        let object = &c.placed_objects()[0];
        assert_eq!(object.position, Vec3::new(0.3, -1.1, -0.9));
        assert_eq!(object.scale, Vec3::splat(0.8));
        assert_eq!(out, vec![Notification::ObjectPlaced { object: object.clone() }]);
    }

    #[test]
    fn test_anchor_removed_removes_only_that_overlay() {
        let mut c = controller();
        c.handle(ArEvent::AnchorAdded(plane("a", PlaneAlignment::Horizontal)));
        c.handle(ArEvent::AnchorAdded(plane("b", PlaneAlignment::Horizontal)));
        let out = c.handle(ArEvent::AnchorRemoved(plane("a", PlaneAlignment::Horizontal)));

        assert_eq!(out, vec![Notification::SurfaceRemoved { anchor: AnchorId::new("a") }]);
        let remaining: Vec<_> = c.surfaces().map(|s| s.id().clone()).collect();
        assert_eq!(remaining, vec![AnchorId::new("b")]);
        assert_eq!(c.engine().live_nodes.len(), 1);
    }

    #[test]
    fn test_non_plane_anchors_ignored() {
        let mut c = controller();
        let out = c.handle(ArEvent::AnchorAdded(AnchorEvent::Other {
            id: AnchorId::new("image"),
        }));
        assert!(out.is_empty());
        assert_eq!(c.surface_count(), 0);
        assert_eq!(c.state(), ApplicationState::Scanning);
    }

    #[test]
    fn test_clear_keeps_horizontal_overlays() {
        let mut c = ready_with_content();
        let floor_before = c
            .surfaces()
            .find(|s| s.kind() == NodeKind::HorizontalOverlay)
            .cloned()
            .unwrap();

        let out = c.handle(ArEvent::ClearRequested);
        assert_eq!(
            out,
            vec![Notification::ObjectsCleared {
                furniture: 1,
                overlays: 1
            }]
        );

        assert!(c.placed_objects().is_empty());
        let floor_after = c
            .surfaces()
            .find(|s| s.kind() == NodeKind::HorizontalOverlay)
            .unwrap();
        assert_eq!(floor_after, &floor_before);
        assert!(c.engine().live_nodes.contains(&floor_before.overlay.unwrap()));
        assert_eq!(c.engine().live_nodes.len(), 1);
        assert!(c.engine().furniture.is_empty());
        assert_eq!(c.state(), ApplicationState::Ready);
    }

    #[test]
    fn test_reset_from_every_state() {
        // Ready
        let mut c = ready_with_content();
        c.handle(ArEvent::ResetRequested);
        assert_eq!(c.state(), ApplicationState::Scanning);
        assert_eq!(c.surface_count(), 0);
        assert!(c.placed_objects().is_empty());
        assert!(c.engine().live_nodes.is_empty());
        assert_eq!(c.engine().sessions.last(), Some(&RunOptions::RESET));

        // Aiming
        let mut c = ready_with_content();
        c.engine_mut().clear_hits();
        c.handle(ArEvent::Frame(VIEW));
        assert_eq!(c.state(), ApplicationState::Aiming);
        c.handle(ArEvent::ResetRequested);
        assert_eq!(c.state(), ApplicationState::Scanning);
        assert_eq!(c.surface_count(), 0);
        assert!(c.placed_objects().is_empty());

        // Scanning
        let mut c = controller();
        c.handle(ArEvent::AnchorAdded(plane("wall", PlaneAlignment::Vertical)));
        let out = c.handle(ArEvent::ResetRequested);
        assert_eq!(c.state(), ApplicationState::Scanning);
        assert_eq!(c.surface_count(), 0);
        assert_eq!(out.last(), Some(&Notification::SessionReset));
    }

    #[test]
    fn test_interruption_end_matches_reset() {
        let mut reset = ready_with_content();
        let mut interrupted = ready_with_content();

        reset.handle(ArEvent::ResetRequested);
        interrupted.handle(ArEvent::SessionInterrupted);
        let out = interrupted.handle(ArEvent::SessionInterruptionEnded);

        assert!(out.contains(&Notification::SessionReset));
        assert_eq!(interrupted.state(), reset.state());
        assert_eq!(interrupted.surface_count(), reset.surface_count());
        assert_eq!(interrupted.placed_objects().len(), reset.placed_objects().len());
        assert_eq!(interrupted.engine().sessions, reset.engine().sessions);
        assert_eq!(interrupted.tracking_message(), SESSION_INTERRUPTION_ENDED);
    }

    #[test]
    fn test_session_failure_is_message_only() {
        let mut c = ready_with_content();
        let out = c.handle(ArEvent::SessionFailed("camera unavailable".to_string()));
        assert!(out.is_empty());
        assert_eq!(c.state(), ApplicationState::Ready);
        assert_eq!(c.placed_objects().len(), 1);
        assert_eq!(c.engine().sessions.len(), 1);

        c.handle(ArEvent::Frame(VIEW));
        assert_eq!(c.status_text(), "AR session failure: camera unavailable");

        // Next tracking event replaces the message
        c.handle(ArEvent::TrackingChanged(TrackingQuality::Normal));
        c.handle(ArEvent::Frame(VIEW));
        assert_eq!(c.status_text(), ApplicationState::Ready.message());
    }

    #[test]
    fn test_tracking_loss_keeps_state() {
        let mut c = ready_with_content();
        c.handle(ArEvent::TrackingChanged(TrackingQuality::NotAvailable));
        assert_eq!(c.state(), ApplicationState::Ready);
        assert_eq!(c.engine().sessions.len(), 1);
    }
}
