//! Scenario files: scripted sequences of engine events and world changes
//!
//! ```toml
//! name = "place a crib"
//!
//! [[step]]
//! event = "anchor_added"
//! id = "floor"
//! alignment = "horizontal"
//! extent = [2.0, 0.0, 3.0]
//!
//! [[step]]
//! event = "frame"
//! repeat = 10
//! ```

use anyhow::{Context, Result};
use placement_core::{
    AnchorEvent, AnchorId, ArEvent, LimitedReason, PlaneAlignment, PlaneAnchor, ScreenPoint,
    TrackingQuality, Vec3, Viewport,
};
use serde::Deserialize;
use std::path::Path;

use crate::engine::SurfacePatch;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    /// Number of times to run the step
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Pause after each repetition
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityName {
    Normal,
    NotAvailable,
    Limited,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaneFields {
    pub id: String,
    pub alignment: PlaneAlignment,
    #[serde(default)]
    pub center: [f64; 3],
    pub extent: [f64; 3],
}

impl PlaneFields {
    fn to_event(&self) -> AnchorEvent {
        AnchorEvent::Plane(PlaneAnchor::new(
            AnchorId::new(self.id.clone()),
            self.alignment,
            Vec3::from_array(self.center),
            Vec3::from_array(self.extent),
        ))
    }
}

/// One scripted step
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Action {
    Tracking {
        quality: QualityName,
        #[serde(default)]
        reason: Option<LimitedReason>,
    },
    Frame,
    AnchorAdded(PlaneFields),
    AnchorUpdated(PlaneFields),
    AnchorRemoved {
        id: String,
    },
    /// Anchor of a kind the controller does not draw (image, face, ...)
    OtherAnchor {
        id: String,
    },
    Tap {
        x: f64,
        y: f64,
    },
    Clear,
    Reset,
    SessionFailed {
        error: String,
    },
    Interrupted,
    InterruptionEnded,
    /// Make a surface patch visible to the simulated camera
    Surface(SurfacePatch),
    /// Point the simulated camera away from every surface
    ClearSurfaces,
}

/// What the replayer does for a step
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Event(ArEvent),
    AddSurface(SurfacePatch),
    ClearSurfaces,
}

impl Action {
    pub fn to_command(&self, viewport: Viewport) -> Result<Command> {
        let event = match self {
            Action::Tracking { quality, reason } => {
                let quality = match (quality, reason) {
                    (QualityName::Normal, _) => TrackingQuality::Normal,
                    (QualityName::NotAvailable, _) => TrackingQuality::NotAvailable,
                    (QualityName::Limited, Some(reason)) => TrackingQuality::Limited(*reason),
                    (QualityName::Limited, None) => {
                        anyhow::bail!("tracking step with quality = \"limited\" needs a reason")
                    }
                };
                ArEvent::TrackingChanged(quality)
            }
            Action::Frame => ArEvent::Frame(viewport),
            Action::AnchorAdded(plane) => ArEvent::AnchorAdded(plane.to_event()),
            Action::AnchorUpdated(plane) => ArEvent::AnchorUpdated(plane.to_event()),
            // Removal is keyed by identity only; the geometry is never read
            Action::AnchorRemoved { id } => ArEvent::AnchorRemoved(AnchorEvent::Plane(
                PlaneAnchor::new(
                    AnchorId::new(id.clone()),
                    PlaneAlignment::Horizontal,
                    Vec3::ZERO,
                    Vec3::ZERO,
                ),
            )),
            Action::OtherAnchor { id } => ArEvent::AnchorAdded(AnchorEvent::Other {
                id: AnchorId::new(id.clone()),
            }),
            Action::Tap { x, y } => ArEvent::Tap(ScreenPoint::new(*x, *y)),
            Action::Clear => ArEvent::ClearRequested,
            Action::Reset => ArEvent::ResetRequested,
            Action::SessionFailed { error } => ArEvent::SessionFailed(error.clone()),
            Action::Interrupted => ArEvent::SessionInterrupted,
            Action::InterruptionEnded => ArEvent::SessionInterruptionEnded,
            Action::Surface(patch) => return Ok(Command::AddSurface(patch.clone())),
            Action::ClearSurfaces => return Ok(Command::ClearSurfaces),
        };
        Ok(Command::Event(event))
    }
}

impl Scenario {
    pub fn from_toml(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        Ok(scenario)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// Total number of step executions, repeats included
    pub fn len(&self) -> usize {
        self.steps.iter().map(|s| s.repeat as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport::new(375.0, 812.0);

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_toml(
            r#"
name = "demo"

[[step]]
event = "tracking"
quality = "limited"
reason = "initializing"

[[step]]
event = "anchor_added"
id = "floor"
alignment = "horizontal"
center = [0.0, 0.0, 0.5]
extent = [2.0, 0.0, 3.0]

[[step]]
event = "frame"
repeat = 5

[[step]]
event = "surface"
rect = [0.0, 400.0, 375.0, 812.0]
origin = [-1.0, -1.4, -2.5]
size = [2.0, 2.0]
distance = 1.8

[[step]]
event = "tap"
x = 180
y = 600
delay_ms = 10
"#,
        )
        .unwrap();

        assert_eq!(scenario.name.as_deref(), Some("demo"));
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(scenario.len(), 9);
        assert_eq!(scenario.steps[4].delay_ms, Some(10));

        assert_eq!(
            scenario.steps[0].action.to_command(VIEW).unwrap(),
            Command::Event(ArEvent::TrackingChanged(TrackingQuality::Limited(
                LimitedReason::Initializing
            )))
        );
        match scenario.steps[1].action.to_command(VIEW).unwrap() {
            Command::Event(ArEvent::AnchorAdded(AnchorEvent::Plane(plane))) => {
                assert_eq!(plane.id, AnchorId::new("floor"));
                assert_eq!(plane.center, Vec3::new(0.0, 0.0, 0.5));
                assert_eq!(plane.width(), 2.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(
            scenario.steps[2].action.to_command(VIEW).unwrap(),
            Command::Event(ArEvent::Frame(VIEW))
        );
        assert!(matches!(
            scenario.steps[3].action.to_command(VIEW).unwrap(),
            Command::AddSurface(_)
        ));
        assert_eq!(
            scenario.steps[4].action.to_command(VIEW).unwrap(),
            Command::Event(ArEvent::Tap(ScreenPoint::new(180.0, 600.0)))
        );
    }

    #[test]
    fn test_limited_without_reason_is_rejected() {
        let scenario = Scenario::from_toml(
            r#"
[[step]]
event = "tracking"
quality = "limited"
"#,
        )
        .unwrap();
        assert!(scenario.steps[0].action.to_command(VIEW).is_err());
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(Scenario::from_toml("[[step]]\nevent = \"teleport\"\n").is_err());
    }
}
