//! Application state machine
//!
//! `Scanning` is only left through [`StateMachine::surface_detected`], which
//! the overlay manager triggers when it draws a horizontal plane. Frame ticks
//! never move the machine out of `Scanning`; once a plane has been seen they
//! flip between `Aiming` and `Ready` depending on what is on screen.

use serde::{Deserialize, Serialize};

use crate::scene::DebugOptions;

/// Coarse placement state shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationState {
    /// No surface found yet
    #[default]
    Scanning,
    /// Surfaces exist but none is in view
    Aiming,
    /// A surface is in view; placement allowed
    Ready,
}

impl ApplicationState {
    /// Placement guidance for this state
    pub fn message(&self) -> &'static str {
        match self {
            Self::Scanning => "Scan the room with your device until the yellow dots appear.",
            Self::Aiming => "Point your device towards one of the detected surfaces.",
            Self::Ready => {
                "Tap on the floor grid to place furniture; look at walls to place posters."
            }
        }
    }

    /// Debug visualizations to show in this state
    pub fn debug_options(&self) -> DebugOptions {
        match self {
            Self::Scanning => DebugOptions::FEATURE_POINTS,
            Self::Aiming | Self::Ready => DebugOptions::NONE,
        }
    }
}

impl std::fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scanning => write!(f, "scanning"),
            Self::Aiming => write!(f, "aiming"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// Holds the current [`ApplicationState`] and applies transitions
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    state: ApplicationState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ApplicationState {
        self.state
    }

    /// Per-frame update. `surface_visible` is only evaluated outside `Scanning`.
    pub fn on_frame(&mut self, surface_visible: impl FnOnce() -> bool) -> ApplicationState {
        self.state = match self.state {
            ApplicationState::Scanning => ApplicationState::Scanning,
            ApplicationState::Aiming | ApplicationState::Ready => {
                if surface_visible() {
                    ApplicationState::Ready
                } else {
                    ApplicationState::Aiming
                }
            }
        };
        self.state
    }

    /// A horizontal plane overlay was created or refreshed
    pub fn surface_detected(&mut self) -> ApplicationState {
        self.state = ApplicationState::Ready;
        self.state
    }

    pub fn reset(&mut self) {
        self.state = ApplicationState::Scanning;
    }

    /// Status line: tracking problems take priority over placement guidance
    pub fn status_text<'a>(&self, tracking_message: &'a str) -> &'a str {
        if tracking_message.is_empty() {
            self.state.message()
        } else {
            tracking_message
        }
    }
}
