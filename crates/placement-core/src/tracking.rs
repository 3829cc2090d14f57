//! Camera tracking quality classification
//!
//! Maps the engine's raw tracking-quality signal into a [`TrackingStatus`]
//! snapshot and the message shown to the user. An empty message means
//! tracking is fine and the placement guidance should be shown instead.

use serde::{Deserialize, Serialize};

/// Why tracking is currently limited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitedReason {
    ExcessiveMotion,
    InsufficientFeatures,
    Initializing,
    Relocalizing,
}

/// Raw tracking-quality signal as delivered by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "quality", content = "reason", rename_all = "snake_case")]
pub enum TrackingQuality {
    NotAvailable,
    Normal,
    Limited(LimitedReason),
}

/// Classified camera pose-estimation quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    Unavailable,
    /// Assumed until the engine reports otherwise
    #[default]
    Normal,
    Limited(LimitedReason),
}

impl TrackingStatus {
    /// Classify a raw tracking-quality event
    pub fn classify(quality: TrackingQuality) -> Self {
        match quality {
            TrackingQuality::NotAvailable => Self::Unavailable,
            TrackingQuality::Normal => Self::Normal,
            TrackingQuality::Limited(reason) => Self::Limited(reason),
        }
    }

    /// User-facing message; empty when there is nothing to report
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unavailable => "For some reason, augmented reality tracking isn't available.",
            Self::Normal => "",
            Self::Limited(LimitedReason::ExcessiveMotion) => {
                "You're moving the device around too quickly. Slow down."
            }
            Self::Limited(LimitedReason::InsufficientFeatures) => {
                "I can't get a sense of the room. Is something blocking the rear camera?"
            }
            Self::Limited(LimitedReason::Initializing) => "Initializing, please wait a moment...",
            Self::Limited(LimitedReason::Relocalizing) => "Relocalizing, please wait a moment...",
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}
