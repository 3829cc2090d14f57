//! Surface coverage sampling
//!
//! Answers "is a usable surface on screen right now?" without hit-testing
//! every pixel. A fixed N×N grid of points spanning the whole viewport
//! (corners and edges included) is hit-tested row by row, stopping at the
//! first point that lands on a horizontal surface. The cost per frame is at
//! most N² hit-tests no matter how many planes are tracked.

use crate::engine::{ArEngine, HitTestKind};
use crate::geometry::{ScreenPoint, Viewport};

/// Samples per axis used unless configured otherwise
pub const DEFAULT_GRID_DIVISIONS: usize = 5;

/// Upper bound on samples per axis; every sample is one hit-test per frame
pub const MAX_GRID_DIVISIONS: usize = 32;

/// Grid-based surface visibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSampler {
    divisions: usize,
}

impl SurfaceSampler {
    /// Create a sampler with `divisions` points per axis, clamped to
    /// `2..=MAX_GRID_DIVISIONS`
    pub fn new(divisions: usize) -> Self {
        Self {
            divisions: divisions.clamp(2, MAX_GRID_DIVISIONS),
        }
    }

    pub fn divisions(&self) -> usize {
        self.divisions
    }

    /// Sample points in hit-test order: rows top to bottom, left to right
    pub fn sample_points(&self, viewport: Viewport) -> impl Iterator<Item = ScreenPoint> {
        let steps = (self.divisions - 1) as f64;
        let n = self.divisions;
        (0..n).flat_map(move |row| {
            let y = row as f64 / steps * viewport.height;
            (0..n).map(move |col| ScreenPoint::new(col as f64 / steps * viewport.width, y))
        })
    }

    /// True as soon as any sample point hits a horizontal surface
    pub fn is_surface_visible<E: ArEngine + ?Sized>(&self, engine: &E, viewport: Viewport) -> bool {
        self.sample_points(viewport)
            .any(|point| !engine.hit_test(point, HitTestKind::HorizontalPlaneEstimate).is_empty())
    }
}

impl Default for SurfaceSampler {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_DIVISIONS)
    }
}
