//! Minimal view of a raw glyph detection.
//!
//! Segmentation happens upstream; an interpretation only needs the
//! glyph's box and ink weight.

use serde::{Deserialize, Serialize};

use super::geom::{Point, Rect};

/// A detected ink blob backing an interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    /// Bounding box in sheet pixels.
    pub bounds: Rect,
    /// Number of foreground pixels.
    pub weight: u32,
}

impl Glyph {
    pub fn new(bounds: Rect, weight: u32) -> Self {
        Self { bounds, weight }
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Mean ink thickness along the horizontal axis.
    pub fn mean_thickness(&self) -> f64 {
        if self.bounds.w == 0 {
            0.0
        } else {
            f64::from(self.weight) / f64::from(self.bounds.w)
        }
    }
}
