//! Sheet scale: pixel distances vs resolution-independent interline
//! fractions.
//!
//! All geometric tolerances in this crate are specified as fractions of
//! the interline (the distance between two staff lines) so they hold at
//! any scan resolution.

use serde::{Deserialize, Serialize};

/// A length expressed as a fraction of the interline.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Fraction(pub f64);

impl Fraction {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}il", self.0)
    }
}

/// Scale information for one sheet (or one system of a sheet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    /// Main interline value, in pixels.
    interline: u16,
}

impl Scale {
    pub fn new(interline: u16) -> Self {
        debug_assert!(interline > 0, "interline must be positive");
        Self { interline }
    }

    pub fn interline(&self) -> u16 {
        self.interline
    }

    /// Convert an interline fraction to pixels.
    pub fn to_pixels(&self, frac: Fraction) -> f64 {
        frac.0 * f64::from(self.interline)
    }

    /// Convert a pixel distance to an interline fraction.
    pub fn pixels_to_frac(&self, pixels: f64) -> Fraction {
        Fraction(pixels / f64::from(self.interline))
    }
}
