//! # Core model
//!
//! Plain data types shared across the whole crate: geometry, scale,
//! shapes, grades, profiles.
//!
//! Design rule: NO graph types, NO search state here.
//! This module is pure data: no I/O, no caches, no dispatch.

pub mod geom;
pub mod glyph;
pub mod grade;
pub mod profile;
pub mod scale;
pub mod shape;

pub use geom::{Point, Rect};
pub use glyph::Glyph;
pub use grade::{Grade, GradeImpacts};
pub use profile::Profile;
pub use scale::{Fraction, Scale};
pub use shape::{Shape, VerticalSide};
