//! Staff and system geometry consumed by the search engine.
//!
//! The sheet/page partitioning happens upstream; the engine only needs
//! per-staff line geometry, measure spans and a few spatial queries
//! over the staves of one system.

use serde::{Deserialize, Serialize};

use crate::model::{Point, Profile};

/// Staff identifier, unique within a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StaffId(pub u16);

impl std::fmt::Display for StaffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "staff{}", self.0)
    }
}

/// One (possibly slightly sloped) staff line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSeg {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl LineSeg {
    /// Horizontal line helper.
    pub fn level(x1: f64, x2: f64, y: f64) -> Self {
        Self { x1, y1: y, x2, y2: y }
    }

    /// Ordinate at abscissa `x`, extrapolating beyond the endpoints.
    pub fn y_at(&self, x: f64) -> f64 {
        if self.x2 == self.x1 {
            return self.y1;
        }
        self.y1 + (x - self.x1) * (self.y2 - self.y1) / (self.x2 - self.x1)
    }
}

/// Horizontal extent of one measure on a staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureSpan {
    pub start_x: i32,
    pub end_x: i32,
}

impl MeasureSpan {
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start_x as f64 && x < self.end_x as f64
    }
}

/// One staff: ordered lines (top first) plus measure spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    /// Top-to-bottom staff lines.
    pub lines: Vec<LineSeg>,
    /// Left-to-right measure spans.
    pub measures: Vec<MeasureSpan>,
}

impl Staff {
    pub fn new(id: StaffId, lines: Vec<LineSeg>, measures: Vec<MeasureSpan>) -> Self {
        debug_assert!(!lines.is_empty(), "a staff needs lines");
        Self { id, lines, measures }
    }

    /// Ordinate of the top line at `x`.
    pub fn first_line_y(&self, x: f64) -> f64 {
        self.lines.first().map(|l| l.y_at(x)).unwrap_or(0.0)
    }

    /// Ordinate of the bottom line at `x`.
    pub fn last_line_y(&self, x: f64) -> f64 {
        self.lines.last().map(|l| l.y_at(x)).unwrap_or(0.0)
    }

    /// Ordinate midway between top and bottom lines at `x`.
    pub fn mid_y(&self, x: f64) -> f64 {
        (self.first_line_y(x) + self.last_line_y(x)) / 2.0
    }

    /// Vertical distance from a point to the staff band, 0 inside.
    pub fn distance_to(&self, p: Point) -> f64 {
        let top = self.first_line_y(p.x);
        let bottom = self.last_line_y(p.x);
        if p.y < top {
            top - p.y
        } else if p.y > bottom {
            p.y - bottom
        } else {
            0.0
        }
    }

    /// The measure containing `x`, if any.
    pub fn measure_at(&self, x: f64) -> Option<&MeasureSpan> {
        self.measures.iter().find(|m| m.contains(x))
    }

    /// Horizontal start of the measure containing `x`. Empty when `x`
    /// falls outside every span (stale-state query, not an error).
    pub fn measure_start(&self, x: f64) -> Option<i32> {
        self.measure_at(x).map(|m| m.start_x)
    }
}

/// One system: its staves top-to-bottom plus a system-level strictness
/// floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    staves: Vec<Staff>,
    pub profile: Profile,
}

impl System {
    pub fn new(staves: Vec<Staff>) -> Self {
        Self { staves, profile: Profile::STANDARD }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn staves(&self) -> &[Staff] {
        &self.staves
    }

    pub fn staff(&self, id: StaffId) -> Option<&Staff> {
        self.staves.iter().find(|s| s.id == id)
    }

    /// The staff closest to a point (vertical distance to the band).
    pub fn closest_staff(&self, p: Point) -> Option<&Staff> {
        self.staves
            .iter()
            .min_by(|a, b| a.distance_to(p).total_cmp(&b.distance_to(p)))
    }

    /// The nearest staff strictly above the point (its bottom line
    /// above `p.y`).
    pub fn staff_above(&self, p: Point) -> Option<&Staff> {
        self.staves
            .iter()
            .filter(|s| s.last_line_y(p.x) < p.y)
            .min_by(|a, b| {
                (p.y - a.last_line_y(p.x)).total_cmp(&(p.y - b.last_line_y(p.x)))
            })
    }

    /// The nearest staff strictly below the point (its top line below
    /// `p.y`).
    pub fn staff_below(&self, p: Point) -> Option<&Staff> {
        self.staves
            .iter()
            .filter(|s| s.first_line_y(p.x) > p.y)
            .min_by(|a, b| {
                (a.first_line_y(p.x) - p.y).total_cmp(&(b.first_line_y(p.x) - p.y))
            })
    }

    /// The staves bordering a point: the one above (or containing) it
    /// and the one below. A point inside a staff borders only that
    /// staff.
    pub fn staves_around(&self, p: Point) -> (Option<&Staff>, Option<&Staff>) {
        for staff in &self.staves {
            if staff.distance_to(p) == 0.0 {
                return (Some(staff), None);
            }
        }
        (self.staff_above(p), self.staff_below(p))
    }
}
