//! Axis-aligned geometry in sheet pixel space.
//!
//! Boxes use integer pixel coordinates (detections come from a raster);
//! reference points and gaps are `f64` so sub-pixel centers survive.

use serde::{Deserialize, Serialize};

/// A point in sheet coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned bounding box, `(x, y)` top-left, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Build from two corner points, in any order.
    pub fn from_points(a: Point, b: Point) -> Self {
        let x0 = a.x.min(b.x).floor() as i32;
        let y0 = a.y.min(b.y).floor() as i32;
        let x1 = a.x.max(b.x).ceil() as i32;
        let y1 = a.y.max(b.y).ceil() as i32;
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x as f64 + self.w as f64 / 2.0, self.y as f64 + self.h as f64 / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x as f64
            && p.x < self.right() as f64
            && p.y >= self.y as f64
            && p.y < self.bottom() as f64
    }

    /// Whether `x` falls within the horizontal span.
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x as f64 && x <= self.right() as f64
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Whether the horizontal spans overlap, ignoring y.
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// A copy grown by `dx` on each horizontal side and `dy` on each
    /// vertical side. Negative values shrink.
    pub fn grown(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x - dx, self.y - dy, self.w + 2 * dx, self.h + 2 * dy)
    }

    /// Horizontal distance from `x` to the nearer vertical edge,
    /// 0 when `x` lies within the span.
    pub fn x_gap_to(&self, x: f64) -> f64 {
        if x < self.x as f64 {
            self.x as f64 - x
        } else if x > self.right() as f64 {
            x - self.right() as f64
        } else {
            0.0
        }
    }

    /// Vertical distance from `y` to the nearer horizontal edge,
    /// 0 when `y` lies within the span.
    pub fn y_gap_to(&self, y: f64) -> f64 {
        if y < self.y as f64 {
            self.y as f64 - y
        } else if y > self.bottom() as f64 {
            y - self.bottom() as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_center_and_edges() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn rect_intersection_and_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        let c = Rect::new(20, 20, 5, 5);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.union(&c), Rect::new(0, 0, 25, 25));
    }

    #[test]
    fn gap_is_zero_inside_span() {
        let r = Rect::new(100, 50, 20, 10);
        assert_eq!(r.x_gap_to(110.0), 0.0);
        assert_eq!(r.x_gap_to(90.0), 10.0);
        assert_eq!(r.x_gap_to(130.0), 10.0);
        assert_eq!(r.y_gap_to(55.0), 0.0);
        assert_eq!(r.y_gap_to(70.0), 10.0);
    }

    #[test]
    fn grown_expands_both_sides() {
        let r = Rect::new(10, 10, 10, 10).grown(5, 2);
        assert_eq!(r, Rect::new(5, 8, 20, 14));
    }
}
