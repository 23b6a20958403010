//! Articulation signs: accent, staccato, tenuto, staccatissimo,
//! marcato.
//!
//! The vertical search window depends on where the sign sits:
//! - between two staves, the window runs from the facing line of the
//!   staff above down to the facing line of the staff below, clipped to
//!   the sign's own extent on a side the shape is restricted to;
//! - next to (or on) a single staff, the window runs from the sign to
//!   the staff's far line, and a shape whose allowed side contradicts
//!   the sign's position yields no match at all.
//!
//! Tie-break: minimal vertical gap among surviving candidates.

use crate::inter::InterId;
use crate::model::{Point, Rect, VerticalSide};
use crate::relation::{Link, RelationKind};
use crate::{Error, Result};

use super::SearchContext;

pub(super) fn search(ctx: &SearchContext, id: InterId) -> Result<Option<Link>> {
    let inter = ctx.graph.inter(id).ok_or(Error::NotFound(id))?;
    let Some(bounds) = inter.bounds() else {
        return Ok(None);
    };
    let center = bounds.center();
    let side = inter.shape().articulation_side();

    let profile = ctx.effective_profile(id);
    let limits = ctx.config.limits(RelationKind::ChordArticulation);
    let x_max_px = ctx.scale.to_pixels(limits.x_gap_max(profile));

    let inside = ctx.system.staves().iter().find(|s| s.distance_to(center) == 0.0);
    let above = ctx.system.staff_above(center);
    let below = ctx.system.staff_below(center);

    let (y_top, y_bottom) = match (inside, above, below) {
        (None, Some(above), Some(below)) => {
            // Between two staves: bounded by each staff's facing line.
            let mut top = above.last_line_y(center.x);
            let mut bottom = below.first_line_y(center.x);
            match side {
                // Sign must sit above its chord: no upward search
                // beyond the sign's own box.
                Some(VerticalSide::Above) => top = top.max(bounds.y as f64),
                Some(VerticalSide::Below) => bottom = bottom.min(bounds.bottom() as f64),
                None => {}
            }
            (top, bottom)
        }
        _ => {
            // Single staff: the one we are in, else the nearest.
            let Some(staff) = inside.or(above).or(below) else {
                return Ok(None);
            };
            let sign_above_staff = center.y < staff.mid_y(center.x);
            if let Some(allowed) = side {
                let actual =
                    if sign_above_staff { VerticalSide::Above } else { VerticalSide::Below };
                if actual != allowed {
                    return Ok(None);
                }
            }
            if sign_above_staff {
                (bounds.y as f64, staff.last_line_y(center.x))
            } else {
                (staff.first_line_y(center.x), bounds.bottom() as f64)
            }
        }
    };

    if y_bottom <= y_top {
        return Ok(None);
    }

    let window = Rect::from_points(
        Point::new(center.x - x_max_px, y_top),
        Point::new(center.x + x_max_px, y_bottom),
    );

    let mut best: Option<(f64, Link)> = None;
    for cid in ctx.chords_in_window(id, window) {
        let Some(cb) = ctx.graph.bounds_of(cid) else {
            continue;
        };
        let Some(relation) = ctx.graded(RelationKind::ChordArticulation, profile, center, cb)
        else {
            continue;
        };
        let y_gap = relation.y_gap.value();
        if best.as_ref().map_or(true, |(g, _)| y_gap < *g) {
            best = Some((y_gap, Link::new(cid, relation, false)));
        }
    }

    Ok(best.map(|(_, link)| link))
}
