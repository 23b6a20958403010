//! Grace (small) chords.
//!
//! A grace chord only looks to its right: the horizontal offset from
//! the grace head to the candidate chord's leading note must be
//! non-negative and bounded. The winner is the Euclidean-nearest
//! survivor, measured center-to-center (grace head to leading note),
//! not just the vertical gap.

use crate::inter::InterId;
use crate::model::Shape;
use crate::relation::{Link, Relation, RelationKind};
use crate::{Error, Result};

use super::SearchContext;

pub(super) fn search(ctx: &SearchContext, id: InterId) -> Result<Option<Link>> {
    let inter = ctx.graph.inter(id).ok_or(Error::NotFound(id))?;
    let Some(bounds) = inter.bounds() else {
        return Ok(None);
    };
    // The grace head's own center.
    let head = inter.leading_note().unwrap_or_else(|| bounds.center());

    let profile = ctx.effective_profile(id);
    let limits = ctx.config.limits(RelationKind::ChordGrace);
    let x_max_px = ctx.scale.to_pixels(limits.x_gap_max(profile));
    let y_max_px = ctx.scale.to_pixels(limits.y_gap_max(profile));
    let min_grade = ctx.config.min_grade(profile);

    let mut best: Option<(f64, Link)> = None;
    for cid in ctx.graph.inters_of_shape(Shape::HeadChord) {
        let Some(cb) = ctx.graph.bounds_of(cid) else {
            continue;
        };
        let lead = ctx.graph.inter(cid).and_then(|c| c.leading_note()).unwrap_or_else(|| cb.center());

        let dx = lead.x - head.x;
        // One-sided window: host chords sit to the right only. Leading
        // notes are not monotone in the center-x iteration order, so
        // an out-of-range candidate never ends the scan.
        if dx < 0.0 || dx > x_max_px {
            continue;
        }
        let dy = (lead.y - head.y).abs();
        if dy > y_max_px {
            continue;
        }
        if cb.intersects(&bounds) {
            continue;
        }

        let relation =
            Relation::compute(RelationKind::ChordGrace, ctx.config, ctx.scale, profile, dx, dy);
        if relation.grade < min_grade {
            continue;
        }

        let dist = (dx * dx + dy * dy).sqrt();
        if best.as_ref().map_or(true, |(d, _)| dist < *d) {
            // The grace chord is the edge source.
            best = Some((dist, Link::new(cid, relation, true)));
        }
    }

    Ok(best.map(|(_, link)| link))
}
