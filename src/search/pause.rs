//! Pause signs: breath marks and caesuras.
//!
//! Candidates are head chords in the sign's own measure, on the sign's
//! staff, horizontally between the measure start and the sign's right
//! edge. The winner is the right-most qualifying candidate
//! unconditionally, the one tie-break in this family that ignores
//! relative grades (a pause applies to the chord just before it).

use crate::graph::Edge;
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
    let center = bounds.center();

    let staff = match ctx.graph.staff_of(id) {
        Some(sid) => ctx.system.staff(sid),
        None => ctx.system.closest_staff(center),
    };
    let Some(staff) = staff else {
        return Ok(None);
    };
    let Some(start_x) = staff.measure_start(center.x) else {
        return Ok(None);
    };

    let profile = ctx.effective_profile(id);
    let right = bounds.right() as f64;

    let mut best: Option<(f64, Link)> = None;
    for cid in ctx.graph.inters_of_shape(Shape::HeadChord) {
        let Some(cb) = ctx.graph.bounds_of(cid) else {
            continue;
        };
        let cc = cb.center();
        if cc.x > right {
            break;
        }
        if cc.x < start_x as f64 {
            continue;
        }
        let on_staff = match ctx.graph.staff_of(cid) {
            Some(sid) => sid == staff.id,
            None => ctx.system.closest_staff(cc).map_or(false, |s| s.id == staff.id),
        };
        if !on_staff {
            continue;
        }
        if cb.intersects(&bounds) {
            continue;
        }
        // Horizontal placement is constrained by the measure range
        // above; only the vertical gap is graded.
        let relation = grade(ctx, profile, center.y, cb);
        if relation.grade < ctx.config.min_grade(profile) {
            continue;
        }
        // Right-most wins, regardless of grade.
        if best.as_ref().map_or(true, |(x, _)| cc.x > *x) {
            best = Some((cc.x, Link::new(cid, relation, false)));
        }
    }

    Ok(best.map(|(_, link)| link))
}

fn grade(
    ctx: &SearchContext,
    profile: crate::model::Profile,
    sign_y: f64,
    chord_box: crate::model::Rect,
) -> Relation {
    Relation::compute(
        RelationKind::ChordPause,
        ctx.config,
        ctx.scale,
        profile,
        0.0,
        chord_box.y_gap_to(sign_y),
    )
}

/// Stale test for an applied pause edge. The acceptance conditions are
/// the same as the search's: chord still in the sign's measure range on
/// the sign's staff, vertical-only grade still above threshold.
pub(super) fn is_stale(ctx: &SearchContext, edge: &Edge) -> bool {
    let chord = edge.src;
    let sign = edge.dst;

    let (Some(sb), Some(cb)) = (ctx.graph.bounds_of(sign), ctx.graph.bounds_of(chord)) else {
        return true;
    };
    let center = sb.center();
    let staff = match ctx.graph.staff_of(sign) {
        Some(sid) => ctx.system.staff(sid),
        None => ctx.system.closest_staff(center),
    };
    let Some(staff) = staff else {
        return true;
    };
    let Some(start_x) = staff.measure_start(center.x) else {
        return true;
    };

    let cc = cb.center();
    if cc.x < start_x as f64 || cc.x > sb.right() as f64 {
        return true;
    }

    let profile = ctx.effective_profile(sign);
    grade(ctx, profile, center.y, cb).grade < ctx.config.min_grade(profile)
}
