//! Fermatas.
//!
//! Two-stage search: a barline partner first (closest staff barline
//! that horizontally overlaps the fermata within a vertical
//! tolerance), then a chord partner on the side given by the fermata's
//! orientation. When the primary chord interpretation has a registered
//! mirror that sits strictly closer to the fermata, the mirror wins.

use crate::inter::InterId;
use crate::model::{Shape, VerticalSide};
use crate::relation::{Link, RelationKind};
use crate::{Error, Result};

use super::SearchContext;

pub(super) fn search(ctx: &SearchContext, id: InterId) -> Result<Option<Link>> {
    let inter = ctx.graph.inter(id).ok_or(Error::NotFound(id))?;
    let side = inter.shape().fermata_side()?;
    let Some(bounds) = inter.bounds() else {
        return Ok(None);
    };
    let center = bounds.center();
    let profile = ctx.effective_profile(id);

    // Stage 1: a barline partner.
    let mut best_bar: Option<(f64, Link)> = None;
    for bid in ctx.graph.inters_of_shape(Shape::Barline) {
        let Some(bb) = ctx.graph.bounds_of(bid) else {
            continue;
        };
        if !bb.overlaps_x(&bounds) {
            continue;
        }
        let Some(relation) = ctx.graded(RelationKind::FermataBar, profile, center, bb) else {
            continue;
        };
        let y_gap = relation.y_gap.value();
        if best_bar.as_ref().map_or(true, |(g, _)| y_gap < *g) {
            best_bar = Some((y_gap, Link::new(bid, relation, true)));
        }
    }
    if let Some((_, link)) = best_bar {
        return Ok(Some(link));
    }

    // Stage 2: a chord partner on the orientation side.
    let limits = ctx.config.limits(RelationKind::FermataChord);
    let x_max_px = ctx.scale.to_pixels(limits.x_gap_max(profile));
    let y_max_px = ctx.scale.to_pixels(limits.y_gap_max(profile));
    let window = match side {
        // A fermata above its target looks below itself.
        VerticalSide::Above => crate::model::Rect::from_points(
            crate::model::Point::new(center.x - x_max_px, center.y),
            crate::model::Point::new(center.x + x_max_px, center.y + y_max_px),
        ),
        VerticalSide::Below => crate::model::Rect::from_points(
            crate::model::Point::new(center.x - x_max_px, center.y - y_max_px),
            crate::model::Point::new(center.x + x_max_px, center.y),
        ),
    };

    let mut best: Option<(f64, InterId)> = None;
    for cid in ctx.chords_in_window(id, window) {
        let Some(cb) = ctx.graph.bounds_of(cid) else {
            continue;
        };
        let cc = cb.center();
        let directional = match side {
            VerticalSide::Above => cc.y > center.y,
            VerticalSide::Below => cc.y < center.y,
        };
        if !directional {
            continue;
        }
        if ctx.graded(RelationKind::FermataChord, profile, center, cb).is_none() {
            continue;
        }
        let dist = center.distance_to(cc);
        if best.as_ref().map_or(true, |(d, _)| dist < *d) {
            best = Some((dist, cid));
        }
    }

    let Some((primary_dist, primary)) = best else {
        return Ok(None);
    };

    // Prefer a registered mirror interpretation that is strictly
    // closer to the fermata, provided it clears grading itself; a
    // rejected mirror falls back to the primary chord.
    if let Some(mirror) = ctx.graph.inter(primary).and_then(|c| c.mirror()) {
        if let Some(mb) = ctx.graph.bounds_of(mirror) {
            if center.distance_to(mb.center()) < primary_dist {
                if let Some(relation) =
                    ctx.graded(RelationKind::FermataChord, profile, center, mb)
                {
                    return Ok(Some(Link::new(mirror, relation, true)));
                }
            }
        }
    }

    let Some(pb) = ctx.graph.bounds_of(primary) else {
        return Ok(None);
    };
    let relation = match ctx.graded(RelationKind::FermataChord, profile, center, pb) {
        Some(relation) => relation,
        None => return Ok(None),
    };
    Ok(Some(Link::new(primary, relation, true)))
}
