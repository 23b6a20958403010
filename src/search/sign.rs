//! Bow, playing, fingering and plucking signs.
//!
//! All four families run the generic nearest-partner search in a
//! symmetric window around the sign. Playing signs additionally prefer
//! chords below the sign: the below/above subsets are scanned in
//! distance order and the above subset is never entered once a below
//! candidate has been accepted.

use crate::inter::InterId;
use crate::model::{Point, Rect};
use crate::relation::{Link, RelationKind};
use crate::{Error, Result};

use super::SearchContext;

/// Generic symmetric-window nearest-partner search.
pub(super) fn search(
    ctx: &SearchContext,
    id: InterId,
    kind: RelationKind,
) -> Result<Option<Link>> {
    let inter = ctx.graph.inter(id).ok_or(Error::NotFound(id))?;
    let Some(bounds) = inter.bounds() else {
        return Ok(None);
    };
    let center = bounds.center();
    let profile = ctx.effective_profile(id);

    let window = symmetric_window(ctx, kind, profile, center);

    let mut best: Option<(f64, Link)> = None;
    for cid in ctx.chords_in_window(id, window) {
        let Some(cb) = ctx.graph.bounds_of(cid) else {
            continue;
        };
        let Some(relation) = ctx.graded(kind, profile, center, cb) else {
            continue;
        };
        let (gx, gy) = ctx.gaps_to_box(center, cb);
        let dist = (gx * gx + gy * gy).sqrt();
        if best.as_ref().map_or(true, |(d, _)| dist < *d) {
            best = Some((dist, Link::new(cid, relation, false)));
        }
    }

    Ok(best.map(|(_, link)| link))
}

/// Playing-technique signs: below candidates first, in distance order;
/// the above subset is only scanned when no below candidate passed.
pub(super) fn search_playing(ctx: &SearchContext, id: InterId) -> Result<Option<Link>> {
    let kind = RelationKind::ChordPlaying;
    let inter = ctx.graph.inter(id).ok_or(Error::NotFound(id))?;
    let Some(bounds) = inter.bounds() else {
        return Ok(None);
    };
    let center = bounds.center();
    let profile = ctx.effective_profile(id);

    let window = symmetric_window(ctx, kind, profile, center);

    let mut below: Vec<(f64, InterId, Rect)> = Vec::new();
    let mut above: Vec<(f64, InterId, Rect)> = Vec::new();
    for cid in ctx.chords_in_window(id, window) {
        let Some(cb) = ctx.graph.bounds_of(cid) else {
            continue;
        };
        let (gx, gy) = ctx.gaps_to_box(center, cb);
        let dist = (gx * gx + gy * gy).sqrt();
        if cb.center().y >= center.y {
            below.push((dist, cid, cb));
        } else {
            above.push((dist, cid, cb));
        }
    }
    below.sort_by(|a, b| a.0.total_cmp(&b.0));
    above.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Early termination on sign flip: a single accepted below
    // candidate settles the search.
    for (_, cid, cb) in below.into_iter().chain(above) {
        if let Some(relation) = ctx.graded(kind, profile, center, cb) {
            return Ok(Some(Link::new(cid, relation, false)));
        }
    }

    Ok(None)
}

fn symmetric_window(
    ctx: &SearchContext,
    kind: RelationKind,
    profile: crate::model::Profile,
    center: Point,
) -> Rect {
    let limits = ctx.config.limits(kind);
    let x_max_px = ctx.scale.to_pixels(limits.x_gap_max(profile));
    let y_max_px = ctx.scale.to_pixels(limits.y_gap_max(profile));
    Rect::from_points(
        Point::new(center.x - x_max_px, center.y - y_max_px),
        Point::new(center.x + x_max_px, center.y + y_max_px),
    )
}
