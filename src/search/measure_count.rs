//! Measure-count numbers over multiple-rest or measure-repeat signs.
//!
//! Not a geometric-gap search: the number's center must fall within
//! the candidate sign's horizontal span on the same staff, and for a
//! repeat sign the parsed integer must agree with the encoded slash
//! count. A value mismatch skips the candidate, it is not an error.

use crate::graph::Edge;
use crate::inter::InterId;
use crate::model::Shape;
use crate::relation::{Link, Relation};
use crate::{Error, Result};

use super::SearchContext;

const TARGET_SHAPES: [Shape; 4] = [
    Shape::MultipleRest,
    Shape::MeasureRepeat1,
    Shape::MeasureRepeat2,
    Shape::MeasureRepeat4,
];

pub(super) fn search(ctx: &SearchContext, id: InterId) -> Result<Option<Link>> {
    let inter = ctx.graph.inter(id).ok_or(Error::NotFound(id))?;
    let Some(bounds) = inter.bounds() else {
        return Ok(None);
    };
    let Some(value) = inter.value() else {
        return Ok(None);
    };
    let center = bounds.center();

    let staff = match ctx.graph.staff_of(id) {
        Some(sid) => Some(sid),
        None => ctx.system.closest_staff(center).map(|s| s.id),
    };
    let Some(staff) = staff else {
        return Ok(None);
    };

    for shape in TARGET_SHAPES {
        for cid in ctx.graph.inters_of_shape(shape) {
            let Some(cb) = ctx.graph.bounds_of(cid) else {
                continue;
            };
            if !cb.contains_x(center.x) {
                continue;
            }
            let same_staff = match ctx.graph.staff_of(cid) {
                Some(sid) => sid == staff,
                None => ctx
                    .system
                    .closest_staff(cb.center())
                    .map_or(false, |s| s.id == staff),
            };
            if !same_staff {
                continue;
            }
            if !value_consistent(shape, value)? {
                continue;
            }
            // The number is the edge source.
            return Ok(Some(Link::new(cid, Relation::measure_count(), true)));
        }
    }

    Ok(None)
}

fn value_consistent(shape: Shape, value: u32) -> Result<bool> {
    match shape {
        Shape::MultipleRest => Ok(value > 0),
        _ => Ok(shape.repeat_slash_count()? == value),
    }
}

/// Stale test for an applied measure-count edge: the containment and
/// value conditions must still hold.
pub(super) fn is_stale(ctx: &SearchContext, edge: &Edge) -> bool {
    let number = edge.src;
    let target = edge.dst;

    let (Some(nb), Some(tb)) = (ctx.graph.bounds_of(number), ctx.graph.bounds_of(target)) else {
        return true;
    };
    if !tb.contains_x(nb.center().x) {
        return true;
    }
    let (Some(value), Some(shape)) = (
        ctx.graph.inter(number).and_then(|i| i.value()),
        ctx.graph.inter(target).map(|i| i.shape()),
    ) else {
        return true;
    };
    !value_consistent(shape, value).unwrap_or(false)
}
