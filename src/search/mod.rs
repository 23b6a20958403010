//! The link-search engine.
//!
//! Every linkable shape implements the same contract: propose at most
//! one [`Link`] from the current graph (`search_links`), and report
//! previously applied links that no longer clear the acceptance
//! threshold (`search_stale_links`). The per-kind policies live in the
//! submodules; this module holds the shared machinery (candidate
//! windows, gap measurement, grading) and the exhaustive dispatch
//! over shapes.

mod articulation;
mod fermata;
mod grace;
mod measure_count;
mod pause;
mod sign;

use crate::graph::{EdgeId, SymbolGraph};
use crate::inter::InterId;
use crate::model::{Point, Profile, Rect, Scale, Shape};
use crate::relation::{Link, Relation, RelationConfig, RelationKind};
use crate::system::System;
use crate::Result;

/// Everything a search needs to read: the graph, the system geometry,
/// the sheet scale and the tolerance tables.
pub struct SearchContext<'a> {
    pub graph: &'a SymbolGraph,
    pub system: &'a System,
    pub scale: Scale,
    pub config: &'a RelationConfig,
}

impl SearchContext<'_> {
    /// Effective profile: node floor and system floor, max-combined.
    pub fn effective_profile(&self, id: InterId) -> Profile {
        self.graph
            .inter(id)
            .map(|i| i.profile())
            .unwrap_or_default()
            .combined(self.system.profile)
    }

    /// Absolute pixel gaps from a reference point to a candidate box,
    /// measured to the nearer edge on each axis (0 inside the span).
    pub(crate) fn gaps_to_box(&self, refpt: Point, bounds: Rect) -> (f64, f64) {
        (bounds.x_gap_to(refpt.x), bounds.y_gap_to(refpt.y))
    }

    /// Grade a candidate box against a kind's limits; `None` when the
    /// grade falls below the profile's acceptance threshold.
    pub(crate) fn graded(
        &self,
        kind: RelationKind,
        profile: Profile,
        refpt: Point,
        bounds: Rect,
    ) -> Option<Relation> {
        let (gx, gy) = self.gaps_to_box(refpt, bounds);
        let rel = Relation::compute(kind, self.config, self.scale, profile, gx, gy);
        (rel.grade >= self.config.min_grade(profile)).then_some(rel)
    }

    /// Head chords whose boxes intersect `window`, excluding `owner`
    /// and anything overlapping the owner's own box, in ascending
    /// center-x order. The order is not cut short: box widths are
    /// unbounded, so a late candidate's left edge can still fall
    /// inside the window.
    pub(crate) fn chords_in_window(&self, owner: InterId, window: Rect) -> Vec<InterId> {
        let own_bounds = self.graph.bounds_of(owner);
        let mut out = Vec::new();
        for cid in self.graph.inters_of_shape(Shape::HeadChord) {
            if cid == owner {
                continue;
            }
            let Some(cb) = self.graph.bounds_of(cid) else {
                continue;
            };
            if !cb.intersects(&window) {
                continue;
            }
            if own_bounds.map_or(false, |ob| cb.intersects(&ob)) {
                continue;
            }
            out.push(cid);
        }
        out
    }
}

/// Propose links for one inter. Unknown or non-linkable shapes, and
/// inters whose geometry is not established yet, yield an empty result.
///
/// Every kind in this family produces at most one accepted partner.
pub fn search_links(ctx: &SearchContext, id: InterId) -> Result<Vec<Link>> {
    let Some(inter) = ctx.graph.inter(id) else {
        return Ok(Vec::new());
    };
    if inter.is_removed() {
        return Ok(Vec::new());
    }

    let shape = inter.shape();
    let link = if shape.is_pause() {
        pause::search(ctx, id)?
    } else if shape.is_articulation() {
        articulation::search(ctx, id)?
    } else if shape.is_bow() {
        sign::search(ctx, id, RelationKind::ChordBow)?
    } else if shape.is_playing() {
        sign::search_playing(ctx, id)?
    } else if shape.is_fingering() {
        sign::search(ctx, id, RelationKind::HeadFingering)?
    } else if shape.is_plucking() {
        sign::search(ctx, id, RelationKind::ChordPlucking)?
    } else if shape.is_fermata() {
        fermata::search(ctx, id)?
    } else if shape == Shape::GraceChord {
        grace::search(ctx, id)?
    } else if shape == Shape::MeasureNumber {
        measure_count::search(ctx, id)?
    } else {
        None
    };

    Ok(link.into_iter().collect())
}

/// The sign end and the anchor end of a gap-scored edge, per the
/// direction convention of [`crate::relation`].
fn sign_and_anchor(kind: RelationKind, src: InterId, dst: InterId) -> Option<(InterId, InterId)> {
    match kind {
        RelationKind::ChordPause
        | RelationKind::ChordArticulation
        | RelationKind::ChordBow
        | RelationKind::ChordPlaying
        | RelationKind::HeadFingering
        | RelationKind::ChordPlucking => Some((dst, src)),
        RelationKind::ChordGrace
        | RelationKind::FermataChord
        | RelationKind::FermataBar => Some((src, dst)),
        RelationKind::MeasureCount | RelationKind::Containment => None,
    }
}

/// Re-examine applied links against the current geometry and return
/// those that no longer hold. Manual links (or links on manual inters)
/// are exempt; containment is structural and never stale here.
pub fn search_stale_links(ctx: &SearchContext, applied: &[EdgeId]) -> Vec<EdgeId> {
    let mut stale = Vec::new();

    for eid in applied {
        let Some(edge) = ctx.graph.edge(*eid) else {
            continue;
        };
        let relation = &edge.relation;
        if relation.manual {
            continue;
        }
        let manual_end = [edge.src, edge.dst]
            .iter()
            .any(|i| ctx.graph.inter(*i).map_or(false, |n| n.is_manual()));
        if manual_end {
            continue;
        }

        match relation.kind {
            RelationKind::Containment => {}
            RelationKind::MeasureCount => {
                if measure_count::is_stale(ctx, edge) {
                    stale.push(*eid);
                }
            }
            // Pause acceptance is measure-ranged and graded on the
            // vertical gap only; a generic two-axis re-grade would
            // reject every link the pause search legitimately applied.
            RelationKind::ChordPause => {
                if pause::is_stale(ctx, edge) {
                    stale.push(*eid);
                }
            }
            kind => {
                let Some((sign, anchor)) = sign_and_anchor(kind, edge.src, edge.dst) else {
                    continue;
                };
                let profile = ctx.effective_profile(sign);
                let refpt = ctx.graph.bounds_of(sign).map(|b| b.center());
                let bounds = ctx.graph.bounds_of(anchor);
                let holds = match (refpt, bounds) {
                    (Some(refpt), Some(bounds)) => {
                        ctx.graded(kind, profile, refpt, bounds).is_some()
                    }
                    _ => false,
                };
                if !holds {
                    stale.push(*eid);
                }
            }
        }
    }

    stale
}
