//! Ensemble interpretations: composite nodes owning an ordered set of
//! members through containment edges.
//!
//! The only bounded ensemble in this family is the time-signature pair
//! (numerator digit over denominator digit).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{EdgeId, SymbolGraph};
use crate::model::Shape;
use crate::relation::{Relation, RelationKind};
use crate::{Error, Result};

use super::InterId;

/// Member capacity for an ensemble shape.
pub fn capacity(shape: Shape) -> Option<usize> {
    match shape {
        Shape::TimePair => Some(2),
        _ => None,
    }
}

/// Member shape accepted by an ensemble shape.
fn member_shape(shape: Shape) -> Option<Shape> {
    match shape {
        Shape::TimePair => Some(Shape::TimeDigit),
        _ => None,
    }
}

/// A numerator/denominator pair derived from a complete time pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRational {
    pub num: u32,
    pub den: u32,
}

impl std::fmt::Display for TimeRational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Ordered members of an ensemble (ascending vertical center), derived
/// from containment edges and cached until membership or member
/// geometry changes.
pub fn members(graph: &SymbolGraph, ensemble: InterId) -> Result<Vec<InterId>> {
    let inter = graph.inter(ensemble).ok_or(Error::NotFound(ensemble))?;
    if !inter.shape().is_ensemble() {
        return Err(Error::NotAnEnsemble(ensemble));
    }

    if let Some(cached) = inter.cached_members.lock().clone() {
        return Ok(cached);
    }

    let mut list: Vec<InterId> = graph
        .relations_of(ensemble, RelationKind::Containment)
        .into_iter()
        .filter(|e| e.src == ensemble)
        .map(|e| e.dst)
        .collect();
    list.sort_by(|a, b| {
        let ya = graph.bounds_of(*a).map_or(f64::MAX, |r| r.center().y);
        let yb = graph.bounds_of(*b).map_or(f64::MAX, |r| r.center().y);
        ya.total_cmp(&yb)
    });

    *inter.cached_members.lock() = Some(list.clone());
    Ok(list)
}

/// Attach a member. Rejects additions beyond capacity and members of
/// the wrong shape.
pub fn add_member(graph: &mut SymbolGraph, ensemble: InterId, member: InterId) -> Result<EdgeId> {
    let shape = graph.inter(ensemble).ok_or(Error::NotFound(ensemble))?.shape();
    let Some(cap) = capacity(shape) else {
        return Err(Error::NotAnEnsemble(ensemble));
    };

    let member_inter = graph.inter(member).ok_or(Error::NotFound(member))?;
    if let Some(expected) = member_shape(shape) {
        if member_inter.shape() != expected {
            return Err(Error::MemberShape {
                ensemble,
                expected,
                got: member_inter.shape(),
            });
        }
    }

    let current = members(graph, ensemble)?;
    if current.len() >= cap {
        return Err(Error::ArityExceeded { id: ensemble, capacity: cap });
    }

    let edge = graph.add_relation(ensemble, member, Relation::containment())?;
    debug!(%ensemble, %member, "ensemble member added");
    refresh_aggregate(graph, ensemble);
    Ok(edge)
}

/// Detach a member. Absent membership is a no-op.
pub fn remove_member(graph: &mut SymbolGraph, ensemble: InterId, member: InterId) -> Result<()> {
    let shape = graph.inter(ensemble).ok_or(Error::NotFound(ensemble))?.shape();
    if !shape.is_ensemble() {
        return Err(Error::NotAnEnsemble(ensemble));
    }
    let edge = graph
        .relation_between(ensemble, member, RelationKind::Containment)
        .map(|e| e.id);
    if let Some(id) = edge {
        graph.remove_relation(id);
        debug!(%ensemble, %member, "ensemble member removed");
        refresh_aggregate(graph, ensemble);
    }
    Ok(())
}

/// Combined numerator/denominator value of a complete time pair:
/// numerator is the upper member. `None` while members are missing or
/// carry no parsed value.
pub fn time_value(graph: &SymbolGraph, ensemble: InterId) -> Result<Option<TimeRational>> {
    let list = members(graph, ensemble)?;
    if list.len() != 2 {
        return Ok(None);
    }
    let num = graph.inter(list[0]).and_then(|i| i.value());
    let den = graph.inter(list[1]).and_then(|i| i.value());
    Ok(match (num, den) {
        (Some(num), Some(den)) => Some(TimeRational { num, den }),
        _ => None,
    })
}

/// Recompute the ensemble's aggregate grade from its members: mean of
/// member grades when complete, 0 (and abnormal) otherwise.
pub fn refresh_aggregate(graph: &mut SymbolGraph, ensemble: InterId) {
    let Ok(list) = members(graph, ensemble) else {
        return;
    };
    let complete = capacity(graph.inter(ensemble).map_or(Shape::TimePair, |i| i.shape()))
        .map_or(false, |cap| list.len() == cap);

    let grade = if complete {
        let sum: f64 = list
            .iter()
            .filter_map(|m| graph.inter(*m))
            .map(|m| m.grade().value())
            .sum();
        sum / list.len() as f64
    } else {
        0.0
    };

    if let Some(inter) = graph.inter_mut(ensemble) {
        inter.set_grade(grade);
        inter.set_abnormal(!complete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inter::Inter;
    use crate::model::Rect;

    fn digit(graph: &mut SymbolGraph, x: i32, y: i32, value: u32) -> InterId {
        graph.add_inter(
            Inter::new(Shape::TimeDigit, 0.8)
                .with_bounds(Rect::new(x, y, 20, 20))
                .with_value(value),
        )
    }

    #[test]
    fn members_ordered_by_vertical_center() {
        let mut graph = SymbolGraph::new();
        let pair = graph.add_inter(Inter::new(Shape::TimePair, 0.0));
        let lower = digit(&mut graph, 0, 100, 4);
        let upper = digit(&mut graph, 0, 0, 3);

        add_member(&mut graph, pair, lower).unwrap();
        add_member(&mut graph, pair, upper).unwrap();

        assert_eq!(members(&graph, pair).unwrap(), vec![upper, lower]);
        assert_eq!(
            time_value(&graph, pair).unwrap(),
            Some(TimeRational { num: 3, den: 4 })
        );
    }

    #[test]
    fn arity_cap_enforced() {
        let mut graph = SymbolGraph::new();
        let pair = graph.add_inter(Inter::new(Shape::TimePair, 0.0));
        let a = digit(&mut graph, 0, 0, 6);
        let b = digit(&mut graph, 0, 100, 8);
        let c = digit(&mut graph, 0, 200, 2);

        add_member(&mut graph, pair, a).unwrap();
        add_member(&mut graph, pair, b).unwrap();
        let third = add_member(&mut graph, pair, c);
        assert!(matches!(third, Err(Error::ArityExceeded { capacity: 2, .. })));
        // Still exactly two members.
        assert_eq!(members(&graph, pair).unwrap().len(), 2);
    }

    #[test]
    fn member_shape_checked() {
        let mut graph = SymbolGraph::new();
        let pair = graph.add_inter(Inter::new(Shape::TimePair, 0.0));
        let chord = graph.add_inter(
            Inter::new(Shape::HeadChord, 0.9).with_bounds(Rect::new(0, 0, 20, 60)),
        );
        assert!(matches!(
            add_member(&mut graph, pair, chord),
            Err(Error::MemberShape { .. })
        ));
    }

    #[test]
    fn incomplete_pair_grades_zero_and_abnormal() {
        let mut graph = SymbolGraph::new();
        let pair = graph.add_inter(Inter::new(Shape::TimePair, 0.0));
        let a = digit(&mut graph, 0, 0, 3);
        add_member(&mut graph, pair, a).unwrap();

        let inter = graph.inter(pair).unwrap();
        assert_eq!(inter.grade().value(), 0.0);
        assert!(inter.is_abnormal());
        assert_eq!(time_value(&graph, pair).unwrap(), None);
    }

    #[test]
    fn complete_pair_aggregates_bounds_and_grade() {
        let mut graph = SymbolGraph::new();
        let pair = graph.add_inter(Inter::new(Shape::TimePair, 0.0));
        let upper = digit(&mut graph, 10, 0, 3);
        let lower = digit(&mut graph, 10, 100, 4);
        add_member(&mut graph, pair, upper).unwrap();
        add_member(&mut graph, pair, lower).unwrap();

        assert!(!graph.inter(pair).unwrap().is_abnormal());
        assert!((graph.inter(pair).unwrap().grade().value() - 0.8).abs() < 1e-9);
        assert_eq!(graph.bounds_of(pair), Some(Rect::new(10, 0, 20, 120)));
    }

    #[test]
    fn not_an_ensemble() {
        let mut graph = SymbolGraph::new();
        let chord = graph.add_inter(
            Inter::new(Shape::HeadChord, 0.9).with_bounds(Rect::new(0, 0, 20, 60)),
        );
        assert!(matches!(members(&graph, chord), Err(Error::NotAnEnsemble(_))));
    }
}
