//! The symbol graph store.
//!
//! One `SymbolGraph` holds every interpretation of one sheet region
//! (system) plus the typed relations between them. Arenas are keyed by
//! stable integer identities so the cyclic inter ↔ relation ↔ staff
//! references never form ownership cycles.
//!
//! ## Discipline
//!
//! - **Single-writer**: every mutation takes `&mut self`; every query
//!   takes `&self`. A resolution pass reads, proposes, then applies.
//! - Duplicate edges of one kind on one ordered pair are rejected at
//!   insert with [`Error::DuplicateRelation`].

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::inter::{mandatory_kind, Inter, InterId};
use crate::model::{Rect, Shape};
use crate::relation::{Relation, RelationKind};
use crate::system::StaffId;
use crate::{Error, Result};

/// Stable edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EdgeId(pub u32);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A directed, typed edge between two interpretations.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub src: InterId,
    pub dst: InterId,
    pub relation: Relation,
}

impl Edge {
    /// The other end of this edge, seen from `from`.
    pub fn other_end(&self, from: InterId) -> Option<InterId> {
        if from == self.src {
            Some(self.dst)
        } else if from == self.dst {
            Some(self.src)
        } else {
            None
        }
    }
}

/// The node/edge container for one sheet region.
#[derive(Default)]
pub struct SymbolGraph {
    inters: HashMap<InterId, Inter>,
    edges: HashMap<EdgeId, Edge>,
    /// inter → incident edge ids, both directions.
    adjacency: HashMap<InterId, SmallVec<[EdgeId; 4]>>,
    /// shape → inter ids, maintained on add/remove.
    shape_index: HashMap<Shape, Vec<InterId>>,
    next_inter_id: u32,
    next_edge_id: u32,
}

impl SymbolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Inter lifecycle
    // ========================================================================

    /// Register a detached inter. Assigns its identity, indexes it by
    /// shape, and runs the post-add hook: kinds with a mandatory
    /// relation start out abnormal since no relation exists yet.
    pub fn add_inter(&mut self, mut inter: Inter) -> InterId {
        self.next_inter_id += 1;
        let id = InterId(self.next_inter_id);
        inter.id = id;

        if mandatory_kind(inter.shape()).is_some()
            || inter.shape().is_fermata()
            || inter.shape().is_ensemble()
        {
            inter.set_abnormal(true);
        }

        self.shape_index.entry(inter.shape()).or_default().push(id);
        self.adjacency.entry(id).or_default();
        debug!(%id, shape = ?inter.shape(), "inter added");
        self.inters.insert(id, inter);
        id
    }

    /// Tear an inter down: sever incident edges, unregister from the
    /// shape index, drop from the arena. A no-op if already removed.
    pub fn remove_inter(&mut self, id: InterId) {
        let Some(inter) = self.inters.get_mut(&id) else {
            return;
        };
        if inter.removed {
            return;
        }
        inter.removed = true;
        let shape = inter.shape();

        let incident: Vec<EdgeId> =
            self.adjacency.get(&id).map(|v| v.to_vec()).unwrap_or_default();
        for eid in incident {
            self.remove_relation(eid);
        }

        if let Some(ids) = self.shape_index.get_mut(&shape) {
            ids.retain(|i| *i != id);
        }
        self.adjacency.remove(&id);
        self.inters.remove(&id);
        debug!(%id, ?shape, "inter removed");
    }

    pub fn inter(&self, id: InterId) -> Option<&Inter> {
        self.inters.get(&id)
    }

    pub fn inter_mut(&mut self, id: InterId) -> Option<&mut Inter> {
        self.inters.get_mut(&id)
    }

    pub fn contains(&self, id: InterId) -> bool {
        self.inters.contains_key(&id)
    }

    pub fn inter_count(&self) -> usize {
        self.inters.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every live inter id, in ascending id order.
    pub fn inter_ids(&self) -> Vec<InterId> {
        let mut ids: Vec<InterId> = self.inters.keys().copied().collect();
        ids.sort();
        ids
    }

    // ========================================================================
    // Relation lifecycle
    // ========================================================================

    /// Insert a directed edge. Both ends must exist; a second edge of
    /// the same kind on the same ordered pair is rejected.
    pub fn add_relation(
        &mut self,
        src: InterId,
        dst: InterId,
        relation: Relation,
    ) -> Result<EdgeId> {
        if !self.inters.contains_key(&src) {
            return Err(Error::NotFound(src));
        }
        if !self.inters.contains_key(&dst) {
            return Err(Error::NotFound(dst));
        }
        if self.relation_between(src, dst, relation.kind).is_some() {
            return Err(Error::DuplicateRelation { kind: relation.kind, src, dst });
        }

        self.next_edge_id += 1;
        let id = EdgeId(self.next_edge_id);
        let kind = relation.kind;
        self.edges.insert(id, Edge { id, src, dst, relation });
        self.adjacency.entry(src).or_default().push(id);
        if src != dst {
            self.adjacency.entry(dst).or_default().push(id);
        }
        self.on_edges_changed(src, dst, kind);
        debug!(%id, %src, %dst, ?kind, "relation added");
        Ok(id)
    }

    /// Remove an edge, returning it. `None` if absent.
    pub fn remove_relation(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        if let Some(list) = self.adjacency.get_mut(&edge.src) {
            list.retain(|e| *e != id);
        }
        if edge.src != edge.dst {
            if let Some(list) = self.adjacency.get_mut(&edge.dst) {
                list.retain(|e| *e != id);
            }
        }
        self.on_edges_changed(edge.src, edge.dst, edge.relation.kind);
        debug!(%id, src = %edge.src, dst = %edge.dst, kind = ?edge.relation.kind, "relation removed");
        Some(edge)
    }

    /// Cache invalidation tied to edge mutation: staff resolution walks
    /// relations, ensemble member lists are derived from containment.
    fn on_edges_changed(&mut self, src: InterId, dst: InterId, kind: RelationKind) {
        if let Some(i) = self.inters.get(&src) {
            i.invalidate_staff_cache();
            if kind == RelationKind::Containment {
                i.invalidate_members_cache();
            }
        }
        if let Some(i) = self.inters.get(&dst) {
            i.invalidate_staff_cache();
        }
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// All edges of `kind` incident to `id`, either direction, in
    /// ascending edge-id order.
    pub fn relations_of(&self, id: InterId, kind: RelationKind) -> Vec<&Edge> {
        let mut out: Vec<&Edge> = self
            .adjacency
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|eid| self.edges.get(eid))
            .filter(|e| e.relation.kind == kind)
            .collect();
        out.sort_by_key(|e| e.id.0);
        out
    }

    /// Every edge incident to `id`.
    pub fn incident_edges(&self, id: InterId) -> Vec<&Edge> {
        self.adjacency
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|eid| self.edges.get(eid))
            .collect()
    }

    pub fn has_relation(&self, id: InterId, kind: RelationKind) -> bool {
        self.adjacency
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|eid| self.edges.get(eid))
            .any(|e| e.relation.kind == kind)
    }

    /// The edge of `kind` on the ordered pair, if any.
    pub fn relation_between(&self, src: InterId, dst: InterId, kind: RelationKind) -> Option<&Edge> {
        self.adjacency
            .get(&src)
            .into_iter()
            .flatten()
            .filter_map(|eid| self.edges.get(eid))
            .find(|e| e.src == src && e.dst == dst && e.relation.kind == kind)
    }

    /// Every edge id, in ascending order.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.edges.keys().copied().collect();
        ids.sort_by_key(|e| e.0);
        ids
    }

    // ========================================================================
    // Spatial / typed queries
    // ========================================================================

    /// All inters of `shape`, ordered by ascending center x (inters
    /// without established bounds sort first).
    pub fn inters_of_shape(&self, shape: Shape) -> Vec<InterId> {
        let mut ids: Vec<InterId> =
            self.shape_index.get(&shape).cloned().unwrap_or_default();
        ids.sort_by(|a, b| {
            let xa = self.inters.get(a).and_then(|i| i.center()).map_or(f64::MIN, |c| c.x);
            let xb = self.inters.get(b).and_then(|i| i.center()).map_or(f64::MIN, |c| c.x);
            xa.total_cmp(&xb)
        });
        ids
    }

    /// Inters of `shape` whose bounds intersect `region`, ordered by
    /// ascending center x.
    pub fn inters_of_shape_in(&self, shape: Shape, region: Rect) -> Vec<InterId> {
        self.inters_of_shape(shape)
            .into_iter()
            .filter(|id| {
                self.bounds_of(*id).map(|b| b.intersects(&region)).unwrap_or(false)
            })
            .collect()
    }

    /// Bounding box of an inter: own geometry for plain inters, member
    /// union for ensembles. `None` when nothing is established.
    pub fn bounds_of(&self, id: InterId) -> Option<Rect> {
        let inter = self.inters.get(&id)?;
        if let Some(b) = inter.bounds() {
            return Some(b);
        }
        if inter.shape().is_ensemble() {
            let members = crate::inter::ensemble::members(self, id).ok()?;
            let mut union: Option<Rect> = None;
            for m in members {
                if let Some(b) = self.bounds_of(m) {
                    union = Some(union.map_or(b, |u| u.union(&b)));
                }
            }
            if let Some(u) = union {
                inter.seed_bounds_cache(u);
            }
            return union;
        }
        None
    }

    /// Change an inter's explicit bounds, invalidating both its own
    /// caches and the member-union cache of any ensemble owning it.
    pub fn set_inter_bounds(&mut self, id: InterId, bounds: Rect) -> Result<()> {
        let owners: Vec<InterId> = self
            .relations_of(id, RelationKind::Containment)
            .into_iter()
            .filter(|e| e.dst == id)
            .map(|e| e.src)
            .collect();
        let inter = self.inters.get_mut(&id).ok_or(Error::NotFound(id))?;
        inter.set_bounds(bounds);
        for owner in owners {
            if let Some(ensemble) = self.inters.get(&owner) {
                ensemble.invalidate_members_cache();
            }
        }
        Ok(())
    }

    /// Owning staff, resolved lazily: the inter's own assignment wins;
    /// otherwise walk one relation to a partner whose staff is
    /// authoritative. Cached until incident edges change.
    pub fn staff_of(&self, id: InterId) -> Option<StaffId> {
        let inter = self.inters.get(&id)?;
        if let Some(staff) = inter.assigned_staff() {
            return Some(staff);
        }
        if let Some(cached) = inter.cached_resolved_staff() {
            return cached;
        }

        let mut edges = self.incident_edges(id);
        edges.sort_by_key(|e| e.id.0);
        let resolved = edges.iter().find_map(|e| {
            e.other_end(id)
                .and_then(|p| self.inters.get(&p))
                .and_then(|p| p.assigned_staff())
        });
        inter.cache_resolved_staff(resolved);
        resolved
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Grade, Point};
    use crate::relation::RelationConfig;
    use crate::model::{Profile, Scale};

    fn chord(x: i32, y: i32) -> Inter {
        Inter::new(Shape::HeadChord, Grade::new(0.9))
            .with_bounds(Rect::new(x, y, 20, 60))
            .with_leading_note(Point::new(x as f64 + 10.0, y as f64 + 50.0))
    }

    fn bow_relation() -> Relation {
        Relation::compute(
            RelationKind::ChordBow,
            &RelationConfig::default(),
            Scale::new(20),
            Profile::STANDARD,
            2.0,
            2.0,
        )
    }

    #[test]
    fn add_assigns_identity_and_indexes_shape() {
        let mut graph = SymbolGraph::new();
        let a = graph.add_inter(chord(0, 0));
        let b = graph.add_inter(chord(100, 0));
        assert_ne!(a, b);
        assert_eq!(graph.inters_of_shape(Shape::HeadChord), vec![a, b]);
    }

    #[test]
    fn post_add_hook_marks_mandatory_kinds_abnormal() {
        let mut graph = SymbolGraph::new();
        let sign = graph.add_inter(
            Inter::new(Shape::Staccato, 0.8).with_bounds(Rect::new(0, 0, 10, 10)),
        );
        assert!(graph.inter(sign).unwrap().is_abnormal());

        let chord = graph.add_inter(chord(0, 0));
        assert!(!graph.inter(chord).unwrap().is_abnormal());
    }

    #[test]
    fn duplicate_relation_rejected() {
        let mut graph = SymbolGraph::new();
        let a = graph.add_inter(chord(0, 0));
        let b = graph.add_inter(chord(100, 0));

        graph.add_relation(a, b, bow_relation()).unwrap();
        let dup = graph.add_relation(a, b, bow_relation());
        assert!(matches!(dup, Err(Error::DuplicateRelation { .. })));

        // Opposite direction is a different ordered pair.
        graph.add_relation(b, a, bow_relation()).unwrap();
    }

    #[test]
    fn remove_inter_is_idempotent_and_cuts_edges() {
        let mut graph = SymbolGraph::new();
        let a = graph.add_inter(chord(0, 0));
        let b = graph.add_inter(chord(100, 0));
        graph.add_relation(a, b, bow_relation()).unwrap();

        graph.remove_inter(a);
        assert!(graph.inter(a).is_none());
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.relations_of(b, RelationKind::ChordBow).is_empty());

        // Second removal is a no-op.
        graph.remove_inter(a);
    }

    #[test]
    fn other_end_symmetry() {
        let mut graph = SymbolGraph::new();
        let a = graph.add_inter(chord(0, 0));
        let b = graph.add_inter(chord(100, 0));
        let eid = graph.add_relation(a, b, bow_relation()).unwrap();

        let edge = graph.edge(eid).unwrap();
        assert_eq!(edge.other_end(a), Some(b));
        assert_eq!(edge.other_end(b), Some(a));
        assert_eq!(edge.other_end(InterId(999)), None);
    }

    #[test]
    fn shape_query_ordered_by_center_x() {
        let mut graph = SymbolGraph::new();
        let right = graph.add_inter(chord(300, 0));
        let left = graph.add_inter(chord(10, 0));
        let middle = graph.add_inter(chord(150, 0));
        assert_eq!(graph.inters_of_shape(Shape::HeadChord), vec![left, middle, right]);
    }

    #[test]
    fn region_query_filters_by_bounds() {
        let mut graph = SymbolGraph::new();
        let inside = graph.add_inter(chord(10, 0));
        let _outside = graph.add_inter(chord(500, 0));
        let hits = graph.inters_of_shape_in(Shape::HeadChord, Rect::new(0, 0, 100, 100));
        assert_eq!(hits, vec![inside]);
    }

    #[test]
    fn staff_resolved_through_partner() {
        let mut graph = SymbolGraph::new();
        let anchored = graph.add_inter(chord(0, 0).with_staff(StaffId(1)));
        let floating = graph.add_inter(
            Inter::new(Shape::Staccato, 0.8).with_bounds(Rect::new(0, 70, 10, 10)),
        );

        assert_eq!(graph.staff_of(floating), None);
        graph.add_relation(anchored, floating, bow_relation()).unwrap();
        assert_eq!(graph.staff_of(floating), Some(StaffId(1)));
    }
}
