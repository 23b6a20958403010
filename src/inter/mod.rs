//! Interpretation nodes.
//!
//! An `Inter` is one candidate reading of a detected glyph as a
//! specific notation symbol. It is constructed detached, added to a
//! [`SymbolGraph`](crate::graph::SymbolGraph), then linked to partners
//! by the search engine.

pub mod ensemble;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::graph::SymbolGraph;
use crate::model::{Glyph, Grade, GradeImpacts, Point, Profile, Rect, Shape};
use crate::relation::RelationKind;
use crate::system::StaffId;

/// Stable interpretation identifier, assigned by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterId(pub u32);

impl std::fmt::Display for InterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One interpretation of a detected symbol.
pub struct Inter {
    pub(crate) id: InterId,
    shape: Shape,
    grade: Grade,
    impacts: Option<GradeImpacts>,
    glyph: Option<Glyph>,
    explicit_bounds: Option<Rect>,
    /// Authoritative staff, when known at construction.
    staff: Option<StaffId>,
    profile: Profile,
    manual: bool,
    abnormal: bool,
    pub(crate) removed: bool,
    /// Mirrored interpretation sharing the same heads (two voices).
    mirror: Option<InterId>,
    /// Parsed integer for number-like shapes.
    value: Option<u32>,
    /// Center of the chord's leading note, for chord shapes.
    leading_note: Option<Point>,
    // Lazily derived, invalidated on geometric / structural change.
    cached_bounds: Mutex<Option<Rect>>,
    cached_staff: Mutex<Option<Option<StaffId>>>,
    pub(crate) cached_members: Mutex<Option<Vec<InterId>>>,
}

impl std::fmt::Debug for Inter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inter")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("grade", &self.grade)
            .field("abnormal", &self.abnormal)
            .finish_non_exhaustive()
    }
}

impl Inter {
    pub fn new(shape: Shape, grade: impl Into<Grade>) -> Self {
        Self {
            id: InterId(0),
            shape,
            grade: grade.into(),
            impacts: None,
            glyph: None,
            explicit_bounds: None,
            staff: None,
            profile: Profile::STANDARD,
            manual: false,
            abnormal: false,
            removed: false,
            mirror: None,
            value: None,
            leading_note: None,
            cached_bounds: Mutex::new(None),
            cached_staff: Mutex::new(None),
            cached_members: Mutex::new(None),
        }
    }

    /// Build from impacts; the scalar grade is derived.
    pub fn from_impacts(shape: Shape, impacts: GradeImpacts) -> Self {
        let grade = impacts.grade();
        let mut inter = Self::new(shape, grade);
        inter.impacts = Some(impacts);
        inter
    }

    pub fn with_glyph(mut self, glyph: Glyph) -> Self {
        self.glyph = Some(glyph);
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.explicit_bounds = Some(bounds);
        self
    }

    pub fn with_staff(mut self, staff: StaffId) -> Self {
        self.staff = Some(staff);
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_manual(mut self, manual: bool) -> Self {
        self.manual = manual;
        self
    }

    pub fn with_mirror(mut self, mirror: InterId) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_leading_note(mut self, center: Point) -> Self {
        self.leading_note = Some(center);
        self
    }

    pub fn id(&self) -> InterId {
        self.id
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn impacts(&self) -> Option<&GradeImpacts> {
        self.impacts.as_ref()
    }

    pub fn glyph(&self) -> Option<&Glyph> {
        self.glyph.as_ref()
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    pub fn is_abnormal(&self) -> bool {
        self.abnormal
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn mirror(&self) -> Option<InterId> {
        self.mirror
    }

    /// Parsed integer value, for number-like shapes. Empty (not an
    /// error) when the value was never established.
    pub fn value(&self) -> Option<u32> {
        self.value
    }

    /// Center of the chord's leading note, for chord shapes.
    pub fn leading_note(&self) -> Option<Point> {
        self.leading_note
    }

    /// Staff set at construction, if any. Prefer
    /// [`SymbolGraph::staff_of`] which also resolves through relations.
    pub fn assigned_staff(&self) -> Option<StaffId> {
        self.staff
    }

    pub(crate) fn set_grade(&mut self, grade: impl Into<Grade>) {
        self.grade = grade.into();
    }

    pub(crate) fn set_abnormal(&mut self, abnormal: bool) {
        self.abnormal = abnormal;
    }

    pub fn set_staff(&mut self, staff: StaffId) {
        self.staff = Some(staff);
        *self.cached_staff.lock() = None;
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.explicit_bounds = Some(bounds);
        self.invalidate_geometry();
    }

    pub fn set_glyph(&mut self, glyph: Glyph) {
        self.glyph = Some(glyph);
        self.invalidate_geometry();
    }

    /// Drop every geometry-derived cache. Called by any mutation that
    /// changes a geometric input.
    pub fn invalidate_geometry(&self) {
        *self.cached_bounds.lock() = None;
    }

    pub(crate) fn invalidate_staff_cache(&self) {
        *self.cached_staff.lock() = None;
    }

    pub(crate) fn invalidate_members_cache(&self) {
        *self.cached_members.lock() = None;
        self.invalidate_geometry();
    }

    /// Bounding box from explicit bounds or the underlying glyph,
    /// cached until invalidated. Ensemble member unions are handled by
    /// [`SymbolGraph::bounds_of`]. `None` for an inter whose geometry
    /// is not established yet (stale-state query, not an error).
    pub fn bounds(&self) -> Option<Rect> {
        let mut cache = self.cached_bounds.lock();
        if cache.is_none() {
            *cache = self.explicit_bounds.or_else(|| self.glyph.map(|g| g.bounds));
        }
        *cache
    }

    /// Reference point of this interpretation.
    pub fn center(&self) -> Option<Point> {
        self.bounds().map(|b| b.center())
    }

    pub(crate) fn seed_bounds_cache(&self, bounds: Rect) {
        *self.cached_bounds.lock() = Some(bounds);
    }

    pub(crate) fn cached_resolved_staff(&self) -> Option<Option<StaffId>> {
        *self.cached_staff.lock()
    }

    pub(crate) fn cache_resolved_staff(&self, staff: Option<StaffId>) {
        *self.cached_staff.lock() = Some(staff);
    }
}

/// Relation kinds whose presence a shape requires to be structurally
/// complete, or `None` when the shape has no such requirement.
pub fn mandatory_kind(shape: Shape) -> Option<RelationKind> {
    if shape.is_pause() {
        Some(RelationKind::ChordPause)
    } else if shape.is_articulation() {
        Some(RelationKind::ChordArticulation)
    } else if shape.is_bow() {
        Some(RelationKind::ChordBow)
    } else if shape.is_playing() {
        Some(RelationKind::ChordPlaying)
    } else if shape.is_fingering() {
        Some(RelationKind::HeadFingering)
    } else if shape.is_plucking() {
        Some(RelationKind::ChordPlucking)
    } else if shape == Shape::GraceChord {
        Some(RelationKind::ChordGrace)
    } else if shape == Shape::MeasureNumber {
        Some(RelationKind::MeasureCount)
    } else {
        None
    }
}

/// Re-evaluate the structural completeness of one inter and update its
/// abnormal flag. Returns the new flag value.
///
/// Deliberately not triggered by graph edits; callers invoke it after a
/// batch of structural changes.
pub fn check_abnormal(graph: &mut SymbolGraph, id: InterId) -> bool {
    let Some(inter) = graph.inter(id) else {
        return false;
    };
    let shape = inter.shape();

    let abnormal = if shape.is_fermata() {
        !graph.has_relation(id, RelationKind::FermataChord)
            && !graph.has_relation(id, RelationKind::FermataBar)
    } else if shape.is_ensemble() {
        ensemble::members(graph, id).map(|m| m.len() != 2).unwrap_or(true)
    } else if let Some(kind) = mandatory_kind(shape) {
        !graph.has_relation(id, kind)
    } else {
        false
    };

    if let Some(inter) = graph.inter_mut(id) {
        inter.set_abnormal(abnormal);
    }
    abnormal
}
