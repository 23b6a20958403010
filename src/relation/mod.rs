//! Typed, scored, directed relations between interpretations.
//!
//! Every relation kind defines, as a function of the strictness
//! profile, how far apart its two ends may sit. A concrete `Relation`
//! instance records the gaps measured at creation time (in interline
//! fractions) plus the grade derived from them.
//!
//! Direction convention, fixed per kind:
//! - `Chord*` and `HeadFingering` kinds: source = the chord, target =
//!   the attached sign (except `ChordGrace`: source = grace chord,
//!   target = host chord).
//! - `Fermata*`: source = the fermata, target = its partner.
//! - `MeasureCount`: source = the number, target = the counted sign.
//! - `Containment`: source = the ensemble, target = the member.

pub mod link;

use serde::{Deserialize, Serialize};

use crate::model::{Fraction, Profile, Scale};

pub use link::Link;

/// The closed set of relation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Chord at the tail of a pause sign (breath mark, caesura).
    ChordPause,
    /// Chord receiving an articulation sign.
    ChordArticulation,
    /// Chord receiving a bowing sign.
    ChordBow,
    /// Chord receiving a playing-technique sign.
    ChordPlaying,
    /// Head (via its chord) receiving a fingering digit.
    HeadFingering,
    /// Chord receiving a plucking letter.
    ChordPlucking,
    /// Grace chord attached to its host chord.
    ChordGrace,
    /// Fermata over/under a chord.
    FermataChord,
    /// Fermata over/under a barline.
    FermataBar,
    /// Measure-count number over a multiple-rest or repeat sign.
    MeasureCount,
    /// Ensemble-to-member ownership.
    Containment,
}

impl RelationKind {
    /// Kinds whose acceptance is purely geometric and therefore
    /// re-graded by the stale sweep.
    pub fn is_gap_scored(self) -> bool {
        !matches!(self, RelationKind::Containment | RelationKind::MeasureCount)
    }
}

/// Gap tolerances for one relation kind.
///
/// Limits grow additively with the profile so that a looser profile
/// accepts every geometry a stricter one does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapLimits {
    /// Max horizontal gap at profile 0, in interline fractions.
    pub x_max: f64,
    /// Max vertical gap at profile 0.
    pub y_max: f64,
    /// Required minimum vertical gap, if the sign must keep clear of
    /// its target.
    pub y_min: Option<f64>,
    /// Per-profile-step growth of both maxima.
    pub step: f64,
}

impl GapLimits {
    pub fn x_gap_max(&self, profile: Profile) -> Fraction {
        Fraction(self.x_max + self.step * f64::from(profile.0))
    }

    pub fn y_gap_max(&self, profile: Profile) -> Fraction {
        Fraction(self.y_max + self.step * f64::from(profile.0))
    }

    pub fn y_gap_min(&self, _profile: Profile) -> Option<Fraction> {
        self.y_min.map(Fraction)
    }
}

/// Tolerance tables for every relation kind, passed explicitly into
/// the engine (no ambient statics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationConfig {
    pub chord_pause: GapLimits,
    pub chord_articulation: GapLimits,
    pub chord_bow: GapLimits,
    pub chord_playing: GapLimits,
    pub head_fingering: GapLimits,
    pub chord_plucking: GapLimits,
    pub chord_grace: GapLimits,
    pub fermata_chord: GapLimits,
    pub fermata_bar: GapLimits,
    /// Minimum acceptable relation grade at profile 0.
    pub min_grade: f64,
    /// Per-profile-step decrease of the minimum grade.
    pub min_grade_step: f64,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            chord_pause: GapLimits { x_max: 2.0, y_max: 3.0, y_min: None, step: 0.5 },
            chord_articulation: GapLimits { x_max: 0.75, y_max: 2.0, y_min: Some(0.1), step: 0.25 },
            chord_bow: GapLimits { x_max: 1.0, y_max: 2.5, y_min: None, step: 0.25 },
            chord_playing: GapLimits { x_max: 1.0, y_max: 3.0, y_min: None, step: 0.25 },
            head_fingering: GapLimits { x_max: 1.0, y_max: 2.5, y_min: None, step: 0.25 },
            chord_plucking: GapLimits { x_max: 1.0, y_max: 2.5, y_min: None, step: 0.25 },
            chord_grace: GapLimits { x_max: 2.0, y_max: 2.0, y_min: None, step: 0.5 },
            fermata_chord: GapLimits { x_max: 1.5, y_max: 3.0, y_min: None, step: 0.5 },
            fermata_bar: GapLimits { x_max: 1.0, y_max: 2.5, y_min: None, step: 0.5 },
            min_grade: 0.2,
            min_grade_step: 0.05,
        }
    }
}

impl RelationConfig {
    /// Gap limits for a gap-scored kind. Callers check
    /// [`RelationKind::is_gap_scored`] first; Containment and
    /// MeasureCount carry no limits.
    pub fn limits(&self, kind: RelationKind) -> &GapLimits {
        match kind {
            RelationKind::ChordPause => &self.chord_pause,
            RelationKind::ChordArticulation => &self.chord_articulation,
            RelationKind::ChordBow => &self.chord_bow,
            RelationKind::ChordPlaying => &self.chord_playing,
            RelationKind::HeadFingering => &self.head_fingering,
            RelationKind::ChordPlucking => &self.chord_plucking,
            RelationKind::ChordGrace => &self.chord_grace,
            RelationKind::FermataChord => &self.fermata_chord,
            RelationKind::FermataBar => &self.fermata_bar,
            RelationKind::MeasureCount | RelationKind::Containment => {
                unreachable!("{kind:?} is not gap-scored")
            }
        }
    }

    /// Minimum acceptable grade at the given profile. Monotone
    /// non-increasing so a looser profile accepts a superset.
    pub fn min_grade(&self, profile: Profile) -> f64 {
        (self.min_grade - self.min_grade_step * f64::from(profile.0)).max(0.05)
    }
}

/// A concrete edge instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    /// Horizontal gap measured at creation, in interline fractions.
    pub x_gap: Fraction,
    /// Vertical gap measured at creation.
    pub y_gap: Fraction,
    /// Geometric fit in [0,1].
    pub grade: f64,
    /// Human-created; exempt from the stale sweep.
    pub manual: bool,
}

impl Relation {
    /// Grade pixel-space gaps against a kind's limits.
    ///
    /// 1.0 at zero gap, linear falloff, exactly 0 at the profile's
    /// configured maximum on either axis. A violated minimum vertical
    /// separation grades 0 outright.
    pub fn compute(
        kind: RelationKind,
        config: &RelationConfig,
        scale: Scale,
        profile: Profile,
        x_gap_px: f64,
        y_gap_px: f64,
    ) -> Relation {
        let limits = config.limits(kind);
        let x_gap = scale.pixels_to_frac(x_gap_px.abs());
        let y_gap = scale.pixels_to_frac(y_gap_px.abs());

        let grade = Self::grade_of(limits, profile, x_gap, y_gap);

        Relation { kind, x_gap, y_gap, grade, manual: false }
    }

    /// The gap→grade falloff shared by every geometric kind.
    pub fn grade_of(limits: &GapLimits, profile: Profile, x_gap: Fraction, y_gap: Fraction) -> f64 {
        let x_max = limits.x_gap_max(profile).value();
        let y_max = limits.y_gap_max(profile).value();
        if x_max <= 0.0 || y_max <= 0.0 {
            return 0.0;
        }
        if let Some(y_min) = limits.y_gap_min(profile) {
            if y_gap.value() < y_min.value() {
                return 0.0;
            }
        }
        let x_ratio = x_gap.value() / x_max;
        let y_ratio = y_gap.value() / y_max;
        (1.0 - x_ratio.max(y_ratio)).clamp(0.0, 1.0)
    }

    /// A containment edge: pure ownership, no geometry.
    pub fn containment() -> Relation {
        Relation {
            kind: RelationKind::Containment,
            x_gap: Fraction(0.0),
            y_gap: Fraction(0.0),
            grade: 1.0,
            manual: false,
        }
    }

    /// A measure-count edge: containment-tested, not gap-scored.
    pub fn measure_count() -> Relation {
        Relation {
            kind: RelationKind::MeasureCount,
            x_gap: Fraction(0.0),
            y_gap: Fraction(0.0),
            grade: 1.0,
            manual: false,
        }
    }

    pub fn into_manual(mut self) -> Relation {
        self.manual = true;
        self
    }
}
