//! The closed set of symbol shapes handled by the graph.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Vertical placement of one element relative to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalSide {
    Above,
    Below,
}

impl VerticalSide {
    pub fn opposite(self) -> VerticalSide {
        match self {
            VerticalSide::Above => VerticalSide::Below,
            VerticalSide::Below => VerticalSide::Above,
        }
    }
}

/// Symbol kind assigned by the shape classifier.
///
/// This enumeration is closed on purpose: every per-kind behavior in
/// the crate is an exhaustive match over it, so adding a shape forces a
/// review of search, abnormal and value logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    // Chords
    HeadChord,
    GraceChord,

    // Pause signs
    BreathMark,
    Caesura,

    // Articulations
    Accent,
    Staccato,
    Tenuto,
    Staccatissimo,
    Marcato,

    // Bowing
    UpBow,
    DownBow,

    // Percussion playing technique
    PlayingOpen,
    PlayingHalfOpen,
    PlayingClosed,

    // Fingering digits
    Fingering0,
    Fingering1,
    Fingering2,
    Fingering3,
    Fingering4,
    Fingering5,

    // Plucking letters (p-i-m-a)
    PluckP,
    PluckI,
    PluckM,
    PluckA,

    // Fermatas, orientation encoded in the shape
    FermataAbove,
    FermataBelow,

    // Time signature material
    TimeDigit,
    TimePair,

    // Measure counting
    MeasureNumber,
    MultipleRest,
    MeasureRepeat1,
    MeasureRepeat2,
    MeasureRepeat4,

    // Structure
    Barline,
}

impl Shape {
    pub fn is_chord(self) -> bool {
        matches!(self, Shape::HeadChord | Shape::GraceChord)
    }

    pub fn is_pause(self) -> bool {
        matches!(self, Shape::BreathMark | Shape::Caesura)
    }

    pub fn is_articulation(self) -> bool {
        matches!(
            self,
            Shape::Accent | Shape::Staccato | Shape::Tenuto | Shape::Staccatissimo | Shape::Marcato
        )
    }

    pub fn is_bow(self) -> bool {
        matches!(self, Shape::UpBow | Shape::DownBow)
    }

    pub fn is_playing(self) -> bool {
        matches!(
            self,
            Shape::PlayingOpen | Shape::PlayingHalfOpen | Shape::PlayingClosed
        )
    }

    pub fn is_fingering(self) -> bool {
        matches!(
            self,
            Shape::Fingering0
                | Shape::Fingering1
                | Shape::Fingering2
                | Shape::Fingering3
                | Shape::Fingering4
                | Shape::Fingering5
        )
    }

    pub fn is_plucking(self) -> bool {
        matches!(self, Shape::PluckP | Shape::PluckI | Shape::PluckM | Shape::PluckA)
    }

    pub fn is_fermata(self) -> bool {
        matches!(self, Shape::FermataAbove | Shape::FermataBelow)
    }

    pub fn is_measure_count_target(self) -> bool {
        matches!(
            self,
            Shape::MultipleRest | Shape::MeasureRepeat1 | Shape::MeasureRepeat2 | Shape::MeasureRepeat4
        )
    }

    /// Whether this shape runs a link search of its own.
    pub fn is_linkable(self) -> bool {
        self.is_pause()
            || self.is_articulation()
            || self.is_bow()
            || self.is_playing()
            || self.is_fingering()
            || self.is_plucking()
            || self.is_fermata()
            || self == Shape::GraceChord
            || self == Shape::MeasureNumber
    }

    /// Whether this shape owns members through containment edges.
    pub fn is_ensemble(self) -> bool {
        self == Shape::TimePair
    }

    /// Side restriction for an articulation: the only side of the
    /// target chord this shape may sit on, or `None` for either side.
    pub fn articulation_side(self) -> Option<VerticalSide> {
        match self {
            Shape::Marcato => Some(VerticalSide::Above),
            _ => None,
        }
    }

    /// Orientation of a fermata shape, i.e. the side of its target the
    /// fermata sits on.
    pub fn fermata_side(self) -> Result<VerticalSide> {
        match self {
            Shape::FermataAbove => Ok(VerticalSide::Above),
            Shape::FermataBelow => Ok(VerticalSide::Below),
            _ => Err(Error::UnsupportedShape { shape: self, context: "fermata orientation" }),
        }
    }

    /// Numeric value of a fingering digit.
    pub fn fingering_value(self) -> Result<u32> {
        match self {
            Shape::Fingering0 => Ok(0),
            Shape::Fingering1 => Ok(1),
            Shape::Fingering2 => Ok(2),
            Shape::Fingering3 => Ok(3),
            Shape::Fingering4 => Ok(4),
            Shape::Fingering5 => Ok(5),
            _ => Err(Error::UnsupportedShape { shape: self, context: "fingering" }),
        }
    }

    /// Slash count encoded in a measure-repeat sign.
    pub fn repeat_slash_count(self) -> Result<u32> {
        match self {
            Shape::MeasureRepeat1 => Ok(1),
            Shape::MeasureRepeat2 => Ok(2),
            Shape::MeasureRepeat4 => Ok(4),
            _ => Err(Error::UnsupportedShape { shape: self, context: "repeat slash count" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_are_disjoint() {
        for shape in [Shape::Staccato, Shape::UpBow, Shape::PluckM, Shape::BreathMark] {
            let families = [
                shape.is_pause(),
                shape.is_articulation(),
                shape.is_bow(),
                shape.is_playing(),
                shape.is_fingering(),
                shape.is_plucking(),
                shape.is_fermata(),
            ];
            assert_eq!(families.iter().filter(|f| **f).count(), 1, "{shape:?}");
        }
    }

    #[test]
    fn fingering_value_rejects_foreign_shape() {
        assert_eq!(Shape::Fingering3.fingering_value().unwrap(), 3);
        assert!(Shape::Staccato.fingering_value().is_err());
    }

    #[test]
    fn slash_counts() {
        assert_eq!(Shape::MeasureRepeat2.repeat_slash_count().unwrap(), 2);
        assert!(Shape::MultipleRest.repeat_slash_count().is_err());
    }
}
