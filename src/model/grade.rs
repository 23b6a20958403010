//! Confidence grades.
//!
//! A grade is a value in [0,1], either a bare scalar (shape classifier
//! output, relation fit) or a vector of named impact components that
//! reduces to one.

use serde::{Deserialize, Serialize};

/// A confidence value, always clamped to [0,1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Grade(f64);

impl Grade {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Grade {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// Named impact components behind a grade.
///
/// Each component measures one aspect of how well the interpretation
/// fits (ink weight, width ratio, gap...); the scalar grade is their
/// weighted mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeImpacts {
    names: Vec<String>,
    weights: Vec<f64>,
    impacts: Vec<f64>,
}

impl GradeImpacts {
    /// `names` and `weights` describe the components; impacts start at 0.
    pub fn new(names: Vec<&str>, weights: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), weights.len());
        let impacts = vec![0.0; names.len()];
        let names = names.into_iter().map(str::to_owned).collect();
        Self { names, weights, impacts }
    }

    pub fn set(&mut self, index: usize, impact: f64) {
        self.impacts[index] = impact.clamp(0.0, 1.0);
    }

    pub fn impact(&self, index: usize) -> f64 {
        self.impacts[index]
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Reduce to a scalar grade: weighted mean of components.
    pub fn grade(&self) -> Grade {
        let total: f64 = self.weights.iter().sum();
        if total == 0.0 {
            return Grade::new(0.0);
        }
        let sum: f64 = self
            .impacts
            .iter()
            .zip(&self.weights)
            .map(|(i, w)| i * w)
            .sum();
        Grade::new(sum / total)
    }
}
