//! Diagram Matcher: Fix / Remove / Perfect Classification
//!
//! Matches a noisy prediction diagram against a clean reference diagram.
//! The reference only contributes its feature count n: the n most
//! persistent prediction features are meant to be real, everything else
//! is noise.
//!
//! ## Forces
//!
//! - fix:    (0 - b, 1 - d)       push the point to the corner (0, 1)
//! - remove: (p/√2, -p/√2)        push the point onto the diagonal b = d
//!
//! where p = |d - b|. A remove force has Euclidean norm exactly p.

use std::f64::consts::SQRT_2;

use super::MatchConfig;
use super::PerfectFallback;
use crate::diagram::{DiagramPoint, PersistenceDiagram};
use crate::error::{Result, TopoLossError};

/// Role assigned to one prediction feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureClass {
    /// Already a confident true feature
    Perfect,
    /// True feature that must be strengthened
    Fix,
    /// Spurious feature that must be erased
    Remove,
    /// Below the significance threshold; left untouched
    Ignored,
}

/// Displacement applied to a diagram point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Force {
    pub birth: f64,
    pub death: f64,
}

impl Force {
    pub fn new(birth: f64, death: f64) -> Self {
        Self { birth, death }
    }

    pub fn norm_squared(&self) -> f64 {
        self.birth * self.birth + self.death * self.death
    }

    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }
}

/// Counts for logging and inspection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatchSummary {
    pub perfect: usize,
    pub fix: usize,
    pub remove: usize,
    pub ignored: usize,
    pub diagram_loss: f64,
}

/// Outcome of matching one prediction diagram
///
/// Classes are stored per feature index, so the fix, remove and perfect
/// sets are disjoint by construction and always iterate in ascending
/// index order.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramMatch {
    classes: Vec<FeatureClass>,
    forces: Vec<Force>,
}

impl DiagramMatch {
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class(&self, index: usize) -> FeatureClass {
        self.classes[index]
    }

    pub fn classes(&self) -> &[FeatureClass] {
        &self.classes
    }

    pub fn force(&self, index: usize) -> Force {
        self.forces[index]
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    /// Indices of one class, ascending
    pub fn indices_of(&self, class: FeatureClass) -> Vec<usize> {
        self.classes.iter()
            .enumerate()
            .filter(|&(_, &c)| c == class)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn fix_indices(&self) -> Vec<usize> {
        self.indices_of(FeatureClass::Fix)
    }

    pub fn remove_indices(&self) -> Vec<usize> {
        self.indices_of(FeatureClass::Remove)
    }

    pub fn perfect_indices(&self) -> Vec<usize> {
        self.indices_of(FeatureClass::Perfect)
    }

    /// Does any feature receive a non-trivial push?
    pub fn has_corrections(&self) -> bool {
        self.classes.iter()
            .any(|c| matches!(c, FeatureClass::Fix | FeatureClass::Remove))
    }

    /// Σ ‖force‖² over fix and remove features
    pub fn diagram_loss(&self) -> f64 {
        self.forces.iter().map(Force::norm_squared).sum()
    }

    /// The diagram the forces aim at: fixed points moved to (0, 1),
    /// removed points projected onto the diagonal, the rest unchanged
    pub fn corrected(&self, prediction: &PersistenceDiagram) -> PersistenceDiagram {
        prediction.iter()
            .zip(&self.classes)
            .map(|(&point, class)| match class {
                FeatureClass::Fix => DiagramPoint::new(0.0, 1.0),
                FeatureClass::Remove => {
                    let mid = 0.5 * (point.birth + point.death);
                    DiagramPoint::new(mid, mid)
                }
                FeatureClass::Perfect | FeatureClass::Ignored => point,
            })
            .collect()
    }

    pub fn summary(&self) -> MatchSummary {
        let count = |class: FeatureClass| self.classes.iter().filter(|&&c| c == class).count();
        MatchSummary {
            perfect: count(FeatureClass::Perfect),
            fix: count(FeatureClass::Fix),
            remove: count(FeatureClass::Remove),
            ignored: count(FeatureClass::Ignored),
            diagram_loss: self.diagram_loss(),
        }
    }
}

/// Match a prediction diagram against a reference diagram
///
/// # Arguments
/// * `prediction` - Diagram of the predicted field
/// * `reference` - Diagram of the ground truth; only its size is used
/// * `config` - Significance / perfect thresholds and perfect fallback
///
/// # Returns
/// * `DiagramMatch` with one class and one force per prediction feature
pub fn match_diagrams(
    prediction: &PersistenceDiagram,
    reference: &PersistenceDiagram,
    config: &MatchConfig,
) -> Result<DiagramMatch> {
    config.validate()?;
    if let Some(index) = prediction.first_non_finite() {
        return Err(TopoLossError::NonFiniteDiagram { index });
    }

    let lh_pers = prediction.persistences();
    let n = lh_pers.len();

    // More reference features than prediction features: everything is
    // fix-or-perfect and nothing is removed.
    let gt_n = reference.len().min(n);

    // Stable: equal persistences keep oracle order
    let mut ranked: Vec<usize> = (0..n).collect();
    ranked.sort_by(|&a, &b| lh_pers[b].total_cmp(&lh_pers[a]));

    let mut classes = vec![FeatureClass::Remove; n];
    for &i in &ranked[..gt_n] {
        classes[i] = if lh_pers[i] > config.perfect_threshold {
            FeatureClass::Perfect
        } else {
            FeatureClass::Fix
        };
    }

    if config.perfect_fallback == PerfectFallback::BestFeature
        && gt_n > 0
        && !classes.contains(&FeatureClass::Perfect)
    {
        classes[ranked[0]] = FeatureClass::Perfect;
    }

    for (class, &p) in classes.iter_mut().zip(&lh_pers) {
        if *class == FeatureClass::Remove && p <= config.significance_threshold {
            *class = FeatureClass::Ignored;
        }
    }

    let forces = classes.iter()
        .zip(prediction.iter().zip(&lh_pers))
        .map(|(class, (point, &p))| match class {
            FeatureClass::Fix => Force::new(0.0 - point.birth, 1.0 - point.death),
            FeatureClass::Remove => Force::new(p / SQRT_2, -p / SQRT_2),
            FeatureClass::Perfect | FeatureClass::Ignored => Force::default(),
        })
        .collect();

    Ok(DiagramMatch { classes, forces })
}
