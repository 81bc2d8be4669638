//! Persistence Diagram Points
//!
//! A point (b, d) records a topological feature that is "born" at
//! filtration value b and "dies" at value d.
//!
//! ## Interpretation
//!
//! - Points far from the diagonal (large |d - b|) are robust structure
//! - Points near the diagonal are noise: small dents in the field
//! - The corner (0, 1) is a maximally confident feature of a probability map

/// A single (birth, death) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramPoint {
    pub birth: f64,
    pub death: f64,
}

impl DiagramPoint {
    pub fn new(birth: f64, death: f64) -> Self {
        Self { birth, death }
    }

    /// Lifetime of the feature, |death - birth|
    pub fn persistence(&self) -> f64 {
        (self.death - self.birth).abs()
    }

    pub fn is_finite(&self) -> bool {
        self.birth.is_finite() && self.death.is_finite()
    }
}

impl From<(f64, f64)> for DiagramPoint {
    fn from((birth, death): (f64, f64)) -> Self {
        Self::new(birth, death)
    }
}

/// Persistence diagram in oracle order
///
/// The order carries no meaning beyond aligning index-for-index with the
/// critical point lists of the same features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistenceDiagram {
    pub points: Vec<DiagramPoint>,
}

impl PersistenceDiagram {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        pairs.iter().copied().collect()
    }

    pub fn push(&mut self, point: DiagramPoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiagramPoint> {
        self.points.iter()
    }

    /// Persistence of every point, in diagram order
    pub fn persistences(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.persistence()).collect()
    }

    /// Total persistence (sum of all lifetimes)
    pub fn total_persistence(&self) -> f64 {
        self.points.iter().map(|p| p.persistence()).sum()
    }

    /// Maximum persistence, 0 for an empty diagram
    pub fn max_persistence(&self) -> f64 {
        self.points.iter()
            .map(|p| p.persistence())
            .fold(0.0, f64::max)
    }

    /// Index of the first point with a NaN or infinite coordinate
    pub fn first_non_finite(&self) -> Option<usize> {
        self.points.iter().position(|p| !p.is_finite())
    }
}

impl FromIterator<DiagramPoint> for PersistenceDiagram {
    fn from_iter<I: IntoIterator<Item = DiagramPoint>>(iter: I) -> Self {
        Self { points: iter.into_iter().collect() }
    }
}

impl FromIterator<(f64, f64)> for PersistenceDiagram {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        iter.into_iter().map(DiagramPoint::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_is_absolute() {
        let p = DiagramPoint::new(0.9, 0.1);
        assert!((p.persistence() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_diagram_summaries() {
        let pd = PersistenceDiagram::from_pairs(&[(0.0, 0.4), (0.1, 0.9), (0.2, 0.25)]);

        assert_eq!(pd.len(), 3);
        assert!((pd.total_persistence() - 1.25).abs() < 1e-12);
        assert!((pd.max_persistence() - 0.8).abs() < 1e-12);
        assert_eq!(pd.first_non_finite(), None);
    }

    #[test]
    fn test_empty_diagram() {
        let pd = PersistenceDiagram::new();
        assert!(pd.is_empty());
        assert_eq!(pd.max_persistence(), 0.0);
    }

    #[test]
    fn test_non_finite_detection() {
        let pd = PersistenceDiagram::from_pairs(&[(0.0, 1.0), (0.2, f64::INFINITY)]);
        assert_eq!(pd.first_non_finite(), Some(1));
    }
}
