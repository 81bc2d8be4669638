//! # topo-loss
//!
//! Topology-aware loss for dense likelihood maps: penalizes predictions
//! whose persistent homology disagrees with a reference mask.
//!
//! ## Pipeline
//!
//! ```text
//! prediction, reference (rows × cols)
//!        │
//!        ▼ tiles of at most tile_size × tile_size, degenerate tiles skipped
//! PersistenceOracle ──► PersistenceFeatures (diagram + critical pixels)
//!        │
//!        ▼ match_diagrams
//! DiagramMatch: perfect / fix / remove per feature, plus forces
//!        │
//!        ▼ CriticalPointMaps::project
//! weight w, reference r ──► L = Σ w · (f - r)²
//! ```
//!
//! ## Matching
//!
//! Prediction features are ranked by persistence p = |death - birth|.
//! With g the number of reference features:
//!
//! - the top min(g, n) features are kept: pushed to (0, 1) unless already
//!   more persistent than the perfect threshold
//! - every other feature above the significance threshold is pushed onto
//!   the diagonal with force (p/√2, -p/√2)
//!
//! ## Gradient
//!
//! The maps are constants with respect to the prediction, so
//! ∂L/∂f = 2 · w · (f - r). For frameworks that inject gradients by hand,
//! `TopoLoss::gradient` emits -2 · force at each critical pixel.
//!
//! ## Persistence Engine
//!
//! Persistent homology itself is delegated to an implementation of
//! `PersistenceOracle` (a cubical complex library, typically).
//! `PaddedOracle` adds a constant border so loops touching the image edge
//! are detected.

pub mod diagram;
pub mod error;
pub mod loss;
pub mod mapping;
pub mod matching;
pub mod oracle;

pub use diagram::{DiagramPoint, PersistenceDiagram, PersistenceFeatures, PixelCoord};
pub use error::{Result, TopoLossError};
pub use loss::{
    is_degenerate, ExecutionContext, Filtration, GradientEntry, LossReport, Tile, TileGrid,
    TopoLoss, TopoLossConfig, GRADIENT_SCALE,
};
pub use mapping::{CriticalPointMaps, ProjectionStats};
pub use matching::{
    match_diagrams, DiagramMatch, FeatureClass, Force, MatchConfig, MatchSummary, PerfectFallback,
};
pub use oracle::{OracleError, PaddedOracle, PersistenceOracle, PersistenceRecord};

/// Squared norm of all forces: Σ ‖force‖² over every fixed or removed
/// feature.
///
/// A diagram-space loss that needs no critical pixels; useful to monitor
/// topological error independently of the pixel maps.
pub fn diagram_loss(
    prediction: &PersistenceDiagram,
    reference: &PersistenceDiagram,
    config: &MatchConfig,
) -> Result<f64> {
    Ok(match_diagrams(prediction, reference, config)?.diagram_loss())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_loss() {
        let lh = PersistenceDiagram::from_pairs(&[(0.1, 0.9), (0.2, 0.5)]);
        let gt = PersistenceDiagram::from_pairs(&[(0.0, 1.0)]);

        // fix: 0.1² + 0.1², remove: 0.3²
        let loss = diagram_loss(&lh, &gt, &MatchConfig::default()).unwrap();
        assert!((loss - 0.11).abs() < 1e-12);
    }

    #[test]
    fn test_diagram_loss_perfect_match() {
        let diagram = PersistenceDiagram::from_pairs(&[(0.0, 1.0)]);
        let loss = diagram_loss(&diagram, &diagram, &MatchConfig::default()).unwrap();
        assert_eq!(loss, 0.0);
    }
}
