//! Weight and Reference Maps
//!
//! For every feature to fix or remove, the birth and death critical pixels
//! get weight 1 and a target value:
//!
//! | class  | birth pixel            | death pixel            |
//! |--------|------------------------|------------------------|
//! | fix    | 0                      | 1                      |
//! | remove | field at death (or 1)  | field at birth (or 0)  |
//!
//! The loss is then Σ w · (f - r)², an ordinary masked squared error whose
//! maps are constants with respect to the prediction.

use log::trace;
use ndarray::{s, Array2, ArrayView2, Zip};

use crate::diagram::{PersistenceFeatures, PixelCoord};
use crate::error::{Result, TopoLossError};
use crate::matching::DiagramMatch;

/// Outcome of projecting one tile's forces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectionStats {
    /// Critical pixels written into the maps
    pub written: usize,
    /// Critical pixels outside the field
    pub skipped: usize,
}

/// Per-pixel weight and target value
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalPointMaps {
    weight: Array2<f64>,
    reference: Array2<f64>,
}

impl CriticalPointMaps {
    pub fn zeros(shape: (usize, usize)) -> Self {
        Self {
            weight: Array2::zeros(shape),
            reference: Array2::zeros(shape),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.weight.dim()
    }

    /// 1 where a critical pixel is pushed, 0 elsewhere
    pub fn weight(&self) -> &Array2<f64> {
        &self.weight
    }

    /// Target value for every weighted pixel
    pub fn reference(&self) -> &Array2<f64> {
        &self.reference
    }

    /// Number of weighted pixels
    pub fn marked(&self) -> usize {
        self.weight.iter().filter(|&&w| w > 0.0).count()
    }

    pub fn into_parts(self) -> (Array2<f64>, Array2<f64>) {
        (self.weight, self.reference)
    }

    /// Project matched forces onto the critical pixels of `field`.
    ///
    /// Coordinates are relative to `field`, which must have the shape of
    /// the maps. Read and write bounds are checked independently: a pixel
    /// may be written even when its partner lies outside the field.
    pub fn project(
        &mut self,
        field: ArrayView2<'_, f64>,
        features: &PersistenceFeatures,
        matched: &DiagramMatch,
    ) -> Result<ProjectionStats> {
        if field.dim() != self.dim() {
            return Err(TopoLossError::ShapeMismatch {
                expected: self.dim(),
                found: field.dim(),
            });
        }
        if matched.len() != features.len() {
            return Err(TopoLossError::FeatureCountMismatch {
                diagram: matched.len(),
                births: features.birth_coords().len(),
                deaths: features.death_coords().len(),
            });
        }

        let births = features.birth_coords();
        let deaths = features.death_coords();
        let read = |at: PixelCoord| at.index_in(field.dim()).map(|ix| field[ix]);

        let mut stats = ProjectionStats::default();
        for i in matched.fix_indices() {
            self.mark(births[i], 0.0, &mut stats);
            self.mark(deaths[i], 1.0, &mut stats);
        }
        for i in matched.remove_indices() {
            let (birth, death) = (births[i], deaths[i]);
            self.mark(birth, read(death).unwrap_or(1.0), &mut stats);
            self.mark(death, read(birth).unwrap_or(0.0), &mut stats);
        }

        Ok(stats)
    }

    fn mark(&mut self, at: PixelCoord, target: f64, stats: &mut ProjectionStats) {
        match at.index_in(self.dim()) {
            Some(ix) => {
                self.weight[ix] = 1.0;
                self.reference[ix] = target;
                stats.written += 1;
            }
            None => {
                trace!("critical pixel ({}, {}) outside {:?}, skipped", at.row, at.col, self.dim());
                stats.skipped += 1;
            }
        }
    }

    /// Copy a tile's maps into this map at `origin`
    ///
    /// Tiles never overlap, so merging is plain assignment.
    pub fn merge_tile(&mut self, origin: (usize, usize), tile: &CriticalPointMaps) -> Result<()> {
        let (rows, cols) = tile.dim();
        let (r0, c0) = origin;
        if r0 + rows > self.dim().0 || c0 + cols > self.dim().1 {
            return Err(TopoLossError::ShapeMismatch {
                expected: self.dim(),
                found: (r0 + rows, c0 + cols),
            });
        }
        self.weight
            .slice_mut(s![r0..r0 + rows, c0..c0 + cols])
            .assign(&tile.weight);
        self.reference
            .slice_mut(s![r0..r0 + rows, c0..c0 + cols])
            .assign(&tile.reference);
        Ok(())
    }

    /// Σ w · (prediction - r)²
    pub fn loss(&self, prediction: ArrayView2<'_, f64>) -> Result<f64> {
        self.check_shape(prediction)?;
        Ok(Zip::from(&self.weight)
            .and(&prediction)
            .and(&self.reference)
            .fold(0.0, |acc, &w, &p, &r| acc + w * (p - r) * (p - r)))
    }

    /// Dense derivative of `loss` with respect to the prediction,
    /// 2 · w · (prediction - r)
    pub fn gradient(&self, prediction: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_shape(prediction)?;
        Ok(Zip::from(&self.weight)
            .and(&prediction)
            .and(&self.reference)
            .map_collect(|&w, &p, &r| 2.0 * w * (p - r)))
    }

    fn check_shape(&self, field: ArrayView2<'_, f64>) -> Result<()> {
        if field.dim() == self.dim() {
            Ok(())
        } else {
            Err(TopoLossError::ShapeMismatch {
                expected: self.dim(),
                found: field.dim(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::PersistenceDiagram;
    use crate::matching::{match_diagrams, MatchConfig};
    use ndarray::array;

    fn features(pairs: &[(f64, f64)], births: &[(isize, isize)], deaths: &[(isize, isize)]) -> PersistenceFeatures {
        PersistenceFeatures::new(
            PersistenceDiagram::from_pairs(pairs),
            births.iter().map(|&c| c.into()).collect(),
            deaths.iter().map(|&c| c.into()).collect(),
        )
        .unwrap()
    }

    fn one_reference_feature() -> PersistenceDiagram {
        PersistenceDiagram::from_pairs(&[(0.0, 1.0)])
    }

    #[test]
    fn test_fix_and_remove_targets() {
        let field = array![
            [0.1, 0.2, 0.3],
            [0.4, 0.5, 0.6],
            [0.7, 0.8, 0.9]
        ];
        // feature 1 is fixed, feature 0 removed
        let lh = features(
            &[(0.2, 0.6), (0.1, 0.9)],
            &[(0, 1), (0, 0)],
            &[(1, 2), (2, 2)],
        );
        let matched = match_diagrams(lh.diagram(), &one_reference_feature(), &MatchConfig::default()).unwrap();
        assert_eq!(matched.fix_indices(), vec![1]);
        assert_eq!(matched.remove_indices(), vec![0]);

        let mut maps = CriticalPointMaps::zeros(field.dim());
        let stats = maps.project(field.view(), &lh, &matched).unwrap();
        assert_eq!(stats, ProjectionStats { written: 4, skipped: 0 });

        // fix: birth -> 0, death -> 1
        assert_eq!(maps.weight()[[0, 0]], 1.0);
        assert_eq!(maps.reference()[[0, 0]], 0.0);
        assert_eq!(maps.weight()[[2, 2]], 1.0);
        assert_eq!(maps.reference()[[2, 2]], 1.0);

        // remove: birth takes the death value and vice versa
        assert_eq!(maps.reference()[[0, 1]], 0.6);
        assert_eq!(maps.reference()[[1, 2]], 0.2);
        assert_eq!(maps.marked(), 4);
    }

    #[test]
    fn test_out_of_bounds_partner_uses_default() {
        let field = array![[0.3, 0.4], [0.5, 0.6]];
        let lh = features(
            &[(0.0, 1.0), (0.2, 0.7), (0.1, 0.8)],
            &[(0, 0), (1, 1), (-1, 0)],
            &[(0, 1), (2, 0), (1, 0)],
        );
        let matched = match_diagrams(lh.diagram(), &one_reference_feature(), &MatchConfig::default()).unwrap();
        assert_eq!(matched.perfect_indices(), vec![0]);
        assert_eq!(matched.remove_indices(), vec![1, 2]);

        let mut maps = CriticalPointMaps::zeros(field.dim());
        let stats = maps.project(field.view(), &lh, &matched).unwrap();
        assert_eq!(stats, ProjectionStats { written: 2, skipped: 2 });

        // feature 1: death row 2 is outside, birth still written with 1
        assert_eq!(maps.weight()[[1, 1]], 1.0);
        assert_eq!(maps.reference()[[1, 1]], 1.0);
        // feature 2: birth row -1 is outside, death written with 0
        assert_eq!(maps.weight()[[1, 0]], 1.0);
        assert_eq!(maps.reference()[[1, 0]], 0.0);
        // perfect feature untouched
        assert_eq!(maps.weight()[[0, 0]], 0.0);
    }

    #[test]
    fn test_last_pixel_in_bounds_first_outside_rejected() {
        let field = Array2::from_elem((3, 4), 0.5);
        let lh = features(&[(0.2, 0.6)], &[(2, 3)], &[(3, 0)]);
        let matched = match_diagrams(lh.diagram(), &one_reference_feature(), &MatchConfig::default()).unwrap();

        let mut maps = CriticalPointMaps::zeros(field.dim());
        let stats = maps.project(field.view(), &lh, &matched).unwrap();
        assert_eq!(stats, ProjectionStats { written: 1, skipped: 1 });
        assert_eq!(maps.weight()[[2, 3]], 1.0);
    }

    #[test]
    fn test_loss_and_gradient() {
        let field = array![[0.2, 0.8], [0.5, 0.5]];
        let lh = features(&[(0.2, 0.8)], &[(0, 0)], &[(0, 1)]);
        let matched = match_diagrams(lh.diagram(), &one_reference_feature(), &MatchConfig::default()).unwrap();

        let mut maps = CriticalPointMaps::zeros(field.dim());
        maps.project(field.view(), &lh, &matched).unwrap();

        // (0.2 - 0)² + (0.8 - 1)²
        let loss = maps.loss(field.view()).unwrap();
        assert!((loss - 0.08).abs() < 1e-12);

        let grad = maps.gradient(field.view()).unwrap();
        assert!((grad[[0, 0]] - 0.4).abs() < 1e-12);
        assert!((grad[[0, 1]] + 0.4).abs() < 1e-12);
        assert_eq!(grad[[1, 1]], 0.0);
    }

    #[test]
    fn test_shape_checks() {
        let maps = CriticalPointMaps::zeros((2, 2));
        let wrong = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            maps.loss(wrong.view()),
            Err(TopoLossError::ShapeMismatch { expected: (2, 2), found: (2, 3) })
        ));

        let mut full = CriticalPointMaps::zeros((4, 4));
        let tile = CriticalPointMaps::zeros((2, 2));
        assert!(full.merge_tile((2, 2), &tile).is_ok());
        assert!(full.merge_tile((3, 0), &tile).is_err());
    }

    #[test]
    fn test_merge_tile_places_region() {
        let field = array![[0.3, 0.7]];
        let lh = features(&[(0.3, 0.7)], &[(0, 0)], &[(0, 1)]);
        let matched = match_diagrams(lh.diagram(), &one_reference_feature(), &MatchConfig::default()).unwrap();

        let mut tile = CriticalPointMaps::zeros(field.dim());
        tile.project(field.view(), &lh, &matched).unwrap();

        let mut full = CriticalPointMaps::zeros((3, 4));
        full.merge_tile((2, 2), &tile).unwrap();
        assert_eq!(full.marked(), 2);
        assert_eq!(full.weight()[[2, 2]], 1.0);
        assert_eq!(full.reference()[[2, 3]], 1.0);
    }
}
