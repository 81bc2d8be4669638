//! Tiled Topological Loss
//!
//! For every tile:
//!
//! 1. Skip if the prediction or the reference tile is degenerate
//! 2. Oracle on both tiles → persistence features
//! 3. Match prediction features against reference features
//! 4. Project forces onto the prediction's critical pixels
//!
//! Tile maps are merged into full-size weight/reference maps and reduced
//! to L = Σ w · (f - r)². Tiles are independent, so they may run on a
//! worker pool; each worker builds private tile maps that are merged once
//! every tile is done.

use log::{debug, trace};
use ndarray::ArrayView2;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::config::{ExecutionContext, TopoLossConfig};
use super::tiling::{is_degenerate, Tile, TileGrid};
use crate::diagram::PersistenceFeatures;
use crate::error::{Result, TopoLossError};
use crate::mapping::CriticalPointMaps;
use crate::matching::{match_diagrams, DiagramMatch, MatchSummary};
use crate::oracle::PersistenceOracle;

/// Scale of the explicit gradient, d/dx of a squared error
pub const GRADIENT_SCALE: f64 = -2.0;

/// One sparse gradient contribution in full-field coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientEntry {
    pub row: isize,
    pub col: isize,
    pub value: f64,
}

/// Loss value together with the maps and tile statistics behind it
#[derive(Debug, Clone)]
pub struct LossReport {
    pub loss: f64,
    pub maps: CriticalPointMaps,
    pub tiles_processed: usize,
    pub tiles_skipped: usize,
    pub n_perfect: usize,
    pub n_fix: usize,
    pub n_remove: usize,
}

/// Matched features of one non-degenerate tile
struct TileMatch {
    features: PersistenceFeatures,
    matched: DiagramMatch,
}

/// Topological loss over a persistence oracle
pub struct TopoLoss<O> {
    oracle: O,
    config: TopoLossConfig,
    /// Dedicated workers for `Parallel { threads: Some(n) }`; otherwise
    /// parallel runs use the global rayon pool
    pool: Option<ThreadPool>,
}

impl<O: PersistenceOracle> TopoLoss<O> {
    /// Loss with the default configuration
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            config: TopoLossConfig::default(),
            pool: None,
        }
    }

    /// Validates `config` and builds the worker pool it asks for, once
    pub fn with_config(oracle: O, config: TopoLossConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.execution {
            ExecutionContext::Parallel { threads: Some(n) } => {
                Some(ThreadPoolBuilder::new().num_threads(n).build()?)
            }
            _ => None,
        };
        Ok(Self { oracle, config, pool })
    }

    pub fn config(&self) -> &TopoLossConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Scalar topological loss of `prediction` against `reference`
    pub fn loss(&self, prediction: ArrayView2<'_, f64>, reference: ArrayView2<'_, f64>) -> Result<f64> {
        Ok(self.evaluate(prediction, reference)?.loss)
    }

    /// Weight and reference maps; constants for backpropagation
    pub fn critical_point_maps(
        &self,
        prediction: ArrayView2<'_, f64>,
        reference: ArrayView2<'_, f64>,
    ) -> Result<CriticalPointMaps> {
        Ok(self.evaluate(prediction, reference)?.maps)
    }

    /// Full evaluation: loss, maps and tile statistics
    pub fn evaluate(
        &self,
        prediction: ArrayView2<'_, f64>,
        reference: ArrayView2<'_, f64>,
    ) -> Result<LossReport> {
        let outcomes = self.run_tiles(prediction, reference, |tile, tm| {
            let mut maps = CriticalPointMaps::zeros(tile.shape());
            let stats = maps.project(tile.view(prediction), &tm.features, &tm.matched)?;
            if stats.skipped > 0 {
                debug!(
                    "tile ({}, {}): {} critical pixels outside the tile",
                    tile.row, tile.col, stats.skipped
                );
            }
            Ok(maps)
        })?;

        let mut report = LossReport {
            loss: 0.0,
            maps: CriticalPointMaps::zeros(prediction.dim()),
            tiles_processed: 0,
            tiles_skipped: 0,
            n_perfect: 0,
            n_fix: 0,
            n_remove: 0,
        };
        for (tile, outcome) in outcomes {
            match outcome {
                Some((summary, maps)) => {
                    report.maps.merge_tile(tile.origin(), &maps)?;
                    report.tiles_processed += 1;
                    report.n_perfect += summary.perfect;
                    report.n_fix += summary.fix;
                    report.n_remove += summary.remove;
                }
                None => report.tiles_skipped += 1,
            }
        }
        report.loss = report.maps.loss(prediction)?;

        debug!(
            "topological loss {:.6}: {} tiles matched, {} skipped, {} fix, {} remove",
            report.loss, report.tiles_processed, report.tiles_skipped, report.n_fix, report.n_remove
        );
        Ok(report)
    }

    /// Explicit sparse gradient for manual injection
    ///
    /// Up to two entries per fixed or removed feature (birth pixel, then death
    /// pixel), in full-field coordinates, valued `-2 · force`. Fixed
    /// features precede removed ones within a tile; tiles are row-major.
    /// Critical pixels outside their tile (padding cells) are dropped, as
    /// in `CriticalPointMaps::project`.
    pub fn gradient(
        &self,
        prediction: ArrayView2<'_, f64>,
        reference: ArrayView2<'_, f64>,
    ) -> Result<Vec<GradientEntry>> {
        let outcomes = self.run_tiles(prediction, reference, |tile, tm| {
            let (dr, dc) = (tile.row as isize, tile.col as isize);
            let births = tm.features.birth_coords();
            let deaths = tm.features.death_coords();

            let mut entries = Vec::new();
            for i in tm.matched.fix_indices().into_iter().chain(tm.matched.remove_indices()) {
                let force = tm.matched.force(i);
                for (at, component) in [(births[i], force.birth), (deaths[i], force.death)] {
                    if at.index_in(tile.shape()).is_none() {
                        trace!("critical pixel ({}, {}) outside tile ({}, {}), skipped", at.row, at.col, tile.row, tile.col);
                        continue;
                    }
                    let global = at.offset(dr, dc);
                    entries.push(GradientEntry {
                        row: global.row,
                        col: global.col,
                        value: GRADIENT_SCALE * component,
                    });
                }
            }
            Ok(entries)
        })?;

        Ok(outcomes
            .into_iter()
            .filter_map(|(_, outcome)| outcome)
            .flat_map(|(_, entries)| entries)
            .collect())
    }

    /// Match every tile and hand non-degenerate ones to `per_tile`.
    ///
    /// Returns, in row-major tile order, each tile's match summary and
    /// result, or `None` for skipped tiles.
    fn run_tiles<T, F>(
        &self,
        prediction: ArrayView2<'_, f64>,
        reference: ArrayView2<'_, f64>,
        per_tile: F,
    ) -> Result<Vec<(Tile, Option<(MatchSummary, T)>)>>
    where
        T: Send,
        F: Fn(&Tile, &TileMatch) -> Result<T> + Sync,
    {
        if prediction.dim() != reference.dim() {
            return Err(TopoLossError::ShapeMismatch {
                expected: prediction.dim(),
                found: reference.dim(),
            });
        }
        let tiles = TileGrid::new(prediction.dim(), self.config.tile_size)?.tiles();

        let process = |tile: &Tile| -> Result<(Tile, Option<(MatchSummary, T)>)> {
            let outcome = match self.match_tile(tile, prediction, reference)? {
                Some(tm) => Some((tm.matched.summary(), per_tile(tile, &tm)?)),
                None => None,
            };
            Ok((*tile, outcome))
        };

        match self.config.execution {
            ExecutionContext::Sequential => tiles.iter().map(process).collect(),
            ExecutionContext::Parallel { .. } => match &self.pool {
                Some(pool) => pool.install(|| tiles.par_iter().map(process).collect()),
                None => tiles.par_iter().map(process).collect(),
            },
        }
    }

    fn match_tile(
        &self,
        tile: &Tile,
        prediction: ArrayView2<'_, f64>,
        reference: ArrayView2<'_, f64>,
    ) -> Result<Option<TileMatch>> {
        let lh = tile.view(prediction);
        let gt = tile.view(reference);
        if is_degenerate(lh) || is_degenerate(gt) {
            debug!("tile ({}, {}) {}x{}: degenerate, skipped", tile.row, tile.col, tile.rows, tile.cols);
            return Ok(None);
        }

        let features = self.features(lh)?;
        let gt_features = self.features(gt)?;
        let matched = match_diagrams(features.diagram(), gt_features.diagram(), &self.config.matching)?;

        let summary = matched.summary();
        debug!(
            "tile ({}, {}): {} prediction / {} reference features, {} perfect, {} fix, {} remove, {} ignored",
            tile.row,
            tile.col,
            features.len(),
            gt_features.len(),
            summary.perfect,
            summary.fix,
            summary.remove,
            summary.ignored
        );

        Ok(Some(TileMatch { features, matched }))
    }

    fn features(&self, field: ArrayView2<'_, f64>) -> Result<PersistenceFeatures> {
        let filtered = self.config.filtration.apply(field);
        let records = self.oracle.compute_persistence(filtered.view())?;
        Ok(PersistenceFeatures::from_records(&records, self.config.homology_dimension))
    }
}
