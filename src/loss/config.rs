//! Aggregator configuration.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TopoLossError};
use crate::matching::MatchConfig;

/// Which filtration the oracle sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filtration {
    /// Oracle receives 1 - field: confident foreground enters first
    #[default]
    Superlevel,
    /// Oracle receives the field as is
    Sublevel,
}

impl Filtration {
    pub fn apply(&self, field: ArrayView2<'_, f64>) -> Array2<f64> {
        match self {
            Filtration::Superlevel => field.mapv(|v| 1.0 - v),
            Filtration::Sublevel => field.to_owned(),
        }
    }
}

/// Where tiles are processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// Calling thread, tiles in row-major order
    #[default]
    Sequential,
    /// Worker pool of `threads` workers; `None` uses the global rayon pool
    Parallel { threads: Option<usize> },
}

/// Configuration for the tiled topological loss
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopoLossConfig {
    /// Maximum tile edge in pixels
    pub tile_size: usize,
    pub matching: MatchConfig,
    /// Homology dimension of the oracle records to match
    pub homology_dimension: usize,
    pub filtration: Filtration,
    pub execution: ExecutionContext,
}

impl Default for TopoLossConfig {
    fn default() -> Self {
        Self {
            tile_size: 100,
            matching: MatchConfig::default(),
            homology_dimension: 0,
            filtration: Filtration::Superlevel,
            execution: ExecutionContext::Sequential,
        }
    }
}

impl TopoLossConfig {
    pub fn with_tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_matching(mut self, matching: MatchConfig) -> Self {
        self.matching = matching;
        self
    }

    pub fn with_homology_dimension(mut self, dimension: usize) -> Self {
        self.homology_dimension = dimension;
        self
    }

    pub fn with_filtration(mut self, filtration: Filtration) -> Self {
        self.filtration = filtration;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionContext) -> Self {
        self.execution = execution;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(TopoLossError::InvalidTileSize);
        }
        self.matching.validate()
    }
}
