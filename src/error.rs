//! Error types for diagram matching and loss aggregation.

use thiserror::Error;

use crate::oracle::OracleError;

/// Errors produced by the matcher, the force mapper and the tiled aggregator.
///
/// Degenerate tiles and out-of-bounds critical points are recovered
/// internally and never surface here.
#[derive(Debug, Error)]
pub enum TopoLossError {
    #[error("field shape {found:?} does not match expected shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("diagram has {diagram} features but {births} birth and {deaths} death critical points")]
    FeatureCountMismatch {
        diagram: usize,
        births: usize,
        deaths: usize,
    },

    #[error("diagram feature {index} has a non-finite birth or death value")]
    NonFiniteDiagram { index: usize },

    #[error("tile size must be > 0")]
    InvalidTileSize,

    #[error("threshold `{name}` must be finite and >= 0, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("failed to build tile worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, TopoLossError>;
