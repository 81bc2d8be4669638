//! Oracle Module: Interface to the Persistent Homology Engine
//!
//! Computing persistence pairs of a cubical complex is delegated to an
//! external engine. This module defines the narrow contract the loss
//! needs from it:
//!
//! ```text
//! field (rows × cols) ──► PersistenceOracle ──► [(dim, birth, death, birth_px, death_px)]
//! ```
//!
//! `birth`/`death` are field values at the critical cells, `birth_px` and
//! `death_px` are (row, col) coordinates into the field. A field without
//! detectable features yields an empty list, never an error.
//!
//! `PaddedOracle` wraps any engine with a constant border so that loops
//! touching the image boundary are closed and detected.

mod padded;

#[cfg(test)]
pub(crate) mod testing;

use ndarray::ArrayView2;
use thiserror::Error;

use crate::diagram::PixelCoord;

pub use padded::{pad_field, PaddedOracle};

/// One persistence pair as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersistenceRecord {
    /// Homology dimension (0 = components, 1 = loops)
    pub dimension: usize,
    /// Field value at the birth cell
    pub birth: f64,
    /// Field value at the death cell
    pub death: f64,
    pub birth_pixel: PixelCoord,
    pub death_pixel: PixelCoord,
}

impl PersistenceRecord {
    pub fn new(
        dimension: usize,
        (birth, death): (f64, f64),
        birth_pixel: (isize, isize),
        death_pixel: (isize, isize),
    ) -> Self {
        Self {
            dimension,
            birth,
            death,
            birth_pixel: birth_pixel.into(),
            death_pixel: death_pixel.into(),
        }
    }
}

/// Failures reported by a persistence engine
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("malformed field: {0}")]
    MalformedField(String),

    #[error("pad width {0} is too small, at least 2 cells are required")]
    InvalidPadWidth(usize),

    #[error("persistence backend failed")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// External persistent homology engine
///
/// Implementations must be deterministic; the aggregator never retries a
/// failed call. `Sync` is required so tiles can be processed on a worker
/// pool.
pub trait PersistenceOracle: Sync {
    fn compute_persistence(
        &self,
        field: ArrayView2<'_, f64>,
    ) -> Result<Vec<PersistenceRecord>, OracleError>;
}

impl<O: PersistenceOracle + ?Sized> PersistenceOracle for &O {
    fn compute_persistence(
        &self,
        field: ArrayView2<'_, f64>,
    ) -> Result<Vec<PersistenceRecord>, OracleError> {
        (**self).compute_persistence(field)
    }
}
