//! Boundary Padding Oracle
//!
//! A 1-dimensional feature (loop) that touches the image border is never
//! closed in the raw field and so never detected. Surrounding the field
//! with a constant border of value min(f.min(), 0) closes such loops
//! against the boundary. Coordinates are shifted back afterwards, so a
//! critical cell inside the padding comes back with a negative (or
//! too-large) coordinate and is treated as out of bounds downstream.

use ndarray::{s, Array2, ArrayView2};

use super::{OracleError, PersistenceOracle, PersistenceRecord};

/// Pads the field with a constant border before calling the inner engine
#[derive(Debug, Clone)]
pub struct PaddedOracle<O> {
    inner: O,
    pad_width: usize,
}

impl<O: PersistenceOracle> PaddedOracle<O> {
    pub const DEFAULT_PAD_WIDTH: usize = 2;

    pub fn new(inner: O) -> Self {
        Self {
            inner,
            pad_width: Self::DEFAULT_PAD_WIDTH,
        }
    }

    /// Custom pad width; fewer than 2 cells cannot close boundary loops
    pub fn with_pad_width(inner: O, pad_width: usize) -> Result<Self, OracleError> {
        if pad_width < Self::DEFAULT_PAD_WIDTH {
            return Err(OracleError::InvalidPadWidth(pad_width));
        }
        Ok(Self { inner, pad_width })
    }

    pub fn pad_width(&self) -> usize {
        self.pad_width
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

/// Constant-pad `field` by `width` cells of min(field.min(), 0)
pub fn pad_field(field: ArrayView2<'_, f64>, width: usize) -> Array2<f64> {
    let (rows, cols) = field.dim();
    let value = field.iter().copied().fold(0.0, f64::min);

    let mut padded = Array2::from_elem((rows + 2 * width, cols + 2 * width), value);
    padded
        .slice_mut(s![width..width + rows, width..width + cols])
        .assign(&field);
    padded
}

impl<O: PersistenceOracle> PersistenceOracle for PaddedOracle<O> {
    fn compute_persistence(
        &self,
        field: ArrayView2<'_, f64>,
    ) -> Result<Vec<PersistenceRecord>, OracleError> {
        let padded = pad_field(field, self.pad_width);
        let shift = -(self.pad_width as isize);

        let records = self.inner.compute_persistence(padded.view())?;
        Ok(records
            .into_iter()
            .map(|r| PersistenceRecord {
                birth_pixel: r.birth_pixel.offset(shift, shift),
                death_pixel: r.death_pixel.offset(shift, shift),
                ..r
            })
            .collect())
    }
}
