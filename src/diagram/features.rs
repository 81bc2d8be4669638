//! Diagram Features with Critical Points
//!
//! Binds a persistence diagram to the pixel locations of each feature's
//! birth and death critical cells. Index i of the diagram, the birth list
//! and the death list always refer to the same topological feature.

use super::{DiagramPoint, PersistenceDiagram};
use crate::error::{Result, TopoLossError};
use crate::oracle::PersistenceRecord;

/// Pixel coordinate of a critical cell
///
/// Signed because oracles that pad the field report cells inside the
/// padding with negative coordinates once the pad offset is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub row: isize,
    pub col: isize,
}

impl PixelCoord {
    pub fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }

    /// Array index if the coordinate lies inside a `(rows, cols)` grid
    pub fn index_in(&self, shape: (usize, usize)) -> Option<(usize, usize)> {
        let row = usize::try_from(self.row).ok()?;
        let col = usize::try_from(self.col).ok()?;
        if row < shape.0 && col < shape.1 {
            Some((row, col))
        } else {
            None
        }
    }

    pub fn offset(&self, rows: isize, cols: isize) -> Self {
        Self::new(self.row + rows, self.col + cols)
    }
}

impl From<(isize, isize)> for PixelCoord {
    fn from((row, col): (isize, isize)) -> Self {
        Self::new(row, col)
    }
}

/// A diagram together with its aligned critical point lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistenceFeatures {
    diagram: PersistenceDiagram,
    birth_coords: Vec<PixelCoord>,
    death_coords: Vec<PixelCoord>,
}

impl PersistenceFeatures {
    /// Bind a diagram to its critical points.
    ///
    /// Fails with `FeatureCountMismatch` unless all three sequences have
    /// the same length; nothing is ever truncated.
    pub fn new(
        diagram: PersistenceDiagram,
        birth_coords: Vec<PixelCoord>,
        death_coords: Vec<PixelCoord>,
    ) -> Result<Self> {
        if birth_coords.len() != diagram.len() || death_coords.len() != diagram.len() {
            return Err(TopoLossError::FeatureCountMismatch {
                diagram: diagram.len(),
                births: birth_coords.len(),
                deaths: death_coords.len(),
            });
        }
        Ok(Self { diagram, birth_coords, death_coords })
    }

    /// Collect the records of one homology dimension, keeping oracle order
    pub fn from_records(records: &[PersistenceRecord], dimension: usize) -> Self {
        let mut features = Self::default();
        for record in records.iter().filter(|r| r.dimension == dimension) {
            features.diagram.push(DiagramPoint::new(record.birth, record.death));
            features.birth_coords.push(record.birth_pixel);
            features.death_coords.push(record.death_pixel);
        }
        features
    }

    pub fn diagram(&self) -> &PersistenceDiagram {
        &self.diagram
    }

    pub fn birth_coords(&self) -> &[PixelCoord] {
        &self.birth_coords
    }

    pub fn death_coords(&self) -> &[PixelCoord] {
        &self.death_coords
    }

    pub fn len(&self) -> usize {
        self.diagram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagram.is_empty()
    }
}
