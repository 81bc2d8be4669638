//! Deterministic stand-in engines for unit tests.

use std::sync::Mutex;

use ndarray::ArrayView2;

use super::{OracleError, PersistenceOracle, PersistenceRecord};

/// Crude 0-dimensional engine: every strict local minimum except the
/// global one is a component born at its own value and killed at the
/// global maximum. Enough structure to drive the aggregator end to end.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMinimaOracle;

impl PersistenceOracle for LocalMinimaOracle {
    fn compute_persistence(
        &self,
        field: ArrayView2<'_, f64>,
    ) -> Result<Vec<PersistenceRecord>, OracleError> {
        if field.iter().any(|v| !v.is_finite()) {
            return Err(OracleError::MalformedField("non-finite value".into()));
        }
        let (rows, cols) = field.dim();
        if rows == 0 || cols == 0 {
            return Ok(Vec::new());
        }

        let mut max_at = (0, 0);
        let mut min_at = (0, 0);
        for ((r, c), &v) in field.indexed_iter() {
            if v > field[max_at] {
                max_at = (r, c);
            }
            if v < field[min_at] {
                min_at = (r, c);
            }
        }
        let death = field[max_at];

        let mut records = Vec::new();
        for ((r, c), &v) in field.indexed_iter() {
            if (r, c) == min_at || v >= death {
                continue;
            }
            let neighbours = [
                (r.wrapping_sub(1), c),
                (r + 1, c),
                (r, c.wrapping_sub(1)),
                (r, c + 1),
            ];
            let is_min = neighbours
                .iter()
                .filter(|&&(nr, nc)| nr < rows && nc < cols)
                .all(|&(nr, nc)| v < field[[nr, nc]]);
            if is_min {
                records.push(PersistenceRecord::new(
                    0,
                    (v, death),
                    (r as isize, c as isize),
                    (max_at.0 as isize, max_at.1 as isize),
                ));
            }
        }
        Ok(records)
    }
}

/// Returns the same records for every field and remembers the shapes it saw
#[derive(Debug, Default)]
pub struct RecordingOracle {
    records: Vec<PersistenceRecord>,
    seen: Mutex<Vec<(usize, usize)>>,
}

impl RecordingOracle {
    pub fn new(records: Vec<PersistenceRecord>) -> Self {
        Self { records, seen: Mutex::new(Vec::new()) }
    }

    pub fn seen_shapes(&self) -> Vec<(usize, usize)> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl PersistenceOracle for RecordingOracle {
    fn compute_persistence(
        &self,
        field: ArrayView2<'_, f64>,
    ) -> Result<Vec<PersistenceRecord>, OracleError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(field.dim());
        }
        Ok(self.records.clone())
    }
}

/// Always fails
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingOracle;

impl PersistenceOracle for FailingOracle {
    fn compute_persistence(
        &self,
        _field: ArrayView2<'_, f64>,
    ) -> Result<Vec<PersistenceRecord>, OracleError> {
        Err(OracleError::MalformedField("engine refused the field".into()))
    }
}
