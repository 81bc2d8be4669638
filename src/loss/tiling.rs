//! Tile Grid
//!
//! Persistence computation cost grows super-linearly with the field size,
//! so the field is cut into tiles of at most `tile_size × tile_size`.
//! Boundary tiles are smaller. Tiles never overlap and cover every pixel.

use ndarray::{s, ArrayView2};

use crate::error::{Result, TopoLossError};

/// A rectangular region of the full field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Top-left row in the full field
    pub row: usize,
    /// Top-left column in the full field
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Tile {
    pub fn origin(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// This tile's region of `field`
    pub fn view<'a>(&self, field: ArrayView2<'a, f64>) -> ArrayView2<'a, f64> {
        field.slice_move(s![self.row..self.row + self.rows, self.col..self.col + self.cols])
    }
}

/// Row-major partition of a field into tiles
#[derive(Debug, Clone)]
pub struct TileGrid {
    shape: (usize, usize),
    tile_size: usize,
}

impl TileGrid {
    pub fn new(shape: (usize, usize), tile_size: usize) -> Result<Self> {
        if tile_size == 0 {
            return Err(TopoLossError::InvalidTileSize);
        }
        Ok(Self { shape, tile_size })
    }

    pub fn tiles(&self) -> Vec<Tile> {
        let (rows, cols) = self.shape;
        let step = self.tile_size;

        let mut tiles = Vec::new();
        for row in (0..rows).step_by(step) {
            for col in (0..cols).step_by(step) {
                tiles.push(Tile {
                    row,
                    col,
                    rows: step.min(rows - row),
                    cols: step.min(cols - col),
                });
            }
        }
        tiles
    }
}

/// Does this tile trivially carry no topology?
///
/// True for empty tiles, all-foreground (min ≥ 1), all-background
/// (max ≤ 0) and constant tiles.
pub fn is_degenerate(field: ArrayView2<'_, f64>) -> bool {
    if field.is_empty() {
        return true;
    }
    let (min, max) = field.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), &v| (lo.min(v), hi.max(v)),
    );
    min >= 1.0 || max <= 0.0 || min == max
}
