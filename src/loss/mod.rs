//! Loss Module: Tiled Topological Loss Aggregation
//!
//! Turns per-tile diagram matches into a single scalar loss:
//!
//!   L = Σₚ w(p) · (f(p) - r(p))²
//!
//! where w marks the critical pixels of features to fix or remove and r
//! holds their target values. Since w and r are constants with respect to
//! the prediction f, dL/df = 2 · w · (f - r) and the loss plugs into any
//! autodiff pipeline. `TopoLoss::gradient` instead returns the sparse
//! per-critical-pixel forces for manual gradient injection.

mod aggregator;
mod config;
mod tiling;

pub use aggregator::{GradientEntry, LossReport, TopoLoss, GRADIENT_SCALE};
pub use config::{ExecutionContext, Filtration, TopoLossConfig};
pub use tiling::{is_degenerate, Tile, TileGrid};
