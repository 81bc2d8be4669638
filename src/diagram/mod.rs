//! Diagram Module: Persistence Diagrams and Critical Points
//!
//! A persistence diagram summarises the topology of a scalar field under
//! a filtration: every connected component or loop appears ("birth") at
//! one field value and disappears ("death") at another. For image fields
//! each birth and death happens at a specific pixel, the critical cell,
//! which is where a training gradient can act.
//!
//! ## Contents
//!
//! - `DiagramPoint` / `PersistenceDiagram`: (birth, death) pairs
//! - `PixelCoord`: signed (row, col) of a critical cell
//! - `PersistenceFeatures`: diagram plus aligned birth/death coordinates

mod point;
mod features;

pub use point::{DiagramPoint, PersistenceDiagram};
pub use features::{PixelCoord, PersistenceFeatures};
