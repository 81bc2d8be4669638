//! Mapping Module: Critical-Point Force Projection
//!
//! Forces live on persistence diagrams; gradients live on pixels. Every
//! diagram point was born and died at a specific critical pixel, so a
//! force on the point becomes a push on those two pixels:
//!
//! ```text
//! diagram point (b, d) ──► birth pixel: value b → target
//!                      └─► death pixel: value d → target
//! ```
//!
//! The targets are collected in `CriticalPointMaps`, a weight map marking
//! the pushed pixels and a reference map holding their target values.

mod maps;

pub use maps::{CriticalPointMaps, ProjectionStats};
