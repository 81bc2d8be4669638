//! Matching Module: Persistence Diagram Matching and Forces
//!
//! Decides, for every feature of a predicted persistence diagram, whether
//! it is a true structure that must be strengthened, a spurious one that
//! must be erased, or one that is already correct:
//!
//! ```text
//!  death
//!   1 ┤ ●(0,1) ◄── fix: pushed to the corner
//!     │    ╱
//!     │  ╱  ◄── remove: pushed onto the diagonal
//!     │╱
//!   0 └──────── birth
//! ```
//!
//! The resulting per-feature forces drive the critical-point mapper.

mod config;
mod matcher;

pub use config::{MatchConfig, PerfectFallback};
pub use matcher::{match_diagrams, DiagramMatch, FeatureClass, Force, MatchSummary};
