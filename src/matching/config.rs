//! Matcher thresholds.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopoLossError};

/// What to protect when no prediction feature clears the perfect threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerfectFallback {
    /// No feature is perfect; the top-ranked ones are all fixed
    #[default]
    None,
    /// The single most persistent feature is treated as perfect, e.g. the
    /// loop formed by a padded image boundary
    BestFeature,
}

/// Thresholds for classifying prediction features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Remove candidates at or below this persistence are left alone
    pub significance_threshold: f64,
    /// Features above this persistence need no force
    pub perfect_threshold: f64,
    pub perfect_fallback: PerfectFallback,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            significance_threshold: 0.03,
            perfect_threshold: 0.99,
            perfect_fallback: PerfectFallback::None,
        }
    }
}

impl MatchConfig {
    pub fn new(significance_threshold: f64, perfect_threshold: f64) -> Self {
        Self {
            significance_threshold,
            perfect_threshold,
            ..Self::default()
        }
    }

    pub fn with_fallback(mut self, fallback: PerfectFallback) -> Self {
        self.perfect_fallback = fallback;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_threshold("significance_threshold", self.significance_threshold)?;
        check_threshold("perfect_threshold", self.perfect_threshold)
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TopoLossError::InvalidThreshold { name, value })
    }
}
