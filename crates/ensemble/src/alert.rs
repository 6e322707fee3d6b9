//! Alert Tiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fused scores at or above this are warnings
pub const WARNING_THRESHOLD: f64 = 0.3;

/// Fused scores at or above this are critical
pub const CRITICAL_THRESHOLD: f64 = 0.7;

/// Fused scores strictly above this are labeled anomalous
pub const ANOMALY_THRESHOLD: f64 = 0.5;

/// Alert level for one fused score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// score < 0.3
    Normal,
    /// 0.3 <= score < 0.7
    Warning,
    /// score >= 0.7
    Critical,
}

impl AlertLevel {
    /// Classify a fused score
    pub fn from_score(score: f64) -> Self {
        if score >= CRITICAL_THRESHOLD {
            AlertLevel::Critical
        } else if score >= WARNING_THRESHOLD {
            AlertLevel::Warning
        } else {
            AlertLevel::Normal
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Normal => "normal",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }

    /// Get recommended action
    pub fn recommended_action(&self) -> &'static str {
        match self {
            AlertLevel::Normal => "No action required",
            AlertLevel::Warning => "Schedule inspection and increase monitoring frequency",
            AlertLevel::Critical => "Stop the machine and inspect bearings immediately",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary label for one fused score
pub fn is_anomaly(score: f64) -> bool {
    score > ANOMALY_THRESHOLD
}
