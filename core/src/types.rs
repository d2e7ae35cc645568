//! Shared primitive types used across the whole engine.

use serde::{Deserialize, Serialize};

/// A bounded 0–100 score.
pub type Score = f64;

/// Stable metric key used in claimed/verified maps (camelCase).
pub type MetricKey = String;

/// Clamp any intermediate score into [0, 100], mapping NaN to 0.
pub fn clamp_score(value: f64) -> Score {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Three-tier risk classification shared by the scoring models.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Tier of the party that assured the disclosure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditType {
    Big4,
    Specialist,
    Industry,
    Internal,
    #[default]
    None,
}

impl AuditType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Big4 => "big4",
            Self::Specialist => "specialist",
            Self::Industry => "industry",
            Self::Internal => "internal",
            Self::None => "none",
        }
    }
}
