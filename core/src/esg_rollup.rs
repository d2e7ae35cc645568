//! ESG roll-up: quarterly metric records to E/S/G sub-scores and one overall.

use crate::config::RollupWeights;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EsgCategory {
    Environmental,
    Social,
    Governance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyMetric {
    /// e.g. "2024-Q3".
    pub quarter: String,
    pub category: EsgCategory,
    pub metric: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EsgScores {
    pub overall: u32,
    pub environmental: u32,
    pub social: u32,
    pub governance: u32,
}

/// Mean value for a category; an absent category averages to 0.
fn category_average(records: &[QuarterlyMetric], category: EsgCategory) -> f64 {
    let values: Vec<f64> = records
        .iter()
        .filter(|r| r.category == category && r.value.is_finite())
        .map(|r| r.value)
        .collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn to_score(value: f64) -> u32 {
    crate::types::clamp_score(value).round() as u32
}

pub fn roll_up(records: &[QuarterlyMetric], weights: &RollupWeights) -> EsgScores {
    let environmental = category_average(records, EsgCategory::Environmental);
    let social = category_average(records, EsgCategory::Social);
    let governance = category_average(records, EsgCategory::Governance);

    let overall = weights.environmental * environmental
        + weights.social * social
        + weights.governance * governance;

    let scores = EsgScores {
        overall: to_score(overall),
        environmental: to_score(environmental),
        social: to_score(social),
        governance: to_score(governance),
    };
    log::debug!(
        "stage=rollup records={} overall={} e={} s={} g={}",
        records.len(),
        scores.overall,
        scores.environmental,
        scores.social,
        scores.governance
    );
    scores
}
