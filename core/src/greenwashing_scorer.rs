//! Greenwashing risk scorer: six weighted components, one 0–100 score.
//!
//! Each component is scored 0–100 on its own evidence; the overall score
//! is their weighted sum, rounded, and classified by fixed cut points
//! (≤30 low, ≤60 medium, otherwise high).
//!
//! Every division guards its denominator and every component is
//! clamped to [0, 100]; the breakdown reproduces the overall score.

use crate::{
    config::{AuditScores, GreenwashingConfig},
    types::{clamp_score, AuditType, RiskLevel, Score},
    verification::{HistoricalRecord, VerificationDatum},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Inclusive upper bound of the low band.
pub const LOW_RISK_MAX: u32 = 30;
/// Inclusive upper bound of the medium band.
pub const MEDIUM_RISK_MAX: u32 = 60;

const NEUTRAL_HISTORY_SCORE: Score = 50.0;
const NO_PEER_DATA_SCORE: Score = 100.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScores {
    pub data_completeness: Score,
    pub external_verification: Score,
    pub methodology_transparency: Score,
    pub third_party_audit: Score,
    pub historical_consistency: Score,
    pub peer_benchmark_deviation: Score,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub component: String,
    pub score: Score,
    pub weight: f64,
    pub weighted_score: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GreenwashingAssessment {
    pub overall_score: u32,
    pub risk_level: RiskLevel,
    pub component_scores: ComponentScores,
    pub breakdown: Vec<BreakdownEntry>,
}

pub fn risk_level_for(score: u32) -> RiskLevel {
    if score <= LOW_RISK_MAX {
        RiskLevel::Low
    } else if score <= MEDIUM_RISK_MAX {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

// ── Components ─────────────────────────────────────────────────────

pub fn data_completeness(datum: &VerificationDatum, config: &GreenwashingConfig) -> Score {
    let base = if datum.total_metrics == 0 {
        0.0
    } else {
        datum.provided_metrics as f64 / datum.total_metrics as f64 * 100.0
    };

    let p = &config.penalties;
    let mut score = base;
    if !datum.has_scope3 {
        score -= p.missing_scope3;
    }
    if !datum.has_baseline {
        score -= p.missing_baseline;
    }
    if !datum.has_methodology {
        score -= p.missing_methodology;
    }
    clamp_score(score)
}

pub fn external_verification(datum: &VerificationDatum, config: &GreenwashingConfig) -> Score {
    let claimed_count = datum.claimed_metrics.len();
    let verified_count = datum
        .claimed_metrics
        .keys()
        .filter(|k| datum.verified_metrics.contains_key(*k))
        .count();

    let base = if claimed_count == 0 {
        0.0
    } else {
        verified_count as f64 / claimed_count as f64 * 100.0
    };

    let p = &config.penalties;
    let mut score = base;
    if !datum.has_third_party_audit {
        score -= p.missing_third_party_audit;
    }
    if verified_count == 0 {
        score -= p.zero_verified_metrics;
    }
    clamp_score(score)
}

/// Assumptions and limitations are treated as bundled with the methodology statement.
pub fn methodology_transparency(datum: &VerificationDatum) -> Score {
    let mut score = 0.0;
    if datum.has_baseline {
        score += 25.0;
    }
    if datum.has_methodology {
        score += 25.0;
        score += 50.0;
    }
    clamp_score(score)
}

pub fn third_party_audit(audit: AuditType, table: &AuditScores) -> Score {
    clamp_score(match audit {
        AuditType::Big4 => table.big4,
        AuditType::Specialist => table.specialist,
        AuditType::Industry => table.industry,
        AuditType::Internal => table.internal,
        AuditType::None => table.none,
    })
}

fn consistency_weight(change_pct: f64) -> f64 {
    if change_pct < 10.0 {
        1.0
    } else if change_pct < 25.0 {
        0.7
    } else if change_pct <= 50.0 {
        0.4
    } else {
        0.0
    }
}

fn relative_change(previous: f64, latest: f64) -> f64 {
    if previous == 0.0 {
        if latest == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        (latest - previous).abs() / previous.abs() * 100.0
    }
}

pub fn historical_consistency(history: &[HistoricalRecord]) -> Score {
    // Merge duplicate years so "two most recent years" means two distinct years.
    let mut by_year: BTreeMap<i32, BTreeMap<&str, f64>> = BTreeMap::new();
    for record in history {
        let year = by_year.entry(record.year).or_default();
        for (key, value) in &record.metrics {
            year.insert(key.as_str(), *value);
        }
    }

    let mut recent = by_year.iter().rev();
    let (Some((_, latest)), Some((_, previous))) = (recent.next(), recent.next()) else {
        return NEUTRAL_HISTORY_SCORE;
    };

    let weights: Vec<f64> = latest
        .iter()
        .filter_map(|(key, now)| previous.get(key).map(|before| relative_change(*before, *now)))
        .map(consistency_weight)
        .collect();

    if weights.is_empty() {
        return NEUTRAL_HISTORY_SCORE;
    }
    clamp_score(weights.iter().sum::<f64>() / weights.len() as f64 * 100.0)
}

fn peer_weight(value: f64, average: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 || std_dev.is_nan() {
        return if value == average { 1.0 } else { 0.0 };
    }
    let z = (value - average).abs() / std_dev;
    if z <= 1.0 {
        1.0
    } else if z <= 2.0 {
        0.7
    } else if z <= 3.0 {
        0.3
    } else {
        0.0
    }
}

pub fn peer_benchmark_deviation(datum: &VerificationDatum) -> Score {
    let weights: Vec<f64> = datum
        .claimed_metrics
        .iter()
        .filter_map(|(key, value)| {
            let value = value.as_number()?;
            let average = datum.peer_average.get(key)?;
            let std_dev = datum.peer_std_dev.get(key)?;
            Some(peer_weight(value, *average, *std_dev))
        })
        .collect();

    if weights.is_empty() {
        return NO_PEER_DATA_SCORE;
    }
    clamp_score(weights.iter().sum::<f64>() / weights.len() as f64 * 100.0)
}

// ── Aggregate ──────────────────────────────────────────────────────

pub fn score(datum: &VerificationDatum, config: &GreenwashingConfig) -> GreenwashingAssessment {
    let components = ComponentScores {
        data_completeness: data_completeness(datum, config),
        external_verification: external_verification(datum, config),
        methodology_transparency: methodology_transparency(datum),
        third_party_audit: third_party_audit(datum.third_party_audit_type, &config.audit_scores),
        historical_consistency: historical_consistency(&datum.historical_data),
        peer_benchmark_deviation: peer_benchmark_deviation(datum),
    };

    let w = &config.weights;
    let breakdown: Vec<BreakdownEntry> = [
        ("dataCompleteness", components.data_completeness, w.data_completeness),
        ("externalVerification", components.external_verification, w.external_verification),
        ("methodologyTransparency", components.methodology_transparency, w.methodology_transparency),
        ("thirdPartyAudit", components.third_party_audit, w.third_party_audit),
        ("historicalConsistency", components.historical_consistency, w.historical_consistency),
        ("peerBenchmarkDeviation", components.peer_benchmark_deviation, w.peer_benchmark_deviation),
    ]
    .into_iter()
    .map(|(component, score, weight)| BreakdownEntry {
        component: component.to_string(),
        score,
        weight,
        weighted_score: score * weight,
    })
    .collect();

    let weighted: f64 = breakdown.iter().map(|b| b.weighted_score).sum();
    let overall_score = clamp_score(weighted).round() as u32;
    let risk_level = risk_level_for(overall_score);

    log::debug!(
        "stage=greenwashing overall={overall_score} level={}",
        risk_level.as_str()
    );

    GreenwashingAssessment {
        overall_score,
        risk_level,
        component_scores: components,
        breakdown,
    }
}
