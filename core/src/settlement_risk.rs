//! Settlement / covenant risk: six weighted factors, expected settlement time.
//!
//! RULE: the 30/70 cut points and the day-estimate coefficients are
//! fixed. Recommendation text branches on the same cut points.

use crate::{
    config::SettlementWeights,
    error::{EngineError, EngineResult},
    types::RiskLevel,
};
use serde::{Deserialize, Serialize};

pub const MEDIUM_RISK_FROM: f64 = 30.0;
pub const HIGH_RISK_FROM: f64 = 70.0;

/// Six independent 0–100 inputs, bounded by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactors {
    pub document_completeness: f64,
    pub amendment_complexity: f64,
    pub cross_border_factors: f64,
    pub party_history: f64,
    pub covenant_status: f64,
    pub market_volatility: f64,
}

impl RiskFactors {
    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("documentCompleteness", self.document_completeness),
            ("amendmentComplexity", self.amendment_complexity),
            ("crossBorderFactors", self.cross_border_factors),
            ("partyHistory", self.party_history),
            ("covenantStatus", self.covenant_status),
            ("marketVolatility", self.market_volatility),
        ]
    }

    /// Reject factors outside [0, 100] before scoring.
    pub fn validate(&self) -> EngineResult<()> {
        match self
            .named()
            .into_iter()
            .find(|(_, v)| !(0.0..=100.0).contains(v))
        {
            Some((factor, value)) => Err(EngineError::InvalidRiskFactor { factor, value }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettlementAssessment {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub expected_settlement_days: u32,
}

pub fn risk_score(factors: &RiskFactors, weights: &SettlementWeights) -> f64 {
    factors.document_completeness * weights.document_completeness
        + factors.amendment_complexity * weights.amendment_complexity
        + factors.cross_border_factors * weights.cross_border_factors
        + factors.party_history * weights.party_history
        + factors.covenant_status * weights.covenant_status
        + factors.market_volatility * weights.market_volatility
}

pub fn risk_level(score: f64) -> RiskLevel {
    if score < MEDIUM_RISK_FROM {
        RiskLevel::Low
    } else if score < HIGH_RISK_FROM {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Piecewise linear: 5–10 days below 30, 10–18 up to 70, 18–25 above.
pub fn estimate_settlement_days(score: f64) -> u32 {
    let days = if score >= HIGH_RISK_FROM {
        18.0 + (score - HIGH_RISK_FROM) * 0.23
    } else if score >= MEDIUM_RISK_FROM {
        10.0 + (score - MEDIUM_RISK_FROM) * 0.2
    } else {
        5.0 + score * 0.17
    };
    days.floor().max(0.0) as u32
}

pub fn assess(factors: &RiskFactors, weights: &SettlementWeights) -> SettlementAssessment {
    let risk_score = risk_score(factors, weights);
    let assessment = SettlementAssessment {
        risk_score,
        risk_level: risk_level(risk_score),
        expected_settlement_days: estimate_settlement_days(risk_score),
    };
    log::debug!(
        "stage=settlement score={:.1} level={} days={}",
        assessment.risk_score,
        assessment.risk_level.as_str(),
        assessment.expected_settlement_days
    );
    assessment
}

/// Validate the factors, then assess.
pub fn assess_checked(
    factors: &RiskFactors,
    weights: &SettlementWeights,
) -> EngineResult<SettlementAssessment> {
    factors.validate()?;
    Ok(assess(factors, weights))
}

/// Guidance text. Branches on the same 30/70 cut points as the score bands.
pub fn recommendations(factors: &RiskFactors, assessment: &SettlementAssessment) -> Vec<String> {
    let mut out = Vec::new();

    if assessment.risk_score < MEDIUM_RISK_FROM {
        out.push(format!(
            "Low settlement risk: eligible for fast-track settlement (~{} days)",
            assessment.expected_settlement_days
        ));
        return out;
    }

    let mut riskiest = factors.named();
    riskiest.sort_by(|a, b| b.1.total_cmp(&a.1));

    if assessment.risk_score < HIGH_RISK_FROM {
        out.push(format!(
            "Moderate settlement risk: standard review, expect ~{} days",
            assessment.expected_settlement_days
        ));
        for (factor, value) in riskiest.iter().take(2) {
            out.push(format!("Review {factor} (factor score {value:.0})"));
        }
    } else {
        out.push(format!(
            "High settlement risk: escalate to senior credit review, expect ~{} days",
            assessment.expected_settlement_days
        ));
        for (factor, value) in riskiest.iter().filter(|(_, v)| *v >= HIGH_RISK_FROM) {
            out.push(format!("Remediate {factor} before settlement (factor score {value:.0})"));
        }
    }
    out
}
