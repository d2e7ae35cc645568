//! Integration tests: settlement / covenant risk model.

use esg_core::{
    config::SettlementWeights,
    error::EngineError,
    settlement_risk::{
        assess, assess_checked, estimate_settlement_days, recommendations, risk_level, RiskFactors,
    },
    types::RiskLevel,
};

fn example() -> RiskFactors {
    RiskFactors {
        document_completeness: 60.0,
        amendment_complexity: 50.0,
        cross_border_factors: 70.0,
        party_history: 40.0,
        covenant_status: 80.0,
        market_volatility: 55.0,
    }
}

fn uniform(value: f64) -> RiskFactors {
    RiskFactors {
        document_completeness: value,
        amendment_complexity: value,
        cross_border_factors: value,
        party_history: value,
        covenant_status: value,
        market_volatility: value,
    }
}

/// Weighted sum 58.7 is medium risk and fifteen days.
#[test]
fn example_assessment() {
    let assessment = assess(&example(), &SettlementWeights::default());
    assert!((assessment.risk_score - 58.7).abs() < 1e-9, "Score was {}", assessment.risk_score);
    assert_eq!(assessment.risk_level, RiskLevel::Medium);
    assert_eq!(assessment.expected_settlement_days, 15);
}

/// Day estimates at the band edges.
#[test]
fn settlement_day_boundaries() {
    assert_eq!(estimate_settlement_days(0.0), 5);
    assert_eq!(estimate_settlement_days(29.99), 10);
    assert_eq!(estimate_settlement_days(30.0), 10);
    assert_eq!(estimate_settlement_days(69.99), 17);
    assert_eq!(estimate_settlement_days(70.0), 18);
    assert_eq!(estimate_settlement_days(100.0), 24);
}

/// Days never decrease as risk rises.
#[test]
fn settlement_days_monotonic() {
    let mut previous = 0;
    for step in 0..=1000 {
        let score = step as f64 / 10.0;
        let days = estimate_settlement_days(score);
        assert!(days >= previous, "Days fell from {previous} to {days} at score {score}");
        assert!((5..=25).contains(&days), "Days {days} out of range at {score}");
        previous = days;
    }
}

/// Levels are exclusive at 30 and 70.
#[test]
fn settlement_levels() {
    assert_eq!(risk_level(29.9), RiskLevel::Low);
    assert_eq!(risk_level(30.0), RiskLevel::Medium);
    assert_eq!(risk_level(69.9), RiskLevel::Medium);
    assert_eq!(risk_level(70.0), RiskLevel::High);
}

/// Out-of-range factors are rejected by the checked entry point.
#[test]
fn rejects_out_of_range_factor() {
    let factors = RiskFactors {
        covenant_status: 120.0,
        ..example()
    };
    match assess_checked(&factors, &SettlementWeights::default()) {
        Err(EngineError::InvalidRiskFactor { factor, value }) => {
            assert_eq!(factor, "covenantStatus");
            assert_eq!(value, 120.0);
        }
        other => panic!("Expected InvalidRiskFactor, got {other:?}"),
    }
    assert!(assess_checked(&example(), &SettlementWeights::default()).is_ok());
}

/// Recommendation text follows the same bands as the score.
#[test]
fn recommendations_follow_bands() {
    let weights = SettlementWeights::default();

    let low = uniform(10.0);
    let text = recommendations(&low, &assess(&low, &weights));
    assert_eq!(text.len(), 1);
    assert!(text[0].contains("fast-track"));

    let medium = example();
    let text = recommendations(&medium, &assess(&medium, &weights));
    assert_eq!(text.len(), 3);
    assert!(text[1].contains("covenantStatus"), "Riskiest factor first: {text:?}");
    assert!(text[2].contains("crossBorderFactors"));

    let high = uniform(85.0);
    let text = recommendations(&high, &assess(&high, &weights));
    assert!(text[0].contains("escalate"));
    assert_eq!(text.len(), 7, "Every factor above 70 gets a remediation line");
}

/// High risk remediates only factors at 70 or above, riskiest first.
#[test]
fn high_risk_remediates_riskiest_factors() {
    let factors = RiskFactors {
        document_completeness: 90.0,
        amendment_complexity: 95.0,
        cross_border_factors: 40.0,
        party_history: 75.0,
        covenant_status: 100.0,
        market_volatility: 50.0,
    };
    let assessment = assess(&factors, &SettlementWeights::default());
    assert_eq!(assessment.risk_level, RiskLevel::High);

    let text = recommendations(&factors, &assessment);
    assert_eq!(text.len(), 5, "Escalation plus four remediation lines: {text:?}");
    assert!(text[1].contains("covenantStatus"));
    assert!(text[2].contains("amendmentComplexity"));
    assert!(text[3].contains("documentCompleteness"));
    assert!(text[4].contains("partyHistory"));
    assert!(text.iter().all(|line| !line.contains("crossBorderFactors")));
}

/// Assessment serializes with its wire keys.
#[test]
fn assessment_wire_shape() {
    let json = serde_json::to_value(assess(&example(), &SettlementWeights::default()))
        .expect("assessment serializes");
    assert_eq!(json["riskLevel"], "medium");
    assert_eq!(json["expectedSettlementDays"], 15);
    assert!(json.get("riskScore").is_some());
}
