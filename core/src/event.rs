//! The analysis audit trail.
//!
//! RULE: every pipeline stage records exactly one event, in execution
//! order. Events carry counts and verdicts, never document text, so the
//! trail can be logged or stored without leaking the disclosure.

use crate::{
    lma_compliance::ComplianceOutcome, types::RiskLevel, verification::VerificationMode,
};
use serde::{Deserialize, Serialize};

/// Variants are appended as stages are added; never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisEvent {
    // ── Intake ─────────────────────────────────────
    AnalysisStarted {
        text_chars: usize,
        file_name: Option<String>,
        history_snapshots: usize,
    },

    // ── Extraction ─────────────────────────────────
    SectionsChunked {
        sections: usize,
    },
    ProfileExtracted {
        metrics_found: usize,
        improvements: usize,
        completeness: u32,
    },

    // ── Verification ───────────────────────────────
    VerificationFetched {
        mode: VerificationMode,
        requested: usize,
        answered: usize,
    },
    /// The feed gave no response; every comparison fails closed.
    VerificationUnavailable {
        mode: VerificationMode,
        requested: usize,
    },
    ComparisonCompleted {
        rows: usize,
        critical: usize,
    },
    ThirdPartyChecked {
        available: bool,
        confirmations: usize,
        expired_certifications: usize,
    },

    // ── Scoring ────────────────────────────────────
    ComplianceMapped {
        pass: usize,
        partial: usize,
        fail: usize,
        outcome: ComplianceOutcome,
    },
    GreenwashingScored {
        overall_score: u32,
        risk_level: RiskLevel,
    },
    AnalysisCompleted {
        red_flags: usize,
    },
}

impl AnalysisEvent {
    /// Stable name of the variant, matching its serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AnalysisStarted { .. } => "analysis_started",
            Self::SectionsChunked { .. } => "sections_chunked",
            Self::ProfileExtracted { .. } => "profile_extracted",
            Self::VerificationFetched { .. } => "verification_fetched",
            Self::VerificationUnavailable { .. } => "verification_unavailable",
            Self::ComparisonCompleted { .. } => "comparison_completed",
            Self::ThirdPartyChecked { .. } => "third_party_checked",
            Self::ComplianceMapped { .. } => "compliance_mapped",
            Self::GreenwashingScored { .. } => "greenwashing_scored",
            Self::AnalysisCompleted { .. } => "analysis_completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_matches_serialized_tag() {
        let event = AnalysisEvent::ComparisonCompleted { rows: 5, critical: 5 };
        let json = serde_json::to_value(&event).expect("event serializes");
        assert_eq!(json["type"], event.name());
    }
}
