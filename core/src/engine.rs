//! The disclosure engine: one document in, one analysis report out.
//!
//! EXECUTION ORDER (fixed, never reordered):
//!   1. Section chunking
//!   2. Profile extraction (metrics, improvements, signals, metadata)
//!   3. Verification feed
//!   4. Claimed-vs-verified comparison
//!   5. Third-party verification
//!   6. LMA compliance mapping
//!   7. Greenwashing scoring
//!   8. Red flags
//!
//! RULES:
//!   - Extraction and scoring are pure; only the feed and the third-party
//!     verifier may draw randomness, each from its own RngBank stream.
//!   - A feed that does not answer fails closed.
//!   - Every stage records one AnalysisEvent.

use crate::{
    config::EngineConfig,
    error::EngineResult,
    esg_rollup::{self, EsgScores, QuarterlyMetric},
    event::AnalysisEvent,
    greenwashing_scorer::{self, GreenwashingAssessment},
    lma_compliance::{
        map_compliance, overall_outcome, ComplianceOutcome, ComplianceStatus, LmaComplianceMapping,
    },
    profile::ExtractedDocumentProfile,
    rng::{RngBank, StreamSlot},
    section_chunker::{chunk_sections, SectionChunk},
    settlement_risk::{self, RiskFactors, SettlementAssessment},
    snapshot::{yearly_history, HistoricalSnapshot},
    third_party::{NoThirdParty, SimulatedThirdParty, ThirdPartyReport, ThirdPartyVerifier},
    types::{AuditType, RiskLevel},
    verification::{
        compare, feed_requests, ClaimedVsVerified, DeviationStatus, PeerBenchmarks,
        SimulatedFeed, TrackedMetric, UnavailableFeed, VerificationDatum, VerificationFeed,
        VerificationMode,
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub text: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
    /// Month-keyed score snapshots from the caller's storage.
    #[serde(default)]
    pub history: Vec<HistoricalSnapshot>,
    #[serde(default)]
    pub peer_benchmarks: Option<PeerBenchmarks>,
}

impl AnalysisRequest {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub file_name: Option<String>,
    pub page_count: Option<u32>,
    pub profile: ExtractedDocumentProfile,
    pub sections: Vec<SectionChunk>,
    pub verification_mode: VerificationMode,
    pub claimed_vs_verified: Vec<ClaimedVsVerified>,
    pub verification_datum: VerificationDatum,
    pub third_party: ThirdPartyReport,
    pub lma_compliance: Vec<LmaComplianceMapping>,
    pub lma_outcome: ComplianceOutcome,
    pub greenwashing: GreenwashingAssessment,
    pub red_flags: Vec<String>,
    pub events: Vec<AnalysisEvent>,
}

pub struct DisclosureEngine {
    pub config: EngineConfig,
    feed: Box<dyn VerificationFeed>,
    third_party: Box<dyn ThirdPartyVerifier>,
}

impl DisclosureEngine {
    /// Engine with no verification sources wired in. Every comparison
    /// row is critical until a feed is attached.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            feed: Box::new(UnavailableFeed),
            third_party: Box::new(NoThirdParty),
        }
    }

    /// Engine whose feed and third-party verifier are seeded simulations.
    /// Reports are labelled `simulated`.
    pub fn simulated(config: EngineConfig, seed: u64) -> Self {
        let bank = RngBank::new(seed);
        let feed = SimulatedFeed::new(
            bank.for_stream(StreamSlot::VerificationFeed),
            config.verification.simulation.clone(),
        );
        let third_party = SimulatedThirdParty::new(
            bank.for_stream(StreamSlot::ThirdParty),
            config.verification.simulation.clone(),
            config.verification.expiring_soon_days,
        );
        Self {
            config,
            feed: Box::new(feed),
            third_party: Box::new(third_party),
        }
    }

    pub fn with_feed(mut self, feed: Box<dyn VerificationFeed>) -> Self {
        self.feed = feed;
        self
    }

    pub fn with_third_party(mut self, verifier: Box<dyn ThirdPartyVerifier>) -> Self {
        self.third_party = verifier;
        self
    }

    pub fn verification_mode(&self) -> VerificationMode {
        self.feed.mode()
    }

    /// Run the full pipeline over one document.
    ///
    /// Fails only when the supplied history snapshots are malformed; the
    /// text itself never causes an error.
    pub fn analyze(
        &mut self,
        request: &AnalysisRequest,
        as_of: NaiveDate,
    ) -> EngineResult<AnalysisReport> {
        let history = yearly_history(&request.history)?;
        let mut events = vec![AnalysisEvent::AnalysisStarted {
            text_chars: request.text.chars().count(),
            file_name: request.file_name.clone(),
            history_snapshots: request.history.len(),
        }];

        // 1–2. Extraction
        let sections = chunk_sections(&request.text);
        events.push(AnalysisEvent::SectionsChunked {
            sections: sections.len(),
        });

        let profile = ExtractedDocumentProfile::extract(&request.text, request.file_name.as_deref());
        events.push(AnalysisEvent::ProfileExtracted {
            metrics_found: profile.metrics.found_count(),
            improvements: profile.claimed_improvements.len(),
            completeness: profile.metadata.completeness,
        });

        // 3. Feed
        let mode = self.feed.mode();
        let requests = feed_requests(&profile);
        let verified = match self.feed.fetch(&requests) {
            Some(values) => {
                events.push(AnalysisEvent::VerificationFetched {
                    mode,
                    requested: requests.len(),
                    answered: values.len(),
                });
                values
            }
            None => {
                log::warn!(
                    "stage=feed mode={mode:?} requested={} no response, failing closed",
                    requests.len()
                );
                events.push(AnalysisEvent::VerificationUnavailable {
                    mode,
                    requested: requests.len(),
                });
                BTreeMap::new()
            }
        };

        // 4. Compare
        let claimed_vs_verified = compare(&profile, &verified, &self.config.verification);
        events.push(AnalysisEvent::ComparisonCompleted {
            rows: claimed_vs_verified.len(),
            critical: claimed_vs_verified
                .iter()
                .filter(|row| row.status == DeviationStatus::Critical)
                .count(),
        });

        // 5. Third party
        let third_party = self.third_party.verify(&profile, as_of);
        events.push(AnalysisEvent::ThirdPartyChecked {
            available: third_party.available,
            confirmations: third_party.confirmations.len(),
            expired_certifications: third_party.expired_certifications().count(),
        });

        // 6. LMA
        let lma_compliance = map_compliance(&request.text);
        let lma_outcome = overall_outcome(&lma_compliance);
        let status_count = |status: ComplianceStatus| {
            lma_compliance.iter().filter(|m| m.status == status).count()
        };
        events.push(AnalysisEvent::ComplianceMapped {
            pass: status_count(ComplianceStatus::Pass),
            partial: status_count(ComplianceStatus::Partial),
            fail: status_count(ComplianceStatus::Fail),
            outcome: lma_outcome,
        });

        // 7. Score
        let verification_datum = VerificationDatum::from_profile(
            &profile,
            &verified,
            &history,
            request.peer_benchmarks.as_ref(),
        );
        let greenwashing = greenwashing_scorer::score(&verification_datum, &self.config.greenwashing);
        events.push(AnalysisEvent::GreenwashingScored {
            overall_score: greenwashing.overall_score,
            risk_level: greenwashing.risk_level,
        });

        // 8. Red flags
        let red_flags = red_flags(
            &verification_datum,
            &claimed_vs_verified,
            &third_party,
            &lma_compliance,
            &greenwashing,
        );
        events.push(AnalysisEvent::AnalysisCompleted {
            red_flags: red_flags.len(),
        });

        let analysis_id = Uuid::new_v4();
        log::info!(
            "stage=done analysis_id={analysis_id} mode={mode:?} greenwashing={} level={} lma={lma_outcome:?} red_flags={}",
            greenwashing.overall_score,
            greenwashing.risk_level.as_str(),
            red_flags.len()
        );

        Ok(AnalysisReport {
            analysis_id,
            generated_at: Utc::now(),
            file_name: request.file_name.clone(),
            page_count: request.page_count,
            profile,
            sections,
            verification_mode: mode,
            claimed_vs_verified,
            verification_datum,
            third_party,
            lma_compliance,
            lma_outcome,
            greenwashing,
            red_flags,
            events,
        })
    }

    /// Quarterly E/S/G roll-up with the configured weights.
    pub fn roll_up(&self, records: &[QuarterlyMetric]) -> EsgScores {
        esg_rollup::roll_up(records, &self.config.rollup)
    }

    /// Settlement risk with the configured factor weights.
    pub fn assess_settlement(&self, factors: &RiskFactors) -> EngineResult<SettlementAssessment> {
        settlement_risk::assess_checked(factors, &self.config.settlement)
    }
}

/// Human-readable findings an analyst must look at first.
pub fn red_flags(
    datum: &VerificationDatum,
    rows: &[ClaimedVsVerified],
    third_party: &ThirdPartyReport,
    lma: &[LmaComplianceMapping],
    greenwashing: &GreenwashingAssessment,
) -> Vec<String> {
    let mut flags = Vec::new();

    if !datum.has_scope3 {
        flags.push("Scope 3 emissions are not disclosed".to_string());
    }
    if !datum.has_baseline {
        flags.push("No emissions baseline year is stated".to_string());
    }
    if !datum.has_methodology {
        flags.push("No calculation methodology is described".to_string());
    }
    if datum.third_party_audit_type == AuditType::None {
        flags.push("No third-party assurance of the disclosed data".to_string());
    }

    for row in rows.iter().filter(|r| r.status == DeviationStatus::Critical) {
        match row.deviation {
            Some(d) => {
                let unit = TrackedMetric::from_label(&row.metric).map_or("%", |t| t.deviation_unit());
                flags.push(format!(
                    "{}: claimed value deviates {d:.1}{unit} from the verified value",
                    row.metric
                ))
            }
            None => flags.push(format!("{}: claim could not be verified", row.metric)),
        }
    }

    for cert in third_party.expired_certifications() {
        flags.push(format!("Certification {} expired on {}", cert.name, cert.expires_on));
    }

    for mapping in lma.iter().filter(|m| m.status == ComplianceStatus::Fail) {
        flags.push(format!("LMA {}: no supporting evidence", mapping.principle));
    }

    if greenwashing.risk_level == RiskLevel::High {
        flags.push(format!(
            "Greenwashing risk score {} is in the high band",
            greenwashing.overall_score
        ));
    }
    flags
}
