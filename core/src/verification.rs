//! Verification: claimed vs. independently verified values.
//!
//! RULE: the comparator never generates values. Verified numbers come
//! from a VerificationFeed; the comparator only measures deviation and
//! classifies it. A feed that does not answer is treated exactly like a
//! feed that answered with nothing (fail closed).

use crate::{
    config::{DeviationBands, SimulationConfig, VerificationConfig},
    metric_extractor::{MetricKind, MetricReading},
    profile::ExtractedDocumentProfile,
    rng::StreamRng,
    types::{AuditType, MetricKey},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NOT_AVAILABLE: &str = "N/A";

/// Number, or a text marker such as "N/A".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn not_available() -> Self {
        Self::Text(NOT_AVAILABLE.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

// ── Feed contract ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// No feed wired in; every comparison fails closed.
    Unavailable,
    /// Seeded perturbation of claimed values. NOT genuine verification.
    Simulated,
    /// Values supplied by a real external source.
    External,
}

/// One claimed number the feed is asked to verify.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRequest {
    pub key: MetricKey,
    pub claimed: f64,
    /// Percentage metrics are compared in absolute points.
    pub percentage: bool,
}

/// Source of independently verified values.
///
/// Returning `None` means the feed gave no response; the engine treats
/// it the same as an empty answer.
pub trait VerificationFeed: Send {
    fn mode(&self) -> VerificationMode;

    fn fetch(&mut self, requests: &[FeedRequest]) -> Option<BTreeMap<MetricKey, f64>>;
}

/// Default feed: nothing is verifiable.
pub struct UnavailableFeed;

impl VerificationFeed for UnavailableFeed {
    fn mode(&self) -> VerificationMode {
        VerificationMode::Unavailable
    }

    fn fetch(&mut self, _requests: &[FeedRequest]) -> Option<BTreeMap<MetricKey, f64>> {
        None
    }
}

/// Values already resolved by an external collaborator.
pub struct ProvidedFeed {
    values: BTreeMap<MetricKey, f64>,
}

impl ProvidedFeed {
    pub fn new(values: BTreeMap<MetricKey, f64>) -> Self {
        Self { values }
    }
}

impl VerificationFeed for ProvidedFeed {
    fn mode(&self) -> VerificationMode {
        VerificationMode::External
    }

    fn fetch(&mut self, requests: &[FeedRequest]) -> Option<BTreeMap<MetricKey, f64>> {
        Some(
            requests
                .iter()
                .filter_map(|r| self.values.get(&r.key).map(|v| (r.key.clone(), *v)))
                .collect(),
        )
    }
}

/// Labelled simulation: bounded random perturbation of each claim.
pub struct SimulatedFeed {
    rng: StreamRng,
    bounds: SimulationConfig,
}

impl SimulatedFeed {
    pub fn new(rng: StreamRng, bounds: SimulationConfig) -> Self {
        Self { rng, bounds }
    }
}

impl VerificationFeed for SimulatedFeed {
    fn mode(&self) -> VerificationMode {
        VerificationMode::Simulated
    }

    fn fetch(&mut self, requests: &[FeedRequest]) -> Option<BTreeMap<MetricKey, f64>> {
        let mut verified = BTreeMap::new();
        for request in requests {
            let value = if request.percentage {
                let spread = self.bounds.point_perturbation;
                (request.claimed + self.rng.uniform(-spread, spread)).clamp(0.0, 100.0)
            } else {
                let spread = self.bounds.relative_perturbation;
                request.claimed * (1.0 + self.rng.uniform(-spread, spread))
            };
            verified.insert(request.key.clone(), round2(value));
        }
        log::debug!(
            "stage=feed stream={} simulated={}",
            self.rng.name,
            verified.len()
        );
        Some(verified)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Every numeric claim in the profile, as feed requests.
pub fn feed_requests(profile: &ExtractedDocumentProfile) -> Vec<FeedRequest> {
    let mut requests: Vec<FeedRequest> = MetricKind::ALL
        .iter()
        .filter_map(|kind| match profile.metrics.reading(*kind) {
            MetricReading::Found { value, unit, .. } => Some(FeedRequest {
                key: kind.key().to_string(),
                claimed: *value,
                percentage: unit == "%",
            }),
            _ => None,
        })
        .collect();

    for improvement in &profile.claimed_improvements {
        let key = improvement.claim_key();
        if requests.iter().all(|r| r.key != key) {
            requests.push(FeedRequest {
                key,
                claimed: improvement.claimed,
                percentage: true,
            });
        }
    }
    requests
}

// ── Comparison ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviationStatus {
    Match,
    Minor,
    Major,
    Critical,
}

impl DeviationBands {
    pub fn classify(&self, deviation: f64) -> DeviationStatus {
        if deviation < self.match_below {
            DeviationStatus::Match
        } else if deviation < self.minor_below {
            DeviationStatus::Minor
        } else if deviation < self.major_below {
            DeviationStatus::Major
        } else {
            DeviationStatus::Critical
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedVsVerified {
    pub metric: String,
    pub claimed: MetricValue,
    pub verified: MetricValue,
    /// Percent (relative) or percentage points; null when not computable.
    pub deviation: Option<f64>,
    pub status: DeviationStatus,
}

/// The five metrics every comparison report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedMetric {
    CarbonReduction,
    RenewableShare,
    WaterUsage,
    Scope3Emissions,
    WasteRecyclingRate,
}

impl TrackedMetric {
    pub const ALL: [TrackedMetric; 5] = [
        TrackedMetric::CarbonReduction,
        TrackedMetric::RenewableShare,
        TrackedMetric::WaterUsage,
        TrackedMetric::Scope3Emissions,
        TrackedMetric::WasteRecyclingRate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::CarbonReduction => "Carbon Reduction",
            Self::RenewableShare => "Renewable Energy",
            Self::WaterUsage => "Water Usage",
            Self::Scope3Emissions => "Scope 3 Emissions",
            Self::WasteRecyclingRate => "Waste Recycling Rate",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::CarbonReduction => "carbonReduction",
            Self::RenewableShare => MetricKind::RenewableEnergy.key(),
            Self::WaterUsage => MetricKind::WaterUsage.key(),
            Self::Scope3Emissions => MetricKind::Scope3.key(),
            Self::WasteRecyclingRate => MetricKind::WasteRecycling.key(),
        }
    }

    /// Percentage metrics deviate in absolute points, others relatively.
    pub fn is_percentage_point(&self) -> bool {
        matches!(
            self,
            Self::CarbonReduction | Self::RenewableShare | Self::WasteRecyclingRate
        )
    }

    /// Suffix for a deviation figure: " points" or "%".
    pub fn deviation_unit(&self) -> &'static str {
        if self.is_percentage_point() {
            " points"
        } else {
            "%"
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    fn bands<'a>(&self, config: &'a VerificationConfig) -> &'a DeviationBands {
        match self {
            Self::Scope3Emissions => &config.scope3_bands,
            _ => &config.standard_bands,
        }
    }

    fn claimed_in(&self, profile: &ExtractedDocumentProfile) -> Option<f64> {
        match self {
            Self::CarbonReduction => profile.improvement("carbon").map(|c| c.claimed),
            Self::RenewableShare => profile.metrics.renewable_energy.value(),
            Self::WaterUsage => profile.metrics.water_usage.value(),
            Self::Scope3Emissions => profile.metrics.carbon_emissions.scope3.value(),
            Self::WasteRecyclingRate => profile.metrics.waste_recycling_rate.value(),
        }
    }
}

pub fn deviation(claimed: f64, verified: f64, percentage_point: bool) -> f64 {
    let diff = (claimed - verified).abs();
    if percentage_point {
        diff
    } else if claimed == 0.0 {
        if verified == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        diff / claimed.abs() * 100.0
    }
}

/// Compare each tracked metric. Missing data is always surfaced as critical.
pub fn compare(
    profile: &ExtractedDocumentProfile,
    verified: &BTreeMap<MetricKey, f64>,
    config: &VerificationConfig,
) -> Vec<ClaimedVsVerified> {
    TrackedMetric::ALL
        .iter()
        .map(|tracked| {
            let claimed = tracked.claimed_in(profile);
            let row = match (claimed, verified.get(tracked.key())) {
                (Some(c), Some(v)) => {
                    let d = deviation(c, *v, tracked.is_percentage_point());
                    ClaimedVsVerified {
                        metric: tracked.label().into(),
                        claimed: MetricValue::Number(c),
                        verified: MetricValue::Number(*v),
                        deviation: Some(d),
                        status: tracked.bands(config).classify(d),
                    }
                }
                (Some(c), None) => ClaimedVsVerified {
                    metric: tracked.label().into(),
                    claimed: MetricValue::Number(c),
                    verified: MetricValue::not_available(),
                    deviation: None,
                    status: DeviationStatus::Critical,
                },
                (None, _) => ClaimedVsVerified {
                    metric: tracked.label().into(),
                    claimed: MetricValue::not_available(),
                    verified: MetricValue::not_available(),
                    deviation: None,
                    status: DeviationStatus::Critical,
                },
            };

            if row.status == DeviationStatus::Critical {
                log::warn!("stage=compare metric={} status=critical deviation={:?}", row.metric, row.deviation);
            }
            row
        })
        .collect()
}

// ── Scoring input ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRecord {
    pub year: i32,
    pub metrics: BTreeMap<MetricKey, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeerBenchmarks {
    pub average: BTreeMap<MetricKey, f64>,
    pub std_dev: BTreeMap<MetricKey, f64>,
}

/// Flat, comparison-ready view of a document consumed by the risk scorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationDatum {
    pub claimed_metrics: BTreeMap<MetricKey, MetricValue>,
    pub verified_metrics: BTreeMap<MetricKey, MetricValue>,
    pub total_metrics: u32,
    pub provided_metrics: u32,
    pub has_scope3: bool,
    pub has_baseline: bool,
    pub has_methodology: bool,
    pub third_party_audit_type: AuditType,
    pub has_third_party_audit: bool,
    pub certifications: Vec<String>,
    pub historical_data: Vec<HistoricalRecord>,
    pub peer_average: BTreeMap<MetricKey, f64>,
    pub peer_std_dev: BTreeMap<MetricKey, f64>,
}

impl VerificationDatum {
    pub fn from_profile(
        profile: &ExtractedDocumentProfile,
        verified: &BTreeMap<MetricKey, f64>,
        history: &[HistoricalRecord],
        peers: Option<&PeerBenchmarks>,
    ) -> Self {
        let claimed_metrics: BTreeMap<MetricKey, MetricValue> = feed_requests(profile)
            .into_iter()
            .map(|r| (r.key, MetricValue::Number(r.claimed)))
            .collect();

        let verified_metrics = verified
            .iter()
            .map(|(k, v)| (k.clone(), MetricValue::Number(*v)))
            .collect();

        let metrics = &profile.metrics;
        let audit = profile.signals.assurance_provider;
        let peers = peers.cloned().unwrap_or_default();

        Self {
            claimed_metrics,
            verified_metrics,
            total_metrics: MetricKind::ALL.len() as u32,
            provided_metrics: metrics.found_count() as u32,
            has_scope3: metrics.carbon_emissions.scope3.is_mentioned(),
            has_baseline: metrics.carbon_emissions.baseline_year.is_some(),
            has_methodology: profile.signals.methodology_statement,
            third_party_audit_type: audit,
            has_third_party_audit: audit != AuditType::None,
            certifications: profile.signals.certifications.clone(),
            historical_data: history.to_vec(),
            peer_average: peers.average,
            peer_std_dev: peers.std_dev,
        }
    }
}
