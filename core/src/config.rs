//! Engine configuration: every tunable weight, band and penalty.
//!
//! Defaults are the documented constants. `EngineConfig::load` overlays
//! JSON files from a data directory; a missing file keeps its section's
//! defaults. Classification cut points that downstream text depends on
//! (greenwashing 30/60, settlement 30/70) are NOT configurable and live
//! next to the scorers.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

const WEIGHT_TOLERANCE: f64 = 1e-6;

// ── Greenwashing scoring ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GreenwashingWeights {
    pub data_completeness: f64,
    pub external_verification: f64,
    pub methodology_transparency: f64,
    pub third_party_audit: f64,
    pub historical_consistency: f64,
    pub peer_benchmark_deviation: f64,
}

impl Default for GreenwashingWeights {
    fn default() -> Self {
        Self {
            data_completeness: 0.20,
            external_verification: 0.25,
            methodology_transparency: 0.20,
            third_party_audit: 0.15,
            historical_consistency: 0.10,
            peer_benchmark_deviation: 0.10,
        }
    }
}

impl GreenwashingWeights {
    fn as_slice(&self) -> [(&'static str, f64); 6] {
        [
            ("data_completeness", self.data_completeness),
            ("external_verification", self.external_verification),
            ("methodology_transparency", self.methodology_transparency),
            ("third_party_audit", self.third_party_audit),
            ("historical_consistency", self.historical_consistency),
            ("peer_benchmark_deviation", self.peer_benchmark_deviation),
        ]
    }
}

/// Score awarded per assurance tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuditScores {
    pub big4: f64,
    pub specialist: f64,
    pub industry: f64,
    pub internal: f64,
    pub none: f64,
}

impl Default for AuditScores {
    fn default() -> Self {
        Self {
            big4: 100.0,
            specialist: 80.0,
            industry: 60.0,
            internal: 30.0,
            none: 0.0,
        }
    }
}

/// Point deductions applied to the completeness and verification components.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GreenwashingPenalties {
    pub missing_scope3: f64,
    pub missing_baseline: f64,
    pub missing_methodology: f64,
    pub missing_third_party_audit: f64,
    pub zero_verified_metrics: f64,
}

impl Default for GreenwashingPenalties {
    fn default() -> Self {
        Self {
            missing_scope3: 15.0,
            missing_baseline: 10.0,
            missing_methodology: 10.0,
            missing_third_party_audit: 20.0,
            zero_verified_metrics: 15.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GreenwashingConfig {
    pub weights: GreenwashingWeights,
    pub audit_scores: AuditScores,
    pub penalties: GreenwashingPenalties,
}

// ── Verification ───────────────────────────────────────────────────

/// Deviation (%) upper bounds, exclusive. At or above `major_below` is critical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviationBands {
    pub match_below: f64,
    pub minor_below: f64,
    pub major_below: f64,
}

impl DeviationBands {
    pub fn standard() -> Self {
        Self {
            match_below: 5.0,
            minor_below: 10.0,
            major_below: 20.0,
        }
    }

    pub fn scope3() -> Self {
        Self {
            match_below: 10.0,
            minor_below: 20.0,
            major_below: 35.0,
        }
    }

    fn is_ascending(&self) -> bool {
        0.0 <= self.match_below
            && self.match_below < self.minor_below
            && self.minor_below < self.major_below
    }
}

/// Bounds for the labelled simulation feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Max relative perturbation for absolute-quantity metrics (0.25 = ±25%).
    pub relative_perturbation: f64,
    /// Max perturbation in percentage points for percentage metrics.
    pub point_perturbation: f64,
    /// Probability a simulated third-party source confirms a metric.
    pub confirmation_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            relative_perturbation: 0.25,
            point_perturbation: 8.0,
            confirmation_rate: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VerificationConfig {
    pub standard_bands: DeviationBands,
    pub scope3_bands: DeviationBands,
    pub simulation: SimulationConfig,
    /// Certifications expiring within this many days are flagged.
    pub expiring_soon_days: i64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            standard_bands: DeviationBands::standard(),
            scope3_bands: DeviationBands::scope3(),
            simulation: SimulationConfig::default(),
            expiring_soon_days: 90,
        }
    }
}

// ── Settlement and roll-up ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SettlementWeights {
    pub document_completeness: f64,
    pub amendment_complexity: f64,
    pub cross_border_factors: f64,
    pub party_history: f64,
    pub covenant_status: f64,
    pub market_volatility: f64,
}

impl Default for SettlementWeights {
    fn default() -> Self {
        Self {
            document_completeness: 0.25,
            amendment_complexity: 0.20,
            cross_border_factors: 0.18,
            party_history: 0.15,
            covenant_status: 0.12,
            market_volatility: 0.10,
        }
    }
}

impl SettlementWeights {
    fn as_slice(&self) -> [(&'static str, f64); 6] {
        [
            ("document_completeness", self.document_completeness),
            ("amendment_complexity", self.amendment_complexity),
            ("cross_border_factors", self.cross_border_factors),
            ("party_history", self.party_history),
            ("covenant_status", self.covenant_status),
            ("market_volatility", self.market_volatility),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RollupWeights {
    pub environmental: f64,
    pub social: f64,
    pub governance: f64,
}

impl Default for RollupWeights {
    fn default() -> Self {
        Self {
            environmental: 0.4,
            social: 0.3,
            governance: 0.3,
        }
    }
}

impl RollupWeights {
    fn as_slice(&self) -> [(&'static str, f64); 3] {
        [
            ("environmental", self.environmental),
            ("social", self.social),
            ("governance", self.governance),
        ]
    }
}

// ── Root ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub greenwashing: GreenwashingConfig,
    pub verification: VerificationConfig,
    pub settlement: SettlementWeights,
    pub rollup: RollupWeights,
}

impl EngineConfig {
    /// Load from a data/ directory. Absent files keep their defaults.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(greenwashing) = read_optional(data_dir, "scoring/greenwashing.json")? {
            config.greenwashing = greenwashing;
        }
        if let Some(settlement) = read_optional(data_dir, "scoring/settlement.json")? {
            config.settlement = settlement;
        }
        if let Some(rollup) = read_optional(data_dir, "scoring/rollup.json")? {
            config.rollup = rollup;
        }
        if let Some(verification) = read_optional(data_dir, "verification/deviation_bands.json")? {
            config.verification = verification;
        }

        config.validate()?;
        log::debug!("config loaded from {data_dir}");
        Ok(config)
    }

    /// Parse a full config from a single JSON document.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_weights("greenwashing", &self.greenwashing.weights.as_slice())?;
        check_weights("settlement", &self.settlement.as_slice())?;
        check_weights("rollup", &self.rollup.as_slice())?;

        if !self.verification.standard_bands.is_ascending() {
            return Err(EngineError::InvalidConfig {
                reason: "standard deviation bands must be ascending".into(),
            });
        }
        if !self.verification.scope3_bands.is_ascending() {
            return Err(EngineError::InvalidConfig {
                reason: "scope-3 deviation bands must be ascending".into(),
            });
        }

        let sim = &self.verification.simulation;
        if !(0.0..=1.0).contains(&sim.confirmation_rate) {
            return Err(EngineError::InvalidConfig {
                reason: format!("confirmation_rate must be in [0, 1], got {}", sim.confirmation_rate),
            });
        }
        if sim.relative_perturbation < 0.0 || sim.point_perturbation < 0.0 {
            return Err(EngineError::InvalidConfig {
                reason: "simulation perturbation bounds must be non-negative".into(),
            });
        }
        Ok(())
    }
}

fn read_optional<T: serde::de::DeserializeOwned>(
    data_dir: &str,
    relative: &str,
) -> anyhow::Result<Option<T>> {
    let path = Path::new(data_dir).join(relative);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    let parsed = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
    Ok(Some(parsed))
}

fn check_weights(table: &str, weights: &[(&'static str, f64)]) -> EngineResult<()> {
    if let Some((name, w)) = weights.iter().find(|(_, w)| *w < 0.0 || w.is_nan()) {
        return Err(EngineError::InvalidConfig {
            reason: format!("{table} weight '{name}' must be non-negative, got {w}"),
        });
    }
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(EngineError::InvalidConfig {
            reason: format!("{table} weights must sum to 1.0, got {sum:.6}"),
        });
    }
    Ok(())
}
