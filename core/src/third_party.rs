//! Third-party verification: CDP / GRI / ISO confirmations and
//! certification expiry.
//!
//! The simulated verifier is a stand-in for a real registry adapter.
//! It sits behind ThirdPartyVerifier so a real adapter can replace it
//! without touching the comparator.

use crate::{
    config::SimulationConfig, profile::ExtractedDocumentProfile, rng::StreamRng,
    verification::feed_requests,
};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Simulated certificates expire between this many days ago and ahead.
const SIMULATED_EXPIRY_MIN_DAYS: f64 = -180.0;
const SIMULATED_EXPIRY_MAX_DAYS: f64 = 1095.0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegistrySource {
    Cdp,
    Gri,
    Iso,
}

impl RegistrySource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cdp => "CDP",
            Self::Gri => "GRI",
            Self::Iso => "ISO",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfirmation {
    pub source: RegistrySource,
    pub metric: String,
    pub confirmed: bool,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificationStatus {
    pub name: String,
    pub expires_on: NaiveDate,
    pub expired: bool,
    pub expiring_soon: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyReport {
    /// False when no verifier answered.
    pub available: bool,
    pub simulated: bool,
    pub confirmations: Vec<SourceConfirmation>,
    pub certifications: Vec<CertificationStatus>,
}

impl ThirdPartyReport {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            simulated: false,
            confirmations: Vec::new(),
            certifications: Vec::new(),
        }
    }

    pub fn expired_certifications(&self) -> impl Iterator<Item = &CertificationStatus> {
        self.certifications.iter().filter(|c| c.expired)
    }
}

pub trait ThirdPartyVerifier: Send {
    fn verify(&mut self, profile: &ExtractedDocumentProfile, as_of: NaiveDate) -> ThirdPartyReport;
}

/// Default: no registry wired in.
pub struct NoThirdParty;

impl ThirdPartyVerifier for NoThirdParty {
    fn verify(&mut self, _profile: &ExtractedDocumentProfile, _as_of: NaiveDate) -> ThirdPartyReport {
        ThirdPartyReport::unavailable()
    }
}

pub struct SimulatedThirdParty {
    rng: StreamRng,
    bounds: SimulationConfig,
    expiring_soon_days: i64,
}

impl SimulatedThirdParty {
    pub fn new(rng: StreamRng, bounds: SimulationConfig, expiring_soon_days: i64) -> Self {
        Self {
            rng,
            bounds,
            expiring_soon_days,
        }
    }

    fn source_for(metric_key: &str) -> RegistrySource {
        if metric_key.starts_with("scope") || metric_key == "carbonReduction" {
            RegistrySource::Cdp
        } else {
            RegistrySource::Gri
        }
    }
}

impl ThirdPartyVerifier for SimulatedThirdParty {
    fn verify(&mut self, profile: &ExtractedDocumentProfile, as_of: NaiveDate) -> ThirdPartyReport {
        let confirmations: Vec<SourceConfirmation> = feed_requests(profile)
            .into_iter()
            .map(|request| {
                let source = Self::source_for(&request.key);
                let confirmed = self.rng.chance(self.bounds.confirmation_rate);
                SourceConfirmation {
                    source,
                    note: if confirmed {
                        format!("{} record consistent with disclosure (simulated)", source.label())
                    } else {
                        format!("No matching {} record found (simulated)", source.label())
                    },
                    metric: request.key,
                    confirmed,
                }
            })
            .collect();

        let certifications: Vec<CertificationStatus> = profile
            .signals
            .certifications
            .iter()
            .map(|name| {
                let offset = self
                    .rng
                    .uniform(SIMULATED_EXPIRY_MIN_DAYS, SIMULATED_EXPIRY_MAX_DAYS)
                    .round() as i64;
                let expires_on = as_of + Duration::days(offset);
                let days_left = (expires_on - as_of).num_days();
                CertificationStatus {
                    name: name.clone(),
                    expires_on,
                    expired: days_left < 0,
                    expiring_soon: (0..=self.expiring_soon_days).contains(&days_left),
                }
            })
            .collect();

        let mut report = ThirdPartyReport {
            available: true,
            simulated: true,
            confirmations,
            certifications,
        };

        // ISO entries confirm the management-system certificates themselves.
        let iso: Vec<SourceConfirmation> = report
            .certifications
            .iter()
            .filter(|c| c.name.starts_with("ISO"))
            .map(|c| SourceConfirmation {
                source: RegistrySource::Iso,
                metric: c.name.clone(),
                confirmed: !c.expired,
                note: format!("Certificate valid until {} (simulated)", c.expires_on),
            })
            .collect();
        report.confirmations.extend(iso);

        log::debug!(
            "stage=third_party stream={} confirmations={} certifications={}",
            self.rng.name,
            report.confirmations.len(),
            report.certifications.len()
        );
        report
    }
}
