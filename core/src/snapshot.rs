//! Historical snapshot shape: month-keyed score records kept by the
//! caller's storage layer.
//!
//! The engine does not persist snapshots. It validates the shape it
//! accepts and folds snapshots into per-year history for scoring.

use crate::{
    error::{EngineError, EngineResult},
    verification::HistoricalRecord,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSnapshot {
    /// "YYYY-MM".
    pub month: String,
    pub environmental: f64,
    pub social: f64,
    pub governance: f64,
    pub greenwashing_score: f64,
}

impl HistoricalSnapshot {
    /// First day of the snapshot's month.
    pub fn month_start(&self) -> EngineResult<NaiveDate> {
        NaiveDate::parse_from_str(&format!("{}-01", self.month.trim()), "%Y-%m-%d").map_err(|e| {
            EngineError::InvalidSnapshot {
                month: self.month.clone(),
                reason: format!("month must be YYYY-MM: {e}"),
            }
        })
    }

    fn scores(&self) -> [(&'static str, f64); 4] {
        [
            ("environmental", self.environmental),
            ("social", self.social),
            ("governance", self.governance),
            ("greenwashingScore", self.greenwashing_score),
        ]
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.month_start()?;
        if let Some((name, value)) = self
            .scores()
            .into_iter()
            .find(|(_, v)| !(0.0..=100.0).contains(v))
        {
            return Err(EngineError::InvalidSnapshot {
                month: self.month.clone(),
                reason: format!("{name} must be in [0, 100], got {value}"),
            });
        }
        Ok(())
    }
}

/// Validate every snapshot and fold them into per-year mean scores.
pub fn yearly_history(snapshots: &[HistoricalSnapshot]) -> EngineResult<Vec<HistoricalRecord>> {
    let mut sums: BTreeMap<i32, (BTreeMap<&'static str, f64>, u32)> = BTreeMap::new();

    for snapshot in snapshots {
        snapshot.validate()?;
        let year = snapshot.month_start()?.year();
        let (totals, count) = sums.entry(year).or_default();
        for (name, value) in snapshot.scores() {
            *totals.entry(name).or_default() += value;
        }
        *count += 1;
    }

    Ok(sums
        .into_iter()
        .map(|(year, (totals, count))| HistoricalRecord {
            year,
            metrics: totals
                .into_iter()
                .map(|(name, total)| (name.to_string(), total / count as f64))
                .collect(),
        })
        .collect())
}
