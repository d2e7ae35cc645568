//! Extracted document profile: everything the text analyzers found.
//!
//! Built once per document and never mutated afterwards.

use crate::{
    disclosure_signals::{detect_signals, DisclosureSignals},
    improvement_extractor::{extract_improvements, ClaimedImprovement},
    metadata_extractor::{extract_metadata, CompletenessInputs, DocumentMetadata},
    metric_extractor::{extract_metrics, ExtractedMetrics},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocumentProfile {
    #[serde(flatten)]
    pub metrics: ExtractedMetrics,
    pub claimed_improvements: Vec<ClaimedImprovement>,
    pub metadata: DocumentMetadata,
    pub signals: DisclosureSignals,
}

impl ExtractedDocumentProfile {
    /// Run every text analyzer over the document.
    ///
    /// Metrics, improvements and signals are independent of each other;
    /// metadata completeness needs the first and last of those.
    pub fn extract(text: &str, file_name: Option<&str>) -> Self {
        let metrics = extract_metrics(text);
        let claimed_improvements = extract_improvements(text);
        let signals = detect_signals(text);

        let carbon = &metrics.carbon_emissions;
        let inputs = CompletenessInputs {
            has_emissions_metric: carbon.scope1.is_found()
                || carbon.scope2.is_found()
                || carbon.scope3.is_found(),
            has_baseline: carbon.baseline_year.is_some(),
            has_methodology: signals.methodology_statement,
        };
        let metadata = extract_metadata(text, file_name, inputs);

        Self {
            metrics,
            claimed_improvements,
            metadata,
            signals,
        }
    }

    /// First claimed improvement for a metric family ("carbon", "water", ...).
    pub fn improvement(&self, metric: &str) -> Option<&ClaimedImprovement> {
        self.claimed_improvements.iter().find(|c| c.metric == metric)
    }
}
