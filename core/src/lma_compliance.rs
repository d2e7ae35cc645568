//! LMA Green Loan Principles mapper.
//!
//! Each of the four principles is a fixed three-state check:
//!   detailed evidence ⇒ pass, broad mention only ⇒ partial, neither ⇒ fail.
//! Recomputed from scratch per document.

use crate::text::{snippet, window};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const EVIDENCE_CONTEXT: usize = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LmaCategory {
    UseOfProceeds,
    Evaluation,
    Management,
    Reporting,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Pass,
    Partial,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LmaComplianceMapping {
    pub id: String,
    pub principle: String,
    pub category: LmaCategory,
    pub status: ComplianceStatus,
    pub evidence: Option<String>,
    pub notes: Option<String>,
}

/// Document-level verdict across the four principles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceOutcome {
    Compliant,
    NeedsReview,
    NonCompliant,
}

struct PrincipleRule {
    id: &'static str,
    principle: &'static str,
    category: LmaCategory,
    broad: Regex,
    detailed: Regex,
    partial_note: &'static str,
    fail_note: &'static str,
}

fn rules() -> &'static [PrincipleRule; 4] {
    static RULES: OnceLock<[PrincipleRule; 4]> = OnceLock::new();
    RULES.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("lma regex compiles");
        [
            PrincipleRule {
                id: "lma-use-of-proceeds",
                principle: "Use of Proceeds",
                category: LmaCategory::UseOfProceeds,
                broad: re(r"(?i)use of proceeds|proceeds allocation|proceeds (?:will|shall) be (?:used|applied|allocated)|eligible green projects?"),
                detailed: re(r"(?i)allocation breakdown|\d+(?:\.\d+)?\s*%\s+(?:of\s+(?:the\s+)?(?:net\s+)?proceeds\s+)?(?:allocated|directed|earmarked|applied)\s+to|eligible (?:green )?project categor(?:y|ies)[^.\n]{0,80}?\d+(?:\.\d+)?\s*%"),
                partial_note: "Use of proceeds is referenced but no allocation breakdown by project category is disclosed",
                fail_note: "No use-of-proceeds disclosure found",
            },
            PrincipleRule {
                id: "lma-evaluation",
                principle: "Process for Project Evaluation and Selection",
                category: LmaCategory::Evaluation,
                broad: re(r"(?i)project (?:evaluation|selection)|evaluation (?:and|&) selection|selection criteria|eligibility criteria"),
                detailed: re(r"(?i)green (?:finance|loan|bond) committee|sustainability committee (?:reviews|approves|evaluates|selects)|exclusion (?:criteria|list)|(?:evaluated|assessed|screened) against (?:the )?(?:eu taxonomy|eligibility criteria|technical screening criteria)"),
                partial_note: "Evaluation process is mentioned but no governing committee or exclusion criteria are described",
                fail_note: "No project evaluation and selection process found",
            },
            PrincipleRule {
                id: "lma-management",
                principle: "Management of Proceeds",
                category: LmaCategory::Management,
                broad: re(r"(?i)management of proceeds|proceeds (?:are|will be) (?:tracked|managed|monitored)|tracking of proceeds"),
                detailed: re(r"(?i)separate (?:sub-?)?account|dedicated account|ring[- ]fenced|earmarked account|unallocated proceeds (?:will be|are|shall be) (?:held|invested|placed)"),
                partial_note: "Proceeds management is mentioned but no segregated account or tracking mechanism is described",
                fail_note: "No management-of-proceeds disclosure found",
            },
            PrincipleRule {
                id: "lma-reporting",
                principle: "Reporting",
                category: LmaCategory::Reporting,
                broad: re(r"(?i)(?:annual|allocation|impact) report(?:ing)?|report(?:s|ing)? (?:annually|on the use of proceeds)|lender reporting"),
                detailed: re(r"(?i)(?:quantitative|impact) (?:indicators|metrics|kpis)|(?:tco2e?|mwh|gwh) (?:avoided|reduced|saved)|second[- ]party opinion|(?:limited|reasonable) assurance|external review"),
                partial_note: "Reporting commitment exists but no quantitative impact indicators or external review are disclosed",
                fail_note: "No reporting commitment found",
            },
        ]
    })
}

fn evidence(re: &Regex, text: &str) -> Option<String> {
    re.find(text)
        .map(|m| snippet(window(text, m.start(), m.end(), EVIDENCE_CONTEXT)))
}

/// Exactly four mappings, one per principle, in a fixed order.
pub fn map_compliance(text: &str) -> Vec<LmaComplianceMapping> {
    let mappings: Vec<LmaComplianceMapping> = rules()
        .iter()
        .map(|rule| {
            let (status, evidence, notes) = if let Some(found) = evidence(&rule.detailed, text) {
                (ComplianceStatus::Pass, Some(found), None)
            } else if let Some(found) = evidence(&rule.broad, text) {
                (ComplianceStatus::Partial, Some(found), Some(rule.partial_note.to_string()))
            } else {
                (ComplianceStatus::Fail, None, Some(rule.fail_note.to_string()))
            };

            LmaComplianceMapping {
                id: rule.id.into(),
                principle: rule.principle.into(),
                category: rule.category,
                status,
                evidence,
                notes,
            }
        })
        .collect();

    log::debug!(
        "stage=lma pass={} partial={} fail={}",
        count(&mappings, ComplianceStatus::Pass),
        count(&mappings, ComplianceStatus::Partial),
        count(&mappings, ComplianceStatus::Fail)
    );
    mappings
}

fn count(mappings: &[LmaComplianceMapping], status: ComplianceStatus) -> usize {
    mappings.iter().filter(|m| m.status == status).count()
}

/// All pass ⇒ compliant; any fail ⇒ non-compliant; otherwise needs review.
pub fn overall_outcome(mappings: &[LmaComplianceMapping]) -> ComplianceOutcome {
    if mappings.iter().any(|m| m.status == ComplianceStatus::Fail) {
        ComplianceOutcome::NonCompliant
    } else if !mappings.is_empty() && mappings.iter().all(|m| m.status == ComplianceStatus::Pass) {
        ComplianceOutcome::Compliant
    } else {
        ComplianceOutcome::NeedsReview
    }
}
