//! Disclosure signals: methodology statement, assurance tier, certifications.

use crate::types::AuditType;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureSignals {
    pub methodology_statement: bool,
    pub assurance_provider: AuditType,
    pub certifications: Vec<String>,
}

struct Patterns {
    methodology: Regex,
    assurance: Vec<(Regex, AuditType)>,
    certifications: Vec<(Regex, &'static str)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("signal regex compiles");
        Patterns {
            methodology: re(r"(?i)\bmethodolog(?:y|ies)\b|ghg protocol|calculated (?:in accordance with|using|based on)|emission factors?|iso\s*14064"),
            // Ordered from strongest to weakest tier.
            assurance: vec![
                (re(r"(?i)\bdeloitte\b|\bpwc\b|pricewaterhousecoopers|\bkpmg\b|ernst\s*&\s*young|\bEY\b"), AuditType::Big4),
                (re(r"(?i)bureau veritas|\bdnv\b|\bsgs\b|\blrqa\b|lloyd'?s register|erm cvs|\bTÜV\b|\btuv\b"), AuditType::Specialist),
                (re(r"(?i)industry (?:association|body) (?:verification|review)|peer[- ]reviewed by|sector (?:body|association)"), AuditType::Industry),
                (re(r"(?i)internal(?:ly)? (?:audit|assur|verif|review)"), AuditType::Internal),
            ],
            certifications: vec![
                (re(r"(?i)iso\s*14001"), "ISO 14001"),
                (re(r"(?i)iso\s*50001"), "ISO 50001"),
                (re(r"(?i)iso\s*45001"), "ISO 45001"),
                (re(r"(?i)\bsbti\b|science[- ]based targets? initiative"), "SBTi"),
                (re(r"(?i)\bb[- ]?corp\b"), "B Corp"),
                (re(r"(?i)\bleed\b (?:gold|platinum|silver|certified)"), "LEED"),
                (re(r"(?i)\bbreeam\b"), "BREEAM"),
                (re(r"(?i)\bcdp\b (?:a|b|score|rating)|carbon disclosure project"), "CDP"),
                (re(r"(?i)climate bonds? (?:standard|initiative|certified)"), "Climate Bonds"),
            ],
        }
    })
}

pub fn detect_signals(text: &str) -> DisclosureSignals {
    let p = patterns();
    let signals = DisclosureSignals {
        methodology_statement: p.methodology.is_match(text),
        assurance_provider: p
            .assurance
            .iter()
            .find(|(re, _)| re.is_match(text))
            .map(|(_, tier)| *tier)
            .unwrap_or(AuditType::None),
        certifications: p
            .certifications
            .iter()
            .filter(|(re, _)| re.is_match(text))
            .map(|(_, name)| name.to_string())
            .collect(),
    };

    log::debug!(
        "stage=signals methodology={} assurance={} certifications={}",
        signals.methodology_statement,
        signals.assurance_provider.as_str(),
        signals.certifications.len()
    );
    signals
}
