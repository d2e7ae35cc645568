//! Document metadata: who, when, where, which frameworks.
//!
//! Completeness is an 8-point checklist scored as a percentage.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const COMPLETENESS_POINTS: f64 = 8.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    GreenLoanFramework,
    SustainabilityReport,
    AnnualReport,
    EsgDisclosure,
    LoanAgreement,
    Unknown,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub company_name: Option<String>,
    pub reporting_year: Option<i32>,
    pub geography: Option<String>,
    pub framework_references: Vec<String>,
    pub document_type: DocumentType,
    /// 0–100.
    pub completeness: u32,
}

/// Extra checklist inputs that come from the other extractors.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessInputs {
    pub has_emissions_metric: bool,
    pub has_baseline: bool,
    pub has_methodology: bool,
}

struct Patterns {
    company: Vec<Regex>,
    year: Vec<Regex>,
    geography: Vec<(Regex, &'static str)>,
    frameworks: Vec<(Regex, &'static str)>,
    document_types: Vec<(Regex, DocumentType)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("metadata regex compiles");
        Patterns {
            company: vec![
                re(r"(?im)^\s*(?:company|borrower|issuer|organi[sz]ation)\s*(?:name)?\s*[:\-]\s*(?P<name>[^\n]{2,80}?)\s*$"),
                re(r"(?P<name>[A-Z][A-Za-z0-9&'\-]*(?:\s+[A-Z][A-Za-z0-9&'\-]*){0,5}\s+(?:Ltd\.?|Limited|PLC|plc|Inc\.?|Corporation|Corp\.?|Group|GmbH|AG|S\.A\.|N\.V\.|LLC))"),
            ],
            year: vec![
                re(r"(?i)(?:reporting|fiscal|financial)\s+(?:year|period)[^\n\d]{0,20}(?:\d{1,2}(?:st|nd|rd|th)?,?\s+(?:[A-Za-z]+\s+)?)?(?:FY\s?)?(?P<year>20\d{2})\b"),
                re(r"(?i)\b(?P<year>20\d{2})\s+(?:sustainability|annual|esg|impact|integrated)\s+report"),
                re(r"(?i)\bFY\s?(?P<year>20\d{2})\b"),
            ],
            geography: vec![
                (re(r"(?i)\bunited kingdom\b|\bU\.?K\.?\b|\bengland\b"), "United Kingdom"),
                (re(r"(?i)\beuropean union\b|\beurope\b|\bEU\b|\bEMEA\b"), "Europe"),
                (re(r"(?i:\bunited states\b|\bnorth america\b)|\bU\.S\.(?:A\.)?|\bUSA?\b"), "North America"),
                (re(r"(?i)\basia[- ]pacific\b|\bAPAC\b|\basia\b"), "Asia-Pacific"),
                (re(r"(?i)\blatin america\b|\bsouth america\b|\bLATAM\b"), "Latin America"),
                (re(r"(?i)\bmiddle east\b|\bafrica\b"), "Middle East & Africa"),
                (re(r"(?i)\bglobal(?:ly)?\b|\bworldwide\b"), "Global"),
            ],
            frameworks: vec![
                (re(r"(?i)\bLMA\b|loan market association|green loan principles"), "LMA"),
                (re(r"(?i)\bGRI\b|global reporting initiative"), "GRI"),
                (re(r"(?i)eu taxonomy"), "EU Taxonomy"),
                (re(r"(?i)\bTCFD\b|task force on climate"), "TCFD"),
                (re(r"(?i)\bSASB\b|sustainability accounting standards"), "SASB"),
            ],
            document_types: vec![
                (re(r"(?i)green loan framework|green finance framework|sustainability[- ]linked loan framework"), DocumentType::GreenLoanFramework),
                (re(r"(?i)facility agreement|loan agreement|credit agreement"), DocumentType::LoanAgreement),
                (re(r"(?i)sustainability report|corporate responsibility report|impact report"), DocumentType::SustainabilityReport),
                (re(r"(?i)annual report|integrated report"), DocumentType::AnnualReport),
                (re(r"(?i)\besg\b (?:report|disclosure|data)|climate disclosure"), DocumentType::EsgDisclosure),
            ],
        }
    })
}

fn company_name(text: &str, file_name: Option<&str>) -> Option<String> {
    let from_text = patterns().company.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.name("name"))
            .map(|m| m.as_str().trim().to_string())
            .filter(|name| !name.is_empty())
    });

    from_text.or_else(|| file_name.and_then(company_from_file_name))
}

/// "acme_corp-2023_esg.pdf" → "Acme Corp".
fn company_from_file_name(file_name: &str) -> Option<String> {
    let stem = std::path::Path::new(file_name).file_stem()?.to_str()?;
    let words: Vec<String> = stem
        .split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|w| !w.is_empty())
        .take_while(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| {
            !matches!(
                w.to_ascii_lowercase().as_str(),
                "esg" | "report" | "sustainability" | "annual" | "green" | "loan" | "framework" | "final" | "draft"
            )
        })
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn reporting_year(text: &str) -> Option<i32> {
    patterns().year.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.name("year"))
            .and_then(|m| m.as_str().parse().ok())
    })
}

fn geography(text: &str) -> Option<String> {
    patterns()
        .geography
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, region)| region.to_string())
}

fn frameworks(text: &str) -> Vec<String> {
    patterns()
        .frameworks
        .iter()
        .filter(|(re, _)| re.is_match(text))
        .map(|(_, name)| name.to_string())
        .collect()
}

fn document_type(text: &str) -> DocumentType {
    patterns()
        .document_types
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, kind)| *kind)
        .unwrap_or(DocumentType::Unknown)
}

pub fn extract_metadata(
    text: &str,
    file_name: Option<&str>,
    inputs: CompletenessInputs,
) -> DocumentMetadata {
    let company_name = company_name(text, file_name);
    let reporting_year = reporting_year(text);
    let geography = geography(text);
    let framework_references = frameworks(text);
    let document_type = document_type(text);

    let checklist = [
        company_name.is_some(),
        reporting_year.is_some(),
        geography.is_some(),
        !framework_references.is_empty(),
        document_type != DocumentType::Unknown,
        inputs.has_emissions_metric,
        inputs.has_baseline,
        inputs.has_methodology,
    ];
    let points = checklist.iter().filter(|present| **present).count() as f64;
    let completeness = (points / COMPLETENESS_POINTS * 100.0).round() as u32;

    log::debug!(
        "stage=metadata company={:?} year={:?} frameworks={} completeness={completeness}",
        company_name,
        reporting_year,
        framework_references.len()
    );

    DocumentMetadata {
        company_name,
        reporting_year,
        geography,
        framework_references,
        document_type,
        completeness,
    }
}
