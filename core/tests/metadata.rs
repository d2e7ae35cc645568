//! Integration tests: document metadata, improvements and disclosure signals.

use esg_core::{
    metadata_extractor::{extract_metadata, CompletenessInputs, DocumentType},
    profile::ExtractedDocumentProfile,
    types::AuditType,
};

const FRAMEWORK: &str = include_str!("fixtures/green_loan_framework.txt");

/// The fixture fills all eight checklist points.
#[test]
fn framework_metadata_is_complete() {
    let profile = ExtractedDocumentProfile::extract(FRAMEWORK, Some("northwind_glf.pdf"));
    let meta = &profile.metadata;

    assert_eq!(meta.company_name.as_deref(), Some("Northwind Energy PLC"));
    assert_eq!(meta.reporting_year, Some(2023));
    assert_eq!(meta.geography.as_deref(), Some("United Kingdom"));
    assert_eq!(meta.document_type, DocumentType::GreenLoanFramework);
    for framework in ["LMA", "GRI", "TCFD"] {
        assert!(
            meta.framework_references.iter().any(|f| f == framework),
            "Missing framework {framework}: {:?}",
            meta.framework_references
        );
    }
    assert_eq!(meta.completeness, 100);
}

/// The file name is the company-name fallback.
#[test]
fn company_falls_back_to_file_name() {
    let meta = extract_metadata("", Some("acme_corp-2023_esg.pdf"), CompletenessInputs::default());
    assert_eq!(meta.company_name.as_deref(), Some("Acme Corp"));
    // One point of eight.
    assert_eq!(meta.completeness, 13);
}

/// Empty text degrades to an empty profile with zero completeness.
#[test]
fn empty_text_profile() {
    let profile = ExtractedDocumentProfile::extract("", None);
    assert_eq!(profile.metadata.completeness, 0);
    assert_eq!(profile.metadata.document_type, DocumentType::Unknown);
    assert!(profile.claimed_improvements.is_empty());
    assert_eq!(profile.signals.assurance_provider, AuditType::None);
    assert!(!profile.signals.methodology_statement);
}

/// Reduction claims are paired with their baseline year.
#[test]
fn improvement_claim_with_baseline() {
    let profile = ExtractedDocumentProfile::extract(FRAMEWORK, None);
    let carbon = profile.improvement("carbon").expect("carbon claim extracted");
    assert_eq!(carbon.claimed, 30.0);
    assert_eq!(carbon.baseline, Some(2019));
    assert_eq!(carbon.claim_key(), "carbonReduction");
}

/// Methodology, assurance tier and certifications are detected.
#[test]
fn disclosure_signals_detected() {
    let profile = ExtractedDocumentProfile::extract(FRAMEWORK, None);
    assert!(profile.signals.methodology_statement);
    assert_eq!(profile.signals.assurance_provider, AuditType::Big4);
    assert_eq!(profile.signals.certifications, vec!["ISO 14001".to_string()]);
}

/// Specialist assurers rank below the Big Four.
#[test]
fn specialist_assurance_tier() {
    let profile = ExtractedDocumentProfile::extract(
        "Our GHG inventory was verified by Bureau Veritas to a limited level.",
        None,
    );
    assert_eq!(profile.signals.assurance_provider, AuditType::Specialist);
}

/// Every key is present in the serialized profile, even when empty.
#[test]
fn profile_never_omits_keys() {
    let profile = ExtractedDocumentProfile::extract("", None);
    let json = serde_json::to_value(&profile).expect("profile serializes");
    for key in [
        "carbonEmissions",
        "renewableEnergy",
        "waterUsage",
        "wasteRecyclingRate",
        "womenInLeadership",
        "safetyIncidents",
        "communityInvestment",
        "claimedImprovements",
        "metadata",
        "signals",
    ] {
        assert!(json.get(key).is_some(), "Key {key} missing from {json}");
    }
    assert!(json["metadata"].get("companyName").is_some());
    assert!(json["metadata"]["companyName"].is_null());
}
