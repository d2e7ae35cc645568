//! Integration tests: topic chunking of raw disclosure text.

use esg_core::section_chunker::{chunk_sections, Topic};

const FRAMEWORK: &str = include_str!("fixtures/green_loan_framework.txt");

/// Empty input yields zero chunks, never an error.
#[test]
fn empty_text_has_no_chunks() {
    assert!(chunk_sections("").is_empty());
    assert!(chunk_sections("\n\n   \n").is_empty());
}

/// Paragraphs under fifty characters are never chunked.
#[test]
fn short_paragraphs_are_ignored() {
    let chunks = chunk_sections("Scope 1: 5 tCO2e.\n\nWater use: 3 m3.");
    assert!(chunks.is_empty(), "Short paragraphs produced chunks: {chunks:?}");
}

/// One matching paragraph scores 60; confidence caps at 90.
#[test]
fn confidence_grows_with_matches_and_caps() {
    let single = chunk_sections(
        "Our water consumption was reduced through site-level stewardship programmes.",
    );
    let water = single
        .iter()
        .find(|c| c.section == Topic::Water)
        .expect("water chunk present");
    assert_eq!(water.confidence, 60);
    assert_eq!(water.paragraph_count, 1);

    let many = [
        "Scope 1 emissions fell across all manufacturing sites this year.",
        "Scope 2 emissions fell after the move to a green electricity tariff.",
        "Scope 3 emissions are estimated using supplier-specific spend data.",
        "Our greenhouse gas inventory is prepared annually for the group.",
        "We remain committed to a net-zero pathway for our own operations.",
        "Carbon emissions from the vehicle fleet were broadly flat this year.",
    ]
    .join("\n\n");
    let chunks = chunk_sections(&many);
    let emissions = chunks
        .iter()
        .find(|c| c.section == Topic::Emissions)
        .expect("emissions chunk present");
    assert_eq!(emissions.paragraph_count, 6);
    assert_eq!(emissions.confidence, 90, "Confidence must cap at 90");
}

/// Topics without a matching paragraph produce no chunk.
#[test]
fn unmatched_topics_are_omitted() {
    let chunks = chunk_sections(FRAMEWORK);
    assert!(chunks.iter().any(|c| c.section == Topic::Emissions));
    assert!(chunks.iter().any(|c| c.section == Topic::Water));
    assert!(
        chunks.iter().all(|c| c.section != Topic::Diversity),
        "No diversity paragraph exists in the fixture"
    );
    for chunk in &chunks {
        assert!(
            (60..=90).contains(&chunk.confidence),
            "Confidence out of range for {:?}: {}",
            chunk.section,
            chunk.confidence
        );
    }
}
