//! Section chunker: groups paragraphs by ESG topic.
//!
//! Paragraphs are split on blank lines and kept when at least
//! MIN_PARAGRAPH_CHARS long. A paragraph may land in several topics.
//! Topics with no matching paragraph produce no chunk.

use crate::text::split_paragraphs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const BASE_CONFIDENCE: u32 = 50;
const CONFIDENCE_PER_MATCH: u32 = 10;
const MAX_CONFIDENCE: u32 = 90;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Emissions,
    Energy,
    Water,
    Waste,
    Governance,
    Diversity,
    Safety,
    Community,
    Certifications,
}

impl Topic {
    /// Fixed evaluation order; chunks come out in this order.
    pub const ALL: [Topic; 9] = [
        Topic::Emissions,
        Topic::Energy,
        Topic::Water,
        Topic::Waste,
        Topic::Governance,
        Topic::Diversity,
        Topic::Safety,
        Topic::Community,
        Topic::Certifications,
    ];

    fn patterns(&self) -> &'static [&'static str] {
        match self {
            Self::Emissions => &[
                r"(?i)scope\s*[123]\b",
                r"(?i)\bghg\b|greenhouse gas",
                r"(?i)carbon (?:emissions?|footprint|neutral)",
                r"(?i)\b(?:k|m)?tco2e?\b",
                r"(?i)net[- ]zero",
            ],
            Self::Energy => &[
                r"(?i)renewable",
                r"(?i)energy (?:consumption|use|efficiency|mix)",
                r"(?i)\b[kmg]wh\b",
                r"(?i)solar|wind power|power purchase agreement|\bppa\b",
            ],
            Self::Water => &[
                r"(?i)water (?:consumption|usage|use|withdrawal|intensity|stewardship)",
                r"(?i)megalitres?|cubic met(?:re|er)s",
                r"(?i)wastewater|water[- ]stressed",
            ],
            Self::Waste => &[
                r"(?i)\bwaste\b",
                r"(?i)recycl(?:ed|ing)",
                r"(?i)landfill|circular(?:ity| economy)",
            ],
            Self::Governance => &[
                r"(?i)\bboard of directors\b|\bthe board\b",
                r"(?i)governance",
                r"(?i)anti[- ]corruption|anti[- ]bribery|whistleblow",
                r"(?i)audit committee|risk committee",
            ],
            Self::Diversity => &[
                r"(?i)diversity|inclusion|\bdei\b",
                r"(?i)\bwomen\b|\bfemale\b|gender",
                r"(?i)pay gap|equal opportunit",
            ],
            Self::Safety => &[
                r"(?i)health (?:and|&) safety|\bsafety\b",
                r"(?i)\bltifr\b|\btrir\b|lost[- ]time injur",
                r"(?i)fatalit|recordable (?:injur|incident)",
            ],
            Self::Community => &[
                r"(?i)communit(?:y|ies)",
                r"(?i)philanthrop|donat(?:ed|ion)|charit",
                r"(?i)volunteer|social investment",
            ],
            Self::Certifications => &[
                r"(?i)\biso\s*\d{4,5}\b",
                r"(?i)certifi(?:ed|cation)",
                r"(?i)\bsbti\b|science[- ]based targets?|b corp|\bleed\b|\bbreeam\b",
            ],
        }
    }
}

/// One topic's paragraphs, joined by blank lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionChunk {
    pub section: Topic,
    pub content: String,
    pub confidence: u32,
    pub paragraph_count: usize,
}

fn topic_table() -> &'static Vec<(Topic, Vec<Regex>)> {
    static TABLE: OnceLock<Vec<(Topic, Vec<Regex>)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        Topic::ALL
            .iter()
            .map(|topic| {
                let regexes = topic
                    .patterns()
                    .iter()
                    .map(|p| Regex::new(p).expect("topic regex compiles"))
                    .collect();
                (*topic, regexes)
            })
            .collect()
    })
}

/// Chunk raw text into topic sections. Empty text yields no chunks.
pub fn chunk_sections(text: &str) -> Vec<SectionChunk> {
    let paragraphs = split_paragraphs(text);
    if paragraphs.is_empty() {
        return Vec::new();
    }

    let chunks: Vec<SectionChunk> = topic_table()
        .iter()
        .filter_map(|(topic, regexes)| {
            let matching: Vec<&str> = paragraphs
                .iter()
                .copied()
                .filter(|p| regexes.iter().any(|re| re.is_match(p)))
                .collect();

            if matching.is_empty() {
                return None;
            }

            let count = matching.len() as u32;
            Some(SectionChunk {
                section: *topic,
                content: matching.join("\n\n"),
                confidence: BASE_CONFIDENCE
                    .saturating_add(CONFIDENCE_PER_MATCH.saturating_mul(count))
                    .min(MAX_CONFIDENCE),
                paragraph_count: matching.len(),
            })
        })
        .collect();

    log::debug!(
        "stage=chunk paragraphs={} chunks={}",
        paragraphs.len(),
        chunks.len()
    );
    chunks
}
