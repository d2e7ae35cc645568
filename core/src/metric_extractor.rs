//! Metric extractor: ordered regex strategies per metric.
//!
//! Every metric kind owns an ordered list of extraction rules run
//! against the FULL text. The first rule producing a parseable number
//! wins. When no rule yields a number but the topic is clearly
//! discussed, the reading is Partial; otherwise Missing.
//!
//! RULE: no randomness here. Identical text ⇒ identical readings.

use crate::text::{multiplier, parse_number, snippet, window};
use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use std::sync::OnceLock;

/// Number with optional thousands separators and decimals.
const NUM: &str = r"(?P<value>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)";
/// Word or single-letter magnitude. `\b` keeps "Mt" and "m3" as units.
const MAGNITUDE: &str = r"(?:\s*(?P<mult>million|billion|thousand|mn|bn|m|b)\b)?";
const EMISSION_UNIT: &str = r"(?:mtco2e?|ktco2e?|tco2e?|t\s*co2e?|tonnes?(?:\s+of)?(?:\s+co2e?)?|tons?(?:\s+of)?(?:\s+co2e?)?)";
const WATER_UNIT: &str = r"(?:megalit(?:re|er)s|ml\b|m3|m³|cubic met(?:re|er)s|lit(?:re|er)s|gallons)";
const CURRENCY: &str = r"(?:[$€£]|usd|eur|gbp)";

/// Characters of context kept around a partial-topic hit.
const PARTIAL_CONTEXT: usize = 40;

// ── Readings ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Found,
    Partial,
    Missing,
}

/// Tri-state extraction outcome for one metric.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricReading {
    Found {
        value: f64,
        unit: String,
        source: String,
    },
    /// Topic discussed, no parseable number.
    Partial { source: String },
    Missing,
}

impl MetricReading {
    pub fn status(&self) -> MetricStatus {
        match self {
            Self::Found { .. } => MetricStatus::Found,
            Self::Partial { .. } => MetricStatus::Partial,
            Self::Missing => MetricStatus::Missing,
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Self::Found { .. } => Confidence::High,
            Self::Partial { .. } => Confidence::Medium,
            Self::Missing => Confidence::Low,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Found { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Found or Partial.
    pub fn is_mentioned(&self) -> bool {
        !matches!(self, Self::Missing)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum RecordValue {
    Number(f64),
    Text(&'static str),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricRecord<'a> {
    value: RecordValue,
    unit: Option<&'a str>,
    status: MetricStatus,
    confidence: Confidence,
    source: &'a str,
}

/// Missing serializes as `null`; it is never a populated record.
impl Serialize for MetricReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = match self {
            Self::Found { value, unit, source } => MetricRecord {
                value: RecordValue::Number(*value),
                unit: Some(unit.as_str()),
                status: self.status(),
                confidence: self.confidence(),
                source,
            },
            Self::Partial { source } => MetricRecord {
                value: RecordValue::Text("Present"),
                unit: None,
                status: self.status(),
                confidence: self.confidence(),
                source,
            },
            Self::Missing => return serializer.serialize_none(),
        };
        record.serialize(serializer)
    }
}

// ── Metric kinds ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Scope1,
    Scope2,
    Scope3,
    RenewableEnergy,
    WaterUsage,
    WasteRecycling,
    WomenInLeadership,
    SafetyIncidents,
    CommunityInvestment,
}

impl MetricKind {
    pub const ALL: [MetricKind; 9] = [
        MetricKind::Scope1,
        MetricKind::Scope2,
        MetricKind::Scope3,
        MetricKind::RenewableEnergy,
        MetricKind::WaterUsage,
        MetricKind::WasteRecycling,
        MetricKind::WomenInLeadership,
        MetricKind::SafetyIncidents,
        MetricKind::CommunityInvestment,
    ];

    /// Stable key used in claimed/verified maps.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Scope1 => "scope1",
            Self::Scope2 => "scope2",
            Self::Scope3 => "scope3",
            Self::RenewableEnergy => "renewableEnergy",
            Self::WaterUsage => "waterUsage",
            Self::WasteRecycling => "wasteRecyclingRate",
            Self::WomenInLeadership => "womenInLeadership",
            Self::SafetyIncidents => "safetyIncidents",
            Self::CommunityInvestment => "communityInvestment",
        }
    }

    fn default_unit(&self) -> &'static str {
        match self {
            Self::Scope1 | Self::Scope2 | Self::Scope3 => "tCO2e",
            Self::RenewableEnergy | Self::WasteRecycling | Self::WomenInLeadership => "%",
            Self::WaterUsage => "m3",
            Self::SafetyIncidents => "incidents",
            Self::CommunityInvestment => "USD",
        }
    }

    /// Ordered rules: (pattern, unit_required).
    fn rule_sources(&self) -> Vec<(String, bool)> {
        match self {
            Self::Scope1 => scope_rules(1),
            Self::Scope2 => scope_rules(2),
            Self::Scope3 => scope_rules(3),
            Self::RenewableEnergy => vec![
                (format!(r"(?i)renewable[^.\n%]{{0,60}}?{NUM}\s*%"), true),
                (format!(r"(?i){NUM}\s*%\s*(?:of\s+)?[^.\n%]{{0,50}}?renewable"), true),
            ],
            Self::WaterUsage => vec![
                (
                    format!(r"(?i)water\s+(?:consumption|usage|use|withdrawals?)[^\n]{{0,50}}?{NUM}{MAGNITUDE}\s*{WATER_UNIT}"),
                    true,
                ),
                (format!(r"(?i){NUM}{MAGNITUDE}\s*{WATER_UNIT}\s+(?:of\s+)?(?:fresh\s*)?water"), true),
                (
                    format!(r"(?i)water\s+(?:consumption|usage|use|withdrawals?)\s*(?:[:=]|was|were|of|totall?ed)\s*{NUM}{MAGNITUDE}"),
                    false,
                ),
            ],
            Self::WasteRecycling => vec![
                (format!(r"(?i)(?:recycling|diversion|recovery)\s+rate[^\n%]{{0,40}}?{NUM}\s*%"), true),
                (
                    format!(r"(?i){NUM}\s*%\s*(?:of\s+)?(?:(?:our|all|total|operational)\s+)*(?:waste\s+)?(?:was\s+|were\s+|is\s+)?(?:recycled|diverted|recovered)"),
                    true,
                ),
                (format!(r"(?i)(?:recycled|diverted)[^\n%]{{0,40}}?{NUM}\s*%\s*of\s+(?:\w+\s+)?waste"), true),
            ],
            Self::WomenInLeadership => vec![
                (
                    format!(r"(?i){NUM}\s*%\s*(?:of\s+)?(?:our\s+)?(?:board|leadership|senior management|management|workforce|employees|directors)[^.\n%]{{0,40}}?(?:women|female)"),
                    true,
                ),
                (format!(r"(?i)(?:women|female)[^.\n%]{{0,60}}?{NUM}\s*%"), true),
                (format!(r"(?i){NUM}\s*%\s*(?:women|female)"), true),
            ],
            Self::SafetyIncidents => vec![
                (
                    format!(r"(?i)(?:ltifr|lost[- ]time injury frequency rate|trir|total recordable (?:injury|incident) rate)\s*(?:\(\w+\))?\s*(?:of|was|is|:|=|at|stood at|fell to|decreased to|improved to|reached)?\s*{NUM}"),
                    false,
                ),
                (
                    format!(r"(?i){NUM}\s+(?:recordable\s+|lost[- ]time\s+|reportable\s+)?(?:safety\s+)?(?:incidents|injuries|accidents)"),
                    true,
                ),
                (format!(r"(?i)(?:safety\s+)?incidents?\s*[:=]\s*{NUM}"), false),
            ],
            Self::CommunityInvestment => {
                let short_mult = r"(?:\s*(?P<mult>million|billion|thousand|mn|bn|m|b|k)\b)?";
                vec![
                    (
                        format!(r"(?i)(?:community\s+investment|social\s+investment|charitable\s+(?:giving|donations?)|invested|donated|contributed)[^\n.]{{0,50}}?{CURRENCY}\s*{NUM}{short_mult}"),
                        true,
                    ),
                    (
                        format!(r"(?i){CURRENCY}\s*{NUM}{short_mult}[^\n.]{{0,60}}?(?:communit|charit|philanthrop|social investment)"),
                        true,
                    ),
                    (
                        format!(r"(?i)community\s+investment\s*(?:of|:|=|totall?ed|was)?\s*{NUM}{short_mult}"),
                        false,
                    ),
                ]
            }
        }
    }

    fn topic_source(&self) -> &'static str {
        match self {
            Self::Scope1 => r"(?i)scope\s*1\b",
            Self::Scope2 => r"(?i)scope\s*2\b",
            Self::Scope3 => r"(?i)scope\s*3\b",
            Self::RenewableEnergy => r"(?i)renewable",
            Self::WaterUsage => {
                r"(?i)water\s+(?:consumption|usage|use|withdrawal|management|stewardship|efficiency)"
            }
            Self::WasteRecycling => r"(?i)\bwaste\b",
            Self::WomenInLeadership => r"(?i)diversity|gender|\bwomen\b",
            Self::SafetyIncidents => r"(?i)health (?:and|&) safety|\bsafety\b",
            Self::CommunityInvestment => {
                r"(?i)communit(?:y|ies)\s+(?:investment|engagement|programs?|initiatives?)|philanthrop|charit"
            }
        }
    }

    /// Ordered (regex, canonical unit). First hit in the matched text wins.
    fn unit_sources(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Scope1 | Self::Scope2 | Self::Scope3 => &[
                (r"(?i)mtco2", "MtCO2e"),
                (r"(?i)ktco2", "ktCO2e"),
                (r"(?i)t\s*co2|tonnes?|tons?", "tCO2e"),
            ],
            Self::RenewableEnergy | Self::WasteRecycling | Self::WomenInLeadership => {
                &[(r"(?i)%|percent", "%")]
            }
            Self::WaterUsage => &[
                (r"(?i)megalit(?:re|er)s|\bml\b", "megalitres"),
                (r"(?i)m3|m³|cubic met", "m3"),
                (r"(?i)lit(?:re|er)s", "liters"),
                (r"(?i)gallons", "gallons"),
            ],
            Self::SafetyIncidents => &[
                (r"(?i)ltifr|lost[- ]time injury frequency", "LTIFR"),
                (r"(?i)trir|total recordable", "TRIR"),
                (r"(?i)injur", "injuries"),
                (r"(?i)incident|accident", "incidents"),
            ],
            Self::CommunityInvestment => &[
                (r"(?i)€|\beur\b", "EUR"),
                (r"(?i)£|\bgbp\b", "GBP"),
                (r"(?i)\$|\busd\b", "USD"),
            ],
        }
    }
}

fn scope_rules(scope: u8) -> Vec<(String, bool)> {
    vec![
        // "Scope 1: 1,200 tCO2e" / "Scope 1 emissions were 1.2 million tonnes"
        (
            format!(r"(?i)scope\s*{scope}\b(?:\s+(?:ghg\s+)?emissions?)?\s*(?:[:=\-–]|were|was|of|totall?ed|amounted to)?\s*(?:approximately|around|about)?\s*{NUM}{MAGNITUDE}\s*{EMISSION_UNIT}?"),
            false,
        ),
        // "1,200 tCO2e of Scope 1 emissions"
        (
            format!(r"(?i){NUM}{MAGNITUDE}\s*{EMISSION_UNIT}\s*(?:of\s+)?(?:direct\s+|indirect\s+)?\(?\s*scope\s*{scope}\b"),
            true,
        ),
        // "Scope 1 emissions in 2023 reached 1,200 tCO2e"
        (
            format!(r"(?i)scope\s*{scope}\b[^\n]{{0,60}}?{NUM}{MAGNITUDE}\s*{EMISSION_UNIT}"),
            true,
        ),
    ]
}

// ── Compiled rule table ────────────────────────────────────────────

struct ExtractionRule {
    pattern: Regex,
    unit_required: bool,
}

struct MetricRules {
    kind: MetricKind,
    rules: Vec<ExtractionRule>,
    topic: Regex,
    units: Vec<(Regex, &'static str)>,
}

fn rule_table() -> &'static Vec<MetricRules> {
    static TABLE: OnceLock<Vec<MetricRules>> = OnceLock::new();
    TABLE.get_or_init(|| {
        MetricKind::ALL
            .iter()
            .map(|kind| MetricRules {
                kind: *kind,
                rules: kind
                    .rule_sources()
                    .into_iter()
                    .map(|(source, unit_required)| ExtractionRule {
                        pattern: Regex::new(&source).expect("metric rule regex compiles"),
                        unit_required,
                    })
                    .collect(),
                topic: Regex::new(kind.topic_source()).expect("metric topic regex compiles"),
                units: kind
                    .unit_sources()
                    .iter()
                    .map(|(p, unit)| (Regex::new(p).expect("unit regex compiles"), *unit))
                    .collect(),
            })
            .collect()
    })
}

/// The table is built in `MetricKind::ALL` order, which is declaration order.
fn rules_for(kind: MetricKind) -> &'static MetricRules {
    &rule_table()[kind as usize]
}

fn year_like(raw: &str) -> bool {
    raw.len() == 4 && (raw.starts_with("19") || raw.starts_with("20")) && raw.chars().all(|c| c.is_ascii_digit())
}

impl MetricRules {
    fn value_from(&self, caps: &Captures<'_>, rule: &ExtractionRule) -> Option<f64> {
        let raw = caps.name("value")?.as_str();
        // A bare 4-digit year is not a metric value when no unit anchors it.
        if !rule.unit_required && year_like(raw) {
            return None;
        }
        let base = parse_number(raw)?;
        Some(base * multiplier(caps.name("mult").map(|m| m.as_str())))
    }

    fn infer_unit(&self, matched: &str) -> String {
        self.units
            .iter()
            .find(|(re, _)| re.is_match(matched))
            .map(|(_, unit)| *unit)
            .unwrap_or(self.kind.default_unit())
            .to_string()
    }

    fn extract(&self, text: &str) -> MetricReading {
        for rule in &self.rules {
            for caps in rule.pattern.captures_iter(text) {
                let Some(value) = self.value_from(&caps, rule) else {
                    continue;
                };
                let matched = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                return MetricReading::Found {
                    value,
                    unit: self.infer_unit(matched),
                    source: snippet(matched),
                };
            }
        }

        match self.topic.find(text) {
            Some(hit) => MetricReading::Partial {
                source: snippet(window(text, hit.start(), hit.end(), PARTIAL_CONTEXT)),
            },
            None => MetricReading::Missing,
        }
    }
}

/// Run one metric's rule cascade against the full text.
pub fn extract_metric(kind: MetricKind, text: &str) -> MetricReading {
    rules_for(kind).extract(text)
}

// ── Baseline year ──────────────────────────────────────────────────

fn baseline_regexes() -> &'static [Regex; 2] {
    static RE: OnceLock<[Regex; 2]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"(?i)baseline\s+year\s*(?:of|:|=|is|was)?\s*(?P<year>(?:19|20)\d{2})\b")
                .expect("baseline regex compiles"),
            Regex::new(r"(?i)\b(?P<year>(?:19|20)\d{2})\s+baseline").expect("baseline regex compiles"),
        ]
    })
}

/// Baseline year, found once for the whole document.
pub fn extract_baseline_year(text: &str) -> Option<i32> {
    baseline_regexes().iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.name("year"))
            .and_then(|m| m.as_str().parse::<i32>().ok())
    })
}

// ── Grouped output ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarbonEmissions {
    pub scope1: MetricReading,
    pub scope2: MetricReading,
    pub scope3: MetricReading,
    pub baseline_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetrics {
    pub carbon_emissions: CarbonEmissions,
    pub renewable_energy: MetricReading,
    pub water_usage: MetricReading,
    pub waste_recycling_rate: MetricReading,
    pub women_in_leadership: MetricReading,
    pub safety_incidents: MetricReading,
    pub community_investment: MetricReading,
}

impl ExtractedMetrics {
    pub fn reading(&self, kind: MetricKind) -> &MetricReading {
        match kind {
            MetricKind::Scope1 => &self.carbon_emissions.scope1,
            MetricKind::Scope2 => &self.carbon_emissions.scope2,
            MetricKind::Scope3 => &self.carbon_emissions.scope3,
            MetricKind::RenewableEnergy => &self.renewable_energy,
            MetricKind::WaterUsage => &self.water_usage,
            MetricKind::WasteRecycling => &self.waste_recycling_rate,
            MetricKind::WomenInLeadership => &self.women_in_leadership,
            MetricKind::SafetyIncidents => &self.safety_incidents,
            MetricKind::CommunityInvestment => &self.community_investment,
        }
    }

    pub fn found_count(&self) -> usize {
        MetricKind::ALL
            .iter()
            .filter(|k| self.reading(**k).is_found())
            .count()
    }
}

/// Extract every metric family from the full text.
pub fn extract_metrics(text: &str) -> ExtractedMetrics {
    let metrics = ExtractedMetrics {
        carbon_emissions: CarbonEmissions {
            scope1: extract_metric(MetricKind::Scope1, text),
            scope2: extract_metric(MetricKind::Scope2, text),
            scope3: extract_metric(MetricKind::Scope3, text),
            baseline_year: extract_baseline_year(text),
        },
        renewable_energy: extract_metric(MetricKind::RenewableEnergy, text),
        water_usage: extract_metric(MetricKind::WaterUsage, text),
        waste_recycling_rate: extract_metric(MetricKind::WasteRecycling, text),
        women_in_leadership: extract_metric(MetricKind::WomenInLeadership, text),
        safety_incidents: extract_metric(MetricKind::SafetyIncidents, text),
        community_investment: extract_metric(MetricKind::CommunityInvestment, text),
    };

    log::debug!(
        "stage=extract metrics_found={} baseline_year={:?}",
        metrics.found_count(),
        metrics.carbon_emissions.baseline_year
    );
    metrics
}
