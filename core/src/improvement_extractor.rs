//! Claimed-improvement extractor: "achieved a 30% reduction in emissions since 2019".
//!
//! Only reductions are claims; increases are not matched.
//!
//! Each claim is paired with the nearest year token in a fixed window,
//! preferring years introduced by a comparison word ("since", "from", "vs").

use crate::text::{snippet, window};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Bytes of context searched on each side of a claim for its baseline.
const BASELINE_WINDOW: usize = 80;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedImprovement {
    /// Normalised metric family: carbon, water, waste, energy, renewableEnergy, or a slug.
    pub metric: String,
    /// Claimed change in percent.
    pub claimed: f64,
    pub baseline: Option<i32>,
    pub source: Option<String>,
}

impl ClaimedImprovement {
    /// Key used in the claimed-metrics map, e.g. "carbonReduction".
    pub fn claim_key(&self) -> String {
        format!("{}Reduction", self.metric)
    }
}

struct Patterns {
    claims: [Regex; 3],
    anchored_year: Regex,
    any_year: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("improvement regex compiles");
        Patterns {
            claims: [
                re(r"(?i)(?P<value>\d+(?:\.\d+)?)\s*%\s+(?:reduction|decrease|cut|drop|improvement)\s+in\s+(?:our\s+|total\s+|absolute\s+)*(?P<metric>[a-z0-9][a-z0-9 \-]{2,40}?)(?:\s+(?:since|from|compared|versus|vs\.?|against|relative|over|by|between|in|across)\b|[.,;:\n)]|$)"),
                re(r"(?i)(?:reduced|cut|lowered|decreased|improved)\s+(?:our\s+|its\s+|total\s+|absolute\s+)*(?P<metric>[a-z0-9][a-z0-9 \-]{2,40}?)\s+by\s+(?P<value>\d+(?:\.\d+)?)\s*%"),
                re(r"(?i)\b(?P<metric>[a-z0-9][a-z0-9\-]*(?:\s+[a-z0-9\-]+){0,3}?)\s+(?:were|was|have been|has been)\s+(?:reduced|cut|lowered|decreased)\s+by\s+(?P<value>\d+(?:\.\d+)?)\s*%"),
            ],
            anchored_year: re(r"(?i)(?:since|from|compared (?:to|with)|vs\.?|versus|against|relative to|over)\s+(?:a\s+|the\s+|our\s+)?(?:FY\s?)?(?P<year>(?:19|20)\d{2})\b"),
            any_year: re(r"\b(?P<year>(?:19|20)\d{2})\b"),
        }
    })
}

fn normalize_metric(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    if ["emission", "carbon", "ghg", "co2", "greenhouse"].iter().any(|k| lower.contains(k)) {
        "carbon".into()
    } else if lower.contains("renewable") {
        "renewableEnergy".into()
    } else if lower.contains("water") {
        "water".into()
    } else if lower.contains("waste") || lower.contains("landfill") {
        "waste".into()
    } else if lower.contains("energy") || lower.contains("electricity") {
        "energy".into()
    } else {
        lower
            .split_whitespace()
            .enumerate()
            .map(|(i, w)| {
                if i == 0 {
                    w.to_string()
                } else {
                    let mut chars = w.chars();
                    chars
                        .next()
                        .map(|c| c.to_ascii_uppercase().to_string() + chars.as_str())
                        .unwrap_or_default()
                }
            })
            .collect()
    }
}

fn baseline_near(text: &str, start: usize, end: usize) -> Option<i32> {
    let context = window(text, start, end, BASELINE_WINDOW);
    let p = patterns();
    p.anchored_year
        .captures(context)
        .or_else(|| p.any_year.captures(context))
        .and_then(|caps| caps.name("year"))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn extract_improvements(text: &str) -> Vec<ClaimedImprovement> {
    let mut hits: Vec<(usize, ClaimedImprovement)> = Vec::new();

    for re in &patterns().claims {
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(value), Some(metric)) =
                (caps.get(0), caps.name("value"), caps.name("metric"))
            else {
                continue;
            };
            let Ok(claimed) = value.as_str().parse::<f64>() else {
                continue;
            };

            let improvement = ClaimedImprovement {
                metric: normalize_metric(metric.as_str()),
                claimed,
                baseline: baseline_near(text, whole.start(), whole.end()),
                source: Some(snippet(whole.as_str())),
            };

            let duplicate = hits
                .iter()
                .any(|(_, seen)| seen.metric == improvement.metric && seen.claimed == improvement.claimed);
            if !duplicate {
                hits.push((whole.start(), improvement));
            }
        }
    }

    hits.sort_by_key(|(start, _)| *start);
    log::debug!("stage=improvements claims={}", hits.len());
    hits.into_iter().map(|(_, improvement)| improvement).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_metric_families() {
        assert_eq!(normalize_metric("Scope 1 and 2 emissions"), "carbon");
        assert_eq!(normalize_metric("water intensity"), "water");
        assert_eq!(normalize_metric("packaging weight"), "packagingWeight");
    }

    #[test]
    fn prefers_anchored_year() {
        let text = "In 2023 we achieved a 30% reduction in emissions compared to 2019.";
        let claims = extract_improvements(text);
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].baseline, Some(2019));
    }

    #[test]
    fn increases_are_not_reduction_claims() {
        let text = "Output grew, with a 10% increase in carbon emissions since 2021. We also increased water use by 4%.";
        assert!(extract_improvements(text).is_empty());
    }

    #[test]
    fn passive_reduction_is_claimed() {
        let claims = extract_improvements("Scope 1 emissions were reduced by 12.5% versus the 2020 baseline.");
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].metric, "carbon");
        assert_eq!(claims[0].claimed, 12.5);
        assert_eq!(claims[0].baseline, Some(2020));
        assert_eq!(claims[0].claim_key(), "carbonReduction");
    }

    #[test]
    fn passive_reduction_with_perfect_tense() {
        let claims = extract_improvements("Since 2018, water withdrawals have been cut by 15%.");
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].metric, "water");
        assert_eq!(claims[0].claimed, 15.0);
        assert_eq!(claims[0].baseline, Some(2018));
    }
}
