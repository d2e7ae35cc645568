//! Integration tests: metric extraction and its serialized shape.

use esg_core::metric_extractor::{extract_metrics, MetricReading, MetricStatus};

const FRAMEWORK: &str = include_str!("fixtures/green_loan_framework.txt");

/// "Scope 1: 1,200 tCO2e" with "baseline year: 2022" is read exactly.
#[test]
fn scope1_and_baseline_year() {
    let metrics = extract_metrics("Scope 1: 1,200 tCO2e. Our baseline year: 2022.");
    let scope1 = &metrics.carbon_emissions.scope1;

    assert_eq!(scope1.status(), MetricStatus::Found);
    assert_eq!(scope1.value(), Some(1200.0));
    match scope1 {
        MetricReading::Found { unit, .. } => assert_eq!(unit, "tCO2e"),
        other => panic!("Expected a found reading, got {other:?}"),
    }
    assert_eq!(metrics.carbon_emissions.baseline_year, Some(2022));

    let json = serde_json::to_value(&metrics).expect("metrics serialize");
    assert_eq!(json["carbonEmissions"]["scope1"]["value"], 1200.0);
    assert_eq!(json["carbonEmissions"]["scope1"]["unit"], "tCO2e");
    assert_eq!(json["carbonEmissions"]["scope1"]["status"], "found");
    assert_eq!(json["carbonEmissions"]["scope1"]["confidence"], "high");
    assert_eq!(json["carbonEmissions"]["baselineYear"], 2022);
}

/// Missing metrics serialize as null, not as a populated record.
#[test]
fn missing_metric_is_null() {
    let metrics = extract_metrics("Scope 1: 1,200 tCO2e.");
    let json = serde_json::to_value(&metrics).expect("metrics serialize");
    assert!(json["carbonEmissions"]["scope3"].is_null());
    assert!(json["waterUsage"].is_null());
    assert!(json["carbonEmissions"]["baselineYear"].is_null());
}

/// A topic mention without a number is partial with value "Present".
#[test]
fn topic_without_number_is_partial() {
    let metrics = extract_metrics("We are expanding our renewable energy programme next year.");
    assert_eq!(metrics.renewable_energy.status(), MetricStatus::Partial);

    let json = serde_json::to_value(&metrics).expect("metrics serialize");
    assert_eq!(json["renewableEnergy"]["value"], "Present");
    assert_eq!(json["renewableEnergy"]["confidence"], "medium");
    assert!(json["renewableEnergy"]["unit"].is_null());
}

/// Empty text yields all-missing metrics without error.
#[test]
fn empty_text_is_all_missing() {
    let metrics = extract_metrics("");
    assert_eq!(metrics.found_count(), 0);
    assert_eq!(metrics.carbon_emissions.scope1, MetricReading::Missing);
    assert_eq!(metrics.community_investment, MetricReading::Missing);
}

/// Every family in the fixture is read with its unit.
#[test]
fn framework_fixture_metrics() {
    let metrics = extract_metrics(FRAMEWORK);
    let carbon = &metrics.carbon_emissions;
    assert_eq!(carbon.scope1.value(), Some(1200.0));
    assert_eq!(carbon.scope2.value(), Some(3400.0));
    assert_eq!(carbon.scope3.value(), Some(45000.0));
    assert_eq!(carbon.baseline_year, Some(2019));
    assert_eq!(metrics.renewable_energy.value(), Some(65.0));
    assert_eq!(metrics.water_usage.value(), Some(120000.0));
    assert_eq!(metrics.waste_recycling_rate.value(), Some(72.0));
    assert_eq!(metrics.women_in_leadership, MetricReading::Missing);
    assert_eq!(metrics.found_count(), 6);

    match &metrics.water_usage {
        MetricReading::Found { unit, .. } => assert_eq!(unit, "m3"),
        other => panic!("Expected water usage to be found, got {other:?}"),
    }
}

/// Currency amounts with magnitude words are scaled.
#[test]
fn community_investment_with_magnitude() {
    let metrics = extract_metrics("Community investment of $2.5 million supported local schools.");
    assert_eq!(metrics.community_investment.value(), Some(2_500_000.0));
    match &metrics.community_investment {
        MetricReading::Found { unit, .. } => assert_eq!(unit, "USD"),
        other => panic!("Expected community investment to be found, got {other:?}"),
    }
}

/// Single-letter M and B suffixes scale emissions by 10^6 and 10^9.
#[test]
fn emissions_with_letter_magnitude() {
    let scope1 = extract_metrics("Scope 1: 1.2M tCO2e.").carbon_emissions.scope1;
    assert_eq!(scope1.value(), Some(1_200_000.0));
    match &scope1 {
        MetricReading::Found { unit, source, .. } => {
            assert_eq!(unit, "tCO2e");
            assert!(source.contains("1.2M tCO2e"), "Source lost the magnitude: {source}");
        }
        other => panic!("Expected scope 1 to be found, got {other:?}"),
    }

    let scope3 = extract_metrics("Scope 3 emissions were 2.1B tonnes.").carbon_emissions.scope3;
    assert_eq!(scope3.value(), Some(2_100_000_000.0));
}

/// "Mt" stays a unit; it is not read as an M suffix.
#[test]
fn megatonne_unit_is_not_a_magnitude() {
    let scope2 = extract_metrics("Scope 2: 1.2 MtCO2e.").carbon_emissions.scope2;
    assert_eq!(scope2.value(), Some(1.2));
    match &scope2 {
        MetricReading::Found { unit, .. } => assert_eq!(unit, "MtCO2e"),
        other => panic!("Expected scope 2 to be found, got {other:?}"),
    }
}

/// Water volumes keep their unit when an M suffix precedes it.
#[test]
fn water_with_letter_magnitude() {
    let metrics = extract_metrics("Water consumption: 2.5M liters.");
    assert_eq!(metrics.water_usage.value(), Some(2_500_000.0));
    match &metrics.water_usage {
        MetricReading::Found { unit, .. } => assert_eq!(unit, "liters"),
        other => panic!("Expected water usage to be found, got {other:?}"),
    }

    let cubic = extract_metrics("Water consumption: 120,000 m3 across all sites.");
    assert_eq!(cubic.water_usage.value(), Some(120_000.0));
}

/// Partial readings carry a bounded context snippet.
#[test]
fn partial_source_is_bounded() {
    let text = format!("{} Scope 3 is under review. {}", "a ".repeat(80), "b ".repeat(80));
    let metrics = extract_metrics(&text);
    match &metrics.carbon_emissions.scope3 {
        MetricReading::Partial { source } => {
            assert!(source.contains("Scope 3"), "Snippet lost the topic: {source}");
            assert!(source.chars().count() <= 100, "Snippet too long: {}", source.chars().count());
        }
        other => panic!("Expected a partial scope 3 reading, got {other:?}"),
    }
}

/// Extraction is idempotent: identical text, byte-identical output.
#[test]
fn extraction_is_idempotent() {
    let a = serde_json::to_string(&extract_metrics(FRAMEWORK)).expect("serialize a");
    let b = serde_json::to_string(&extract_metrics(FRAMEWORK)).expect("serialize b");
    assert_eq!(a, b);
}
