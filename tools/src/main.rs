//! disclosure-runner: headless development harness for the ESG engine.
//!
//! Usage:
//!   disclosure-runner --file report.txt
//!   disclosure-runner --file report.txt --simulate --seed 12345 --data-dir ./data
//!   disclosure-runner --file report.txt --as-of 2024-06-30 --summary
//!
//! The full analysis report is printed to stdout as JSON.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use esg_core::{
    config::EngineConfig,
    engine::{AnalysisReport, AnalysisRequest, DisclosureEngine},
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(file) = flag_value(&args, "--file") else {
        bail!("usage: disclosure-runner --file <path> [--seed N] [--simulate] [--data-dir D] [--as-of YYYY-MM-DD] [--summary]");
    };
    let seed = parse_arg(&args, "--seed", 42u64);
    let simulate = args.iter().any(|a| a == "--simulate");
    let summary = args.iter().any(|a| a == "--summary");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let as_of = match flag_value(&args, "--as-of") {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("--as-of must be YYYY-MM-DD, got {raw}"))?,
        None => Utc::now().date_naive(),
    };

    let text = std::fs::read_to_string(file).with_context(|| format!("Cannot read {file}"))?;
    let config = if Path::new(data_dir).is_dir() {
        EngineConfig::load(data_dir)?
    } else {
        log::warn!("data dir {data_dir} not found, using built-in defaults");
        EngineConfig::default()
    };

    let mut engine = if simulate {
        DisclosureEngine::simulated(config, seed)
    } else {
        DisclosureEngine::new(config)
    };

    let request = AnalysisRequest {
        file_name: Path::new(file)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string),
        ..AnalysisRequest::from_text(text)
    };
    let report = engine.analyze(&request, as_of)?;

    if summary {
        print_summary(&report, seed, simulate);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn print_summary(report: &AnalysisReport, seed: u64, simulate: bool) {
    let meta = &report.profile.metadata;
    println!("=== DISCLOSURE SUMMARY ===");
    println!("  analysis_id:   {}", report.analysis_id);
    println!("  file:          {}", report.file_name.as_deref().unwrap_or("-"));
    println!("  company:       {}", meta.company_name.as_deref().unwrap_or("Not found"));
    println!(
        "  year:          {}",
        meta.reporting_year.map_or("Not found".to_string(), |y| y.to_string())
    );
    println!("  completeness:  {}%", meta.completeness);
    println!("  verification:  {:?}", report.verification_mode);
    if simulate {
        println!("  seed:          {seed}");
    }
    println!();
    println!("=== CLAIMED VS VERIFIED ===");
    for row in &report.claimed_vs_verified {
        let deviation = row
            .deviation
            .map_or("n/a".to_string(), |d| format!("{d:.1}"));
        println!("  {:<22} deviation {:>6}  {:?}", row.metric, deviation, row.status);
    }
    println!();
    println!("=== LMA GREEN LOAN PRINCIPLES ({:?}) ===", report.lma_outcome);
    for mapping in &report.lma_compliance {
        println!("  {:<46} {:?}", mapping.principle, mapping.status);
    }
    println!();
    println!(
        "=== GREENWASHING: {} ({}) ===",
        report.greenwashing.overall_score,
        report.greenwashing.risk_level.as_str()
    );
    for entry in &report.greenwashing.breakdown {
        println!(
            "  {:<24} {:>6.1} x {:.2} = {:>5.1}",
            entry.component, entry.score, entry.weight, entry.weighted_score
        );
    }
    if !report.red_flags.is_empty() {
        println!();
        println!("=== RED FLAGS ===");
        for flag in &report.red_flags {
            println!("  - {flag}");
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
