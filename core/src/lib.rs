//! esg-core: disclosure verification and risk scoring engine.

pub mod config;
pub mod error;
pub mod rng;
pub mod text;
pub mod types;

// ── Extraction ─────────────────────────────────────
pub mod disclosure_signals;
pub mod improvement_extractor;
pub mod metadata_extractor;
pub mod metric_extractor;
pub mod profile;
pub mod section_chunker;

// ── Verification ───────────────────────────────────
pub mod third_party;
pub mod verification;

// ── Scoring ────────────────────────────────────────
pub mod esg_rollup;
pub mod greenwashing_scorer;
pub mod lma_compliance;
pub mod settlement_risk;

// ── Orchestration ──────────────────────────────────
pub mod engine;
pub mod event;
pub mod snapshot;

pub use engine::{AnalysisReport, AnalysisRequest, DisclosureEngine};
pub use error::{EngineError, EngineResult};
