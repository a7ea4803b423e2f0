//! Scoring and trend engine for monthly business scorecards.
//!
//! Raw submissions are normalized into variances, scored per section
//! against a rubric table, summed into a 0-100 total and classified into a
//! RAG band. Trends and heatmap bands are derived from stored scores on
//! demand.

pub mod cli;
pub mod config;
pub mod errors;
pub mod heatmap;
pub mod models;
pub mod portfolio;
pub mod report;
pub mod scoring;
pub mod storage;
pub mod trend;
pub mod variance;

pub use config::{DEFAULT_RUBRIC, HEATMAP_THRESHOLDS, RAG_THRESHOLDS, ScoringRubric};
pub use errors::{EngineError, EngineResult};
pub use heatmap::heatmap_band;
pub use models::{
    FinancialInputs, HeatmapBand, MetricFigures, Month, QualitativeInputs, RagBand, Scorecard,
    Section, SectionScores, Submission, TrendData, TrendDirection,
};
pub use scoring::{classify_rag, compute_section_scores, compute_total, score_submission};
pub use trend::compute_trend;
