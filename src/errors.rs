//! Errors raised by the scoring engine.
//!
//! Missing data, zero divisors and a missing prior period are handled inside
//! the engine and never show up here. Everything in [`EngineError`] is a
//! malformed input from the caller and is rejected instead of clamped.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("variance {value}% for {metric} is outside [-100, 100]")]
    VarianceOutOfRange { metric: String, value: f64 },

    #[error("max score must not be negative (got {0})")]
    NegativeMaxScore(i32),

    #[error("score must not be negative (got {0})")]
    NegativeScore(i32),

    #[error("score {score} exceeds max score {max_score}")]
    ScoreAboveMax { score: i32, max_score: i32 },

    #[error("total score {total} does not equal the section sum {section_sum}")]
    TotalMismatch { total: u32, section_sum: u32 },

    #[error("total score {0} is outside [0, 100]")]
    ScoreOutOfRange(u32),

    #[error("{field} must not be negative (got {value})")]
    NegativeAmount { field: String, value: f64 },

    #[error("productivity benchmark {0} is outside [0, 20]")]
    BenchmarkOutOfRange(f64),

    #[error("{field} rating {value} is outside [0, 10]")]
    RatingOutOfRange { field: String, value: f64 },

    #[error("{0} is not a finite number")]
    NonFinite(String),

    #[error("invalid month {0:?}, expected YYYY-MM")]
    InvalidMonth(String),

    #[error("invalid rubric: {0}")]
    InvalidRubric(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
