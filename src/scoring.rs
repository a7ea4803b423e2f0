use crate::config::{Band, RAG_THRESHOLDS, RagThresholds, ScoringRubric, TOTAL_MAX_SCORE};
use crate::errors::{EngineError, EngineResult};
use crate::models::{
    FinancialInputs, Metric, QualitativeInputs, RagBand, Scorecard, Section, SectionScores,
    Submission,
};
use crate::variance::{check_finite, normalize, productivity_variance, resolve_net_profit};
use serde::{Deserialize, Serialize};

pub const MAX_RATING: f64 = 10.0;

/// Absorbs binary float error so an exact half (e.g. 15 * 1.8 / 6) still
/// rounds up.
const ROUNDING_EPSILON: f64 = 1e-9;

/// Points earned by one metric, with the input that earned them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    pub metric: Metric,
    pub section: Section,
    /// Normalized variance (percent) or rating; `None` when not supplied.
    pub input: Option<f64>,
    pub points: u32,
    pub max_points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sections: SectionScores,
    pub total: u32,
    pub metrics: Vec<MetricScore>,
}

impl ScoreBreakdown {
    pub fn metrics_in(&self, section: Section) -> impl Iterator<Item = &MetricScore> {
        self.metrics.iter().filter(move |m| m.section == section)
    }
}

/// Round-half-up for non-negative values. Every metric is rounded on its
/// own so section and total scores stay exact integer sums.
pub fn round_half_up(value: f64) -> u32 {
    (value + 0.5 + ROUNDING_EPSILON).floor().max(0.0) as u32
}

pub fn band_points(band: &Band, input: f64) -> u32 {
    if input >= band.full_credit_at {
        return band.max_points;
    }
    if input < band.zero_credit_below {
        return 0;
    }
    let span = band.full_credit_at - band.zero_credit_below;
    let scaled = f64::from(band.max_points) * (input - band.zero_credit_below) / span;
    round_half_up(scaled).min(band.max_points)
}

pub fn score_inputs(
    financial: &FinancialInputs,
    qualitative: &QualitativeInputs,
    rubric: &ScoringRubric,
) -> EngineResult<ScoreBreakdown> {
    let net_profit = resolve_net_profit(financial);
    let inputs = [
        (Metric::Revenue, normalize(Metric::Revenue, &financial.revenue)?),
        (
            Metric::GrossProfit,
            normalize(Metric::GrossProfit, &financial.gross_profit)?,
        ),
        (Metric::Overheads, normalize(Metric::Overheads, &financial.overheads)?),
        (Metric::NetProfit, normalize(Metric::NetProfit, &net_profit)?),
        (Metric::Productivity, productivity_variance(financial)?),
        (
            Metric::CustomerRating,
            rating(Metric::CustomerRating, qualitative.customer)?,
        ),
        (
            Metric::PeopleRating,
            rating(Metric::PeopleRating, qualitative.people)?,
        ),
        (
            Metric::OperationsRating,
            rating(Metric::OperationsRating, qualitative.operations)?,
        ),
    ];

    let mut sections = SectionScores::default();
    let mut metrics = Vec::with_capacity(inputs.len());
    for (metric, input) in inputs {
        let band = rubric.band(metric);
        let points = match input {
            Some(value) => band_points(band, value),
            None => {
                tracing::debug!(%metric, "no input, scoring zero");
                0
            }
        };
        sections.add(metric.section(), points);
        metrics.push(MetricScore {
            metric,
            section: metric.section(),
            input,
            points,
            max_points: band.max_points,
        });
    }

    Ok(ScoreBreakdown {
        total: compute_total(&sections),
        sections,
        metrics,
    })
}

pub fn compute_section_scores(
    financial: &FinancialInputs,
    qualitative: &QualitativeInputs,
    rubric: &ScoringRubric,
) -> EngineResult<SectionScores> {
    score_inputs(financial, qualitative, rubric).map(|b| b.sections)
}

pub fn score_submission(
    submission: &Submission,
    rubric: &ScoringRubric,
) -> EngineResult<ScoreBreakdown> {
    score_inputs(&submission.financial, &submission.qualitative, rubric)
}

/// Score a submission into a fresh scorecard.
pub fn build_scorecard(submission: &Submission, rubric: &ScoringRubric) -> EngineResult<Scorecard> {
    let breakdown = score_submission(submission, rubric)?;
    Ok(Scorecard::new(
        submission.business_id.clone(),
        submission.business_name.clone(),
        submission.month,
        breakdown.sections,
        breakdown.total,
    ))
}

pub fn compute_total(sections: &SectionScores) -> u32 {
    sections.iter().map(|(_, points)| points).sum()
}

pub fn classify_rag(total: u32) -> EngineResult<RagBand> {
    RAG_THRESHOLDS.classify(total)
}

impl RagThresholds {
    pub fn classify(&self, total: u32) -> EngineResult<RagBand> {
        if total > TOTAL_MAX_SCORE {
            return Err(EngineError::ScoreOutOfRange(total));
        }
        Ok(if total >= self.green_from {
            RagBand::Green
        } else if total >= self.amber_from {
            RagBand::Amber
        } else {
            RagBand::Red
        })
    }
}

impl Scorecard {
    pub fn rag_band(&self) -> EngineResult<RagBand> {
        classify_rag(self.total_score)
    }
}

fn rating(metric: Metric, value: Option<f64>) -> EngineResult<Option<f64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    check_finite(metric, "rating", value)?;
    if !(0.0..=MAX_RATING).contains(&value) {
        return Err(EngineError::RatingOutOfRange {
            field: metric.to_string(),
            value,
        });
    }
    Ok(Some(value))
}
