use crate::config::TOTAL_MAX_SCORE;
use crate::errors::EngineError;
use crate::models::{
    DATE_FMT, FinancialInputs, MetricFigures, Month, QualitativeInputs, Scorecard, SectionScores,
    Submission,
};
use crate::scoring::compute_total;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use uuid::Uuid;

pub fn read_submissions(path: &Path) -> Result<Vec<Submission>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    file.lock_shared()?;
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(&file);
    let mut submissions = Vec::new();
    for (line, result) in reader.deserialize::<CsvSubmission>().enumerate() {
        let row = result.with_context(|| format!("Bad submission row {}", line + 1))?;
        submissions.push(row.into_submission());
    }
    file.unlock()?;
    Ok(submissions)
}

pub fn read_scorecards(path: &Path) -> Result<Vec<Scorecard>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    file.lock_shared()?;
    let mut reader = ReaderBuilder::new().from_reader(&file);
    let mut cards = Vec::new();
    for result in reader.deserialize::<CsvScorecard>() {
        let csv_card = result?;
        cards.push(csv_card.into_scorecard()?);
    }
    file.unlock()?;
    Ok(cards)
}

pub fn write_scorecards(path: &Path, cards: &[Scorecard]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    file.lock_exclusive()?;
    file.set_len(0)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(&file);
    for card in cards {
        writer.serialize(CsvScorecard::from(card))?;
    }
    writer.flush()?;
    file.unlock()?;
    Ok(())
}

/// Fold freshly scored cards into the stored set. A card for an existing
/// business+month replaces the stored scores but keeps its id and creation
/// time.
pub fn merge_scorecards(existing: &mut Vec<Scorecard>, fresh: Vec<Scorecard>) {
    for card in fresh {
        match existing
            .iter_mut()
            .find(|c| c.business_id == card.business_id && c.month == card.month)
        {
            Some(stored) => {
                stored.business_name = card.business_name;
                stored.sections = card.sections;
                stored.total_score = card.total_score;
                stored.updated_at = card.updated_at;
            }
            None => existing.push(card),
        }
    }
    existing.sort_by(|a, b| {
        a.business_id
            .cmp(&b.business_id)
            .then_with(|| a.month.cmp(&b.month))
    });
}

#[derive(serde::Deserialize)]
struct CsvSubmission {
    business_id: String,
    business_name: String,
    month: Month,
    revenue_actual: Option<f64>,
    revenue_target: Option<f64>,
    #[serde(default)]
    revenue_variance: Option<f64>,
    gross_profit_actual: Option<f64>,
    gross_profit_target: Option<f64>,
    #[serde(default)]
    gross_profit_variance: Option<f64>,
    overheads_actual: Option<f64>,
    overheads_budget: Option<f64>,
    #[serde(default)]
    overheads_variance: Option<f64>,
    #[serde(default)]
    net_profit_actual: Option<f64>,
    #[serde(default)]
    net_profit_target: Option<f64>,
    #[serde(default)]
    net_profit_variance: Option<f64>,
    #[serde(default)]
    net_profit_override: bool,
    wages_actual: Option<f64>,
    productivity_benchmark: Option<f64>,
    customer_rating: Option<f64>,
    people_rating: Option<f64>,
    operations_rating: Option<f64>,
}

impl CsvSubmission {
    fn into_submission(self) -> Submission {
        let figures = |actual, target, variance_percent| MetricFigures {
            actual,
            target,
            variance_percent,
        };
        Submission {
            business_id: self.business_id,
            business_name: self.business_name,
            month: self.month,
            financial: FinancialInputs {
                revenue: figures(
                    self.revenue_actual,
                    self.revenue_target,
                    self.revenue_variance,
                ),
                gross_profit: figures(
                    self.gross_profit_actual,
                    self.gross_profit_target,
                    self.gross_profit_variance,
                ),
                overheads: figures(
                    self.overheads_actual,
                    self.overheads_budget,
                    self.overheads_variance,
                ),
                net_profit: figures(
                    self.net_profit_actual,
                    self.net_profit_target,
                    self.net_profit_variance,
                ),
                net_profit_override: self.net_profit_override,
                wages_actual: self.wages_actual,
                productivity_benchmark: self.productivity_benchmark,
            },
            qualitative: QualitativeInputs {
                customer: self.customer_rating,
                people: self.people_rating,
                operations: self.operations_rating,
            },
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
struct CsvScorecard {
    id: Uuid,
    business_id: String,
    business_name: String,
    month: Month,
    financial: u32,
    productivity: u32,
    customer: u32,
    people: u32,
    operations: u32,
    total_score: u32,
    created_at: String,
    updated_at: String,
}

impl CsvScorecard {
    fn into_scorecard(self) -> Result<Scorecard> {
        let sections = SectionScores {
            financial: self.financial,
            productivity: self.productivity,
            customer: self.customer,
            people: self.people,
            operations: self.operations,
        };
        let section_sum = compute_total(&sections);
        if section_sum != self.total_score {
            return Err(EngineError::TotalMismatch {
                total: self.total_score,
                section_sum,
            })
            .with_context(|| {
                format!(
                    "Corrupt scorecard {} for {} {}",
                    self.id, self.business_id, self.month
                )
            });
        }
        if self.total_score > TOTAL_MAX_SCORE {
            return Err(EngineError::ScoreOutOfRange(self.total_score))
                .with_context(|| format!("Corrupt scorecard {}", self.id));
        }
        Ok(Scorecard {
            id: self.id,
            business_id: self.business_id,
            business_name: self.business_name,
            month: self.month,
            sections,
            total_score: self.total_score,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl From<&Scorecard> for CsvScorecard {
    fn from(card: &Scorecard) -> Self {
        CsvScorecard {
            id: card.id,
            business_id: card.business_id.clone(),
            business_name: card.business_name.clone(),
            month: card.month,
            financial: card.sections.financial,
            productivity: card.sections.productivity,
            customer: card.sections.customer,
            people: card.sections.people,
            operations: card.sections.operations,
            total_score: card.total_score,
            created_at: card.created_at.format(DATE_FMT).to_string(),
            updated_at: card.updated_at.format(DATE_FMT).to_string(),
        }
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s, DATE_FMT)
        .with_context(|| format!("Failed to parse timestamp {s} with format {DATE_FMT}"))?;
    Ok(naive.and_utc())
}
