//! Portfolio view across businesses for one month.
//!
//! Each row is computed on its own, so rows are built in parallel and then
//! ordered by business id.

use crate::config::ScoringRubric;
use crate::errors::EngineResult;
use crate::heatmap::heatmap_band;
use crate::models::{HeatmapBand, Month, RagBand, Scorecard, Section, TrendData};
use crate::trend::month_over_month;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub section: Section,
    pub score: u32,
    pub max_score: u32,
    pub band: HeatmapBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRow {
    pub business_id: String,
    pub business_name: String,
    pub month: Month,
    pub total_score: u32,
    pub rag: RagBand,
    pub trend: Option<TrendData>,
    pub cells: Vec<HeatmapCell>,
}

pub fn build_portfolio(
    scorecards: &[Scorecard],
    month: Month,
    rubric: &ScoringRubric,
) -> EngineResult<Vec<PortfolioRow>> {
    let current: Vec<&Scorecard> = scorecards.iter().filter(|s| s.month == month).collect();
    let mut rows = current
        .par_iter()
        .map(|card| build_row(card, scorecards, rubric))
        .collect::<EngineResult<Vec<_>>>()?;
    rows.sort_by(|a, b| a.business_id.cmp(&b.business_id));
    Ok(rows)
}

fn build_row(
    card: &Scorecard,
    history: &[Scorecard],
    rubric: &ScoringRubric,
) -> EngineResult<PortfolioRow> {
    let cells = Section::ALL
        .into_iter()
        .map(|section| -> EngineResult<HeatmapCell> {
            let score = card.sections.get(section);
            let max_score = rubric.section_max(section);
            let band = heatmap_band(to_i32(score), to_i32(max_score))?;
            Ok(HeatmapCell {
                section,
                score,
                max_score,
                band,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(PortfolioRow {
        business_id: card.business_id.clone(),
        business_name: card.business_name.clone(),
        month: card.month,
        total_score: card.total_score,
        rag: card.rag_band()?,
        trend: month_over_month(history, &card.business_id, card.month),
        cells,
    })
}

// section points never exceed 100
fn to_i32(points: u32) -> i32 {
    i32::try_from(points).unwrap_or(i32::MAX)
}
