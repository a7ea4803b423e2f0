use crate::config::{HEATMAP_THRESHOLDS, HeatmapThresholds};
use crate::errors::{EngineError, EngineResult};
use crate::models::HeatmapBand;

/// Bucket `score` out of `max_score` into a heatmap band.
pub fn heatmap_band(score: i32, max_score: i32) -> EngineResult<HeatmapBand> {
    HEATMAP_THRESHOLDS.band(score, max_score)
}

impl HeatmapThresholds {
    pub fn band(&self, score: i32, max_score: i32) -> EngineResult<HeatmapBand> {
        if max_score < 0 {
            return Err(EngineError::NegativeMaxScore(max_score));
        }
        // not applicable, whatever the score says
        if max_score == 0 {
            return Ok(HeatmapBand::Empty);
        }
        if score < 0 {
            return Err(EngineError::NegativeScore(score));
        }
        if score > max_score {
            return Err(EngineError::ScoreAboveMax { score, max_score });
        }
        let percent = f64::from(score) / f64::from(max_score) * 100.0;
        Ok(if percent >= self.excellent_from {
            HeatmapBand::Excellent
        } else if percent >= self.good_from {
            HeatmapBand::Good
        } else if percent >= self.fair_from {
            HeatmapBand::Fair
        } else if percent >= self.poor_from {
            HeatmapBand::Poor
        } else {
            HeatmapBand::Critical
        })
    }
}
