use crate::errors::{EngineError, EngineResult};
use crate::models::{Metric, Section};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Linear credit band: full points at or above `full_credit_at`, nothing
/// below `zero_credit_below`, scaled in between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub max_points: u32,
    pub full_credit_at: f64,
    pub zero_credit_below: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialRubric {
    pub revenue: Band,
    pub gross_profit: Band,
    pub overheads: Band,
    pub net_profit: Band,
}

/// Per-metric band table. This is the only place point values and cut
/// points live; the scorer and the score explanation both read it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringRubric {
    pub financial: FinancialRubric,
    pub productivity: Band,
    pub customer: Band,
    pub people: Band,
    pub operations: Band,
}

const VARIANCE_BAND: Band = Band {
    max_points: 10,
    full_credit_at: 0.0,
    zero_credit_below: -20.0,
};

const RATING_BAND: Band = Band {
    max_points: 15,
    full_credit_at: 8.0,
    zero_credit_below: 2.0,
};

pub const DEFAULT_RUBRIC: ScoringRubric = ScoringRubric {
    financial: FinancialRubric {
        revenue: VARIANCE_BAND,
        gross_profit: VARIANCE_BAND,
        overheads: VARIANCE_BAND,
        net_profit: VARIANCE_BAND,
    },
    productivity: Band {
        max_points: 15,
        full_credit_at: 0.0,
        zero_credit_below: -30.0,
    },
    customer: RATING_BAND,
    people: RATING_BAND,
    operations: RATING_BAND,
};

pub const TOTAL_MAX_SCORE: u32 = 100;
pub const FINANCIAL_MAX_SCORE: u32 = 40;

impl ScoringRubric {
    pub fn band(&self, metric: Metric) -> &Band {
        match metric {
            Metric::Revenue => &self.financial.revenue,
            Metric::GrossProfit => &self.financial.gross_profit,
            Metric::Overheads => &self.financial.overheads,
            Metric::NetProfit => &self.financial.net_profit,
            Metric::Productivity => &self.productivity,
            Metric::CustomerRating => &self.customer,
            Metric::PeopleRating => &self.people,
            Metric::OperationsRating => &self.operations,
        }
    }

    pub fn bands(&self) -> [(Metric, &Band); 8] {
        [
            (Metric::Revenue, &self.financial.revenue),
            (Metric::GrossProfit, &self.financial.gross_profit),
            (Metric::Overheads, &self.financial.overheads),
            (Metric::NetProfit, &self.financial.net_profit),
            (Metric::Productivity, &self.productivity),
            (Metric::CustomerRating, &self.customer),
            (Metric::PeopleRating, &self.people),
            (Metric::OperationsRating, &self.operations),
        ]
    }

    pub fn section_max(&self, section: Section) -> u32 {
        self.bands()
            .iter()
            .filter(|(metric, _)| metric.section() == section)
            .map(|(_, band)| band.max_points)
            .sum()
    }

    pub fn validate(&self) -> EngineResult<()> {
        for (metric, band) in self.bands() {
            if !band.full_credit_at.is_finite() || !band.zero_credit_below.is_finite() {
                return Err(EngineError::InvalidRubric(format!(
                    "{metric} band has non-finite thresholds"
                )));
            }
            if band.full_credit_at <= band.zero_credit_below {
                return Err(EngineError::InvalidRubric(format!(
                    "{metric} band: full credit threshold {} must exceed floor {}",
                    band.full_credit_at, band.zero_credit_below
                )));
            }
        }
        let financial = &self.financial;
        let per_metric = financial.revenue.max_points;
        let equal_weights = [financial.gross_profit, financial.overheads, financial.net_profit]
            .iter()
            .all(|band| band.max_points == per_metric);
        if !equal_weights {
            return Err(EngineError::InvalidRubric(
                "financial metrics must carry equal points".to_string(),
            ));
        }
        let financial_max = self.section_max(Section::Financial);
        if financial_max != FINANCIAL_MAX_SCORE {
            return Err(EngineError::InvalidRubric(format!(
                "financial section is worth {financial_max}, expected {FINANCIAL_MAX_SCORE}"
            )));
        }
        let total: u32 = Section::ALL.iter().map(|s| self.section_max(*s)).sum();
        if total != TOTAL_MAX_SCORE {
            return Err(EngineError::InvalidRubric(format!(
                "section maxima sum to {total}, expected {TOTAL_MAX_SCORE}"
            )));
        }
        Ok(())
    }
}

impl Default for ScoringRubric {
    fn default() -> Self {
        DEFAULT_RUBRIC
    }
}

/// Inclusive lower bounds for the green and amber bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagThresholds {
    pub green_from: u32,
    pub amber_from: u32,
}

pub const RAG_THRESHOLDS: RagThresholds = RagThresholds {
    green_from: 75,
    amber_from: 60,
};

/// Inclusive lower bounds, in percent of the section maximum. Kept apart
/// from [`RagThresholds`] on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapThresholds {
    pub excellent_from: f64,
    pub good_from: f64,
    pub fair_from: f64,
    pub poor_from: f64,
}

pub const HEATMAP_THRESHOLDS: HeatmapThresholds = HeatmapThresholds {
    excellent_from: 80.0,
    good_from: 60.0,
    fair_from: 40.0,
    poor_from: 20.0,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PathsConfig {
    pub scorecards_csv: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UiConfig {
    pub color: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub paths: PathsConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: Settings,
    pub rubric: ScoringRubric,
    pub base_dir: PathBuf,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let dirs = project_dirs()?;
        Self::load_from(dirs.data_dir())
    }

    pub fn load_from(base_dir: &Path) -> Result<Self> {
        fs::create_dir_all(base_dir)?;

        let settings_path = base_dir.join("settings.json");
        let rubric_path = base_dir.join("rubric.json");

        let settings: Settings = load_or_write(&settings_path, default_settings(base_dir))?;
        let rubric: ScoringRubric = load_or_write(&rubric_path, DEFAULT_RUBRIC)?;
        rubric
            .validate()
            .with_context(|| format!("Rejected rubric in {}", rubric_path.display()))?;

        if let Some(parent) = settings.paths.scorecards_csv.parent() {
            fs::create_dir_all(parent)?;
        }
        tracing::debug!("Loaded configuration from {}", base_dir.display());

        Ok(AppConfig {
            settings,
            rubric,
            base_dir: base_dir.to_path_buf(),
        })
    }
}

fn load_or_write<T>(path: &Path, default: T) -> Result<T>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        let data = serde_json::to_string_pretty(&default)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        return Ok(default);
    }
    let bytes =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&bytes)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(value)
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "example", "scorecard")
        .context("Unable to determine platform data directory")
}

fn default_settings(base_dir: &Path) -> Settings {
    Settings {
        paths: PathsConfig {
            scorecards_csv: base_dir.join("data").join("scorecards.csv"),
        },
        ui: UiConfig { color: true },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rubric_is_valid() {
        assert_eq!(DEFAULT_RUBRIC.validate(), Ok(()));
    }

    #[test]
    fn financial_section_is_forty_points_in_four_metrics() {
        let rubric = DEFAULT_RUBRIC;
        assert_eq!(rubric.section_max(Section::Financial), 40);
        let financial: Vec<_> = rubric
            .bands()
            .into_iter()
            .filter(|(m, _)| m.section() == Section::Financial)
            .collect();
        assert_eq!(financial.len(), 4);
        assert!(financial.iter().all(|(_, b)| b.max_points == 10));
    }

    #[test]
    fn rubric_with_wrong_total_is_rejected() {
        let mut rubric = DEFAULT_RUBRIC;
        rubric.customer.max_points = 20;
        assert!(matches!(
            rubric.validate(),
            Err(EngineError::InvalidRubric(_))
        ));
    }

    #[test]
    fn rubric_with_uneven_financial_weights_is_rejected() {
        let mut rubric = DEFAULT_RUBRIC;
        rubric.financial.revenue.max_points = 25;
        rubric.financial.gross_profit.max_points = 5;
        rubric.financial.overheads.max_points = 0;
        rubric.financial.net_profit.max_points = 10;
        assert_eq!(rubric.section_max(Section::Financial), 40);
        assert_eq!(
            rubric.validate(),
            Err(EngineError::InvalidRubric(
                "financial metrics must carry equal points".to_string()
            ))
        );
    }

    #[test]
    fn rubric_with_resized_financial_section_is_rejected() {
        let mut rubric = DEFAULT_RUBRIC;
        for band in [
            &mut rubric.financial.revenue,
            &mut rubric.financial.gross_profit,
            &mut rubric.financial.overheads,
            &mut rubric.financial.net_profit,
        ] {
            band.max_points = 5;
        }
        rubric.productivity.max_points = 35;
        assert!(matches!(
            rubric.validate(),
            Err(EngineError::InvalidRubric(msg)) if msg.contains("financial section")
        ));
    }

    #[test]
    fn rubric_with_inverted_band_is_rejected() {
        let mut rubric = DEFAULT_RUBRIC;
        rubric.productivity.zero_credit_below = 5.0;
        assert!(rubric.validate().is_err());
    }

    #[test]
    fn load_from_writes_defaults_then_reads_them_back() {
        let dir = tempfile::tempdir().unwrap();
        let first = AppConfig::load_from(dir.path()).unwrap();
        assert!(dir.path().join("rubric.json").exists());
        assert!(dir.path().join("settings.json").exists());
        let second = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(first.rubric, second.rubric);
        assert_eq!(second.rubric, DEFAULT_RUBRIC);
    }

    #[test]
    fn load_from_rejects_invalid_rubric_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut rubric = DEFAULT_RUBRIC;
        rubric.people.max_points = 0;
        fs::write(
            dir.path().join("rubric.json"),
            serde_json::to_string(&rubric).unwrap(),
        )
        .unwrap();
        assert!(AppConfig::load_from(dir.path()).is_err());
    }
}
