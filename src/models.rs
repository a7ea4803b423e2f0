use crate::errors::{EngineError, EngineResult};
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";
pub const MONTH_FMT: &str = "%Y-%m";

/// A calendar month, always stored as the first day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month(NaiveDate);

impl Month {
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Month)
            .ok_or_else(|| EngineError::InvalidMonth(format!("{year:04}-{month:02}")))
    }

    /// The month immediately before this one.
    pub fn previous(self) -> Option<Month> {
        self.0.checked_sub_months(Months::new(1)).map(Month)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }
}

impl FromStr for Month {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // chrono needs a day to build a date; reject anything that already carries one
        if trimmed.len() != 7 {
            return Err(EngineError::InvalidMonth(s.to_string()));
        }
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(Month)
            .map_err(|_| EngineError::InvalidMonth(s.to_string()))
    }
}

impl TryFrom<String> for Month {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(MONTH_FMT))
    }
}

/// Actual vs target (or budget) for one financial metric.
///
/// `variance_percent` carries a figure already computed upstream; when
/// present it wins over the raw pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricFigures {
    pub actual: Option<f64>,
    pub target: Option<f64>,
    pub variance_percent: Option<f64>,
}

impl MetricFigures {
    pub fn new(actual: f64, target: f64) -> Self {
        Self {
            actual: Some(actual),
            target: Some(target),
            variance_percent: None,
        }
    }

    pub fn precomputed(variance_percent: f64) -> Self {
        Self {
            actual: None,
            target: None,
            variance_percent: Some(variance_percent),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialInputs {
    pub revenue: MetricFigures,
    pub gross_profit: MetricFigures,
    /// `target` holds the overheads budget.
    pub overheads: MetricFigures,
    /// Only read when `net_profit_override` is set; otherwise derived.
    pub net_profit: MetricFigures,
    pub net_profit_override: bool,
    pub wages_actual: Option<f64>,
    pub productivity_benchmark: Option<f64>,
}

/// Self-assessed ratings on a 0-10 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitativeInputs {
    pub customer: Option<f64>,
    pub people: Option<f64>,
    pub operations: Option<f64>,
}

/// One business's monthly submission, as resolved by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub business_id: String,
    pub business_name: String,
    pub month: Month,
    pub financial: FinancialInputs,
    pub qualitative: QualitativeInputs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Financial,
    Productivity,
    Customer,
    People,
    Operations,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Financial,
        Section::Productivity,
        Section::Customer,
        Section::People,
        Section::Operations,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Financial => "Financial",
            Section::Productivity => "Productivity",
            Section::Customer => "Customer",
            Section::People => "People",
            Section::Operations => "Operations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Revenue,
    GrossProfit,
    Overheads,
    NetProfit,
    Productivity,
    CustomerRating,
    PeopleRating,
    OperationsRating,
}

impl Metric {
    pub fn section(self) -> Section {
        match self {
            Metric::Revenue | Metric::GrossProfit | Metric::Overheads | Metric::NetProfit => {
                Section::Financial
            }
            Metric::Productivity => Section::Productivity,
            Metric::CustomerRating => Section::Customer,
            Metric::PeopleRating => Section::People,
            Metric::OperationsRating => Section::Operations,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::GrossProfit => "gross profit",
            Metric::Overheads => "overheads",
            Metric::NetProfit => "net profit",
            Metric::Productivity => "productivity",
            Metric::CustomerRating => "customer rating",
            Metric::PeopleRating => "people rating",
            Metric::OperationsRating => "operations rating",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Integer points per section. Each value is bounded by the rubric maximum
/// for its section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScores {
    pub financial: u32,
    pub productivity: u32,
    pub customer: u32,
    pub people: u32,
    pub operations: u32,
}

impl SectionScores {
    pub fn get(&self, section: Section) -> u32 {
        match section {
            Section::Financial => self.financial,
            Section::Productivity => self.productivity,
            Section::Customer => self.customer,
            Section::People => self.people,
            Section::Operations => self.operations,
        }
    }

    pub fn add(&mut self, section: Section, points: u32) {
        match section {
            Section::Financial => self.financial += points,
            Section::Productivity => self.productivity += points,
            Section::Customer => self.customer += points,
            Section::People => self.people += points,
            Section::Operations => self.operations += points,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, u32)> + '_ {
        Section::ALL.into_iter().map(|s| (s, self.get(s)))
    }
}

/// A scored business-month. RAG band, trend and heatmap bands are never
/// stored here; they are recomputed from `sections`/`total_score` on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub id: Uuid,
    pub business_id: String,
    pub business_name: String,
    pub month: Month,
    pub sections: SectionScores,
    pub total_score: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scorecard {
    pub fn new(
        business_id: String,
        business_name: String,
        month: Month,
        sections: SectionScores,
        total_score: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            business_id,
            business_name,
            month,
            sections,
            total_score,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RagBand {
    Green,
    Amber,
    Red,
}

impl RagBand {
    pub fn label(self) -> &'static str {
        match self {
            RagBand::Green => "green",
            RagBand::Amber => "amber",
            RagBand::Red => "red",
        }
    }
}

impl fmt::Display for RagBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Same,
}

/// Month-over-month movement. `change` is a magnitude; the sign lives in
/// `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendData {
    pub direction: TrendDirection,
    pub change: u32,
}

impl fmt::Display for TrendData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            TrendDirection::Up => write!(f, "+{}", self.change),
            TrendDirection::Down => write!(f, "-{}", self.change),
            TrendDirection::Same => write!(f, "="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapBand {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
    Empty,
}

impl HeatmapBand {
    pub fn label(self) -> &'static str {
        match self {
            HeatmapBand::Excellent => "excellent",
            HeatmapBand::Good => "good",
            HeatmapBand::Fair => "fair",
            HeatmapBand::Poor => "poor",
            HeatmapBand::Critical => "critical",
            HeatmapBand::Empty => "empty",
        }
    }
}

impl fmt::Display for HeatmapBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
