//! Financial variance normalization.
//!
//! Turns actual vs target/budget figures into a percentage variance bounded
//! to [-100, 100]. Positive always means "better than planned": above target
//! for revenue and profit lines, under budget for overheads.

use crate::errors::{EngineError, EngineResult};
use crate::models::{FinancialInputs, Metric, MetricFigures};

pub const VARIANCE_LIMIT: f64 = 100.0;
pub const MAX_PRODUCTIVITY_BENCHMARK: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

impl Polarity {
    pub fn of(metric: Metric) -> Polarity {
        match metric {
            Metric::Overheads => Polarity::LowerIsBetter,
            _ => Polarity::HigherIsBetter,
        }
    }
}

/// Percentage variance of `actual` against `target`, clamped to ±100.
///
/// A zero target never divides: equal-to-zero actuals give 0, anything else
/// lands on the clamp boundary in the direction it deviates. The divisor is
/// `|target|` so a negative net-profit target still reads "smaller loss is
/// better".
pub fn variance_percent(actual: f64, target: f64, polarity: Polarity) -> f64 {
    let delta = match polarity {
        Polarity::HigherIsBetter => actual - target,
        Polarity::LowerIsBetter => target - actual,
    };
    if target == 0.0 {
        return if delta > 0.0 {
            VARIANCE_LIMIT
        } else if delta < 0.0 {
            -VARIANCE_LIMIT
        } else {
            0.0
        };
    }
    (delta / target.abs() * 100.0).clamp(-VARIANCE_LIMIT, VARIANCE_LIMIT)
}

/// Normalize one metric's figures. `Ok(None)` means the pair was not supplied.
pub fn normalize(metric: Metric, figures: &MetricFigures) -> EngineResult<Option<f64>> {
    if let Some(value) = figures.variance_percent {
        return validate_precomputed(metric, value).map(Some);
    }
    let (Some(actual), Some(target)) = (figures.actual, figures.target) else {
        tracing::debug!(%metric, "actual/target pair incomplete, variance absent");
        return Ok(None);
    };
    check_finite(metric, "actual", actual)?;
    check_finite(metric, "target", target)?;
    // net profit is the only line allowed to go negative
    if metric != Metric::NetProfit {
        check_non_negative(&format!("{metric} actual"), actual)?;
        check_non_negative(&format!("{metric} target"), target)?;
    }
    Ok(Some(variance_percent(actual, target, Polarity::of(metric))))
}

fn validate_precomputed(metric: Metric, value: f64) -> EngineResult<f64> {
    check_finite(metric, "variance", value)?;
    if !(-VARIANCE_LIMIT..=VARIANCE_LIMIT).contains(&value) {
        return Err(EngineError::VarianceOutOfRange {
            metric: metric.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Net-profit figures that feed normalization.
///
/// Without an override, net profit is derived as gross profit minus
/// overheads on both the actual and the target/budget side.
pub fn resolve_net_profit(inputs: &FinancialInputs) -> MetricFigures {
    if inputs.net_profit_override {
        return inputs.net_profit;
    }
    let gp = &inputs.gross_profit;
    let oh = &inputs.overheads;
    MetricFigures {
        actual: gp.actual.zip(oh.actual).map(|(g, o)| g - o),
        target: gp.target.zip(oh.target).map(|(g, o)| g - o),
        variance_percent: None,
    }
}

/// Variance of gross profit per unit of wages against the benchmark ratio.
pub fn productivity_variance(inputs: &FinancialInputs) -> EngineResult<Option<f64>> {
    let Some(benchmark) = inputs.productivity_benchmark else {
        return Ok(None);
    };
    check_finite(Metric::Productivity, "benchmark", benchmark)?;
    if !(0.0..=MAX_PRODUCTIVITY_BENCHMARK).contains(&benchmark) {
        return Err(EngineError::BenchmarkOutOfRange(benchmark));
    }
    let (Some(gross_profit), Some(wages)) = (inputs.gross_profit.actual, inputs.wages_actual)
    else {
        return Ok(None);
    };
    check_finite(Metric::Productivity, "wages", wages)?;
    check_finite(Metric::Productivity, "gross profit", gross_profit)?;
    check_non_negative("wages", wages)?;
    check_non_negative("gross profit actual", gross_profit)?;
    if wages == 0.0 {
        tracing::debug!("wages are zero, productivity ratio undefined");
        return Ok(None);
    }
    let ratio = gross_profit / wages;
    Ok(Some(variance_percent(
        ratio,
        benchmark,
        Polarity::HigherIsBetter,
    )))
}

pub(crate) fn check_finite(metric: Metric, what: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::NonFinite(format!("{metric} {what}")))
    }
}

fn check_non_negative(field: &str, value: f64) -> EngineResult<()> {
    if value < 0.0 {
        return Err(EngineError::NegativeAmount {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn standard_metric_below_target_is_negative() {
        let v = variance_percent(90.0, 100.0, Polarity::HigherIsBetter);
        assert!(close(v, -10.0));
    }

    #[test]
    fn overheads_under_budget_is_positive() {
        let figures = MetricFigures::new(90.0, 100.0);
        let v = normalize(Metric::Overheads, &figures).unwrap().unwrap();
        assert!(close(v, 10.0));
    }

    #[test]
    fn variance_is_clamped() {
        assert_eq!(variance_percent(500.0, 100.0, Polarity::HigherIsBetter), 100.0);
        assert_eq!(variance_percent(350.0, 100.0, Polarity::LowerIsBetter), -100.0);
    }

    #[test]
    fn zero_target_never_divides() {
        assert_eq!(variance_percent(0.0, 0.0, Polarity::HigherIsBetter), 0.0);
        assert_eq!(variance_percent(5.0, 0.0, Polarity::HigherIsBetter), 100.0);
        assert_eq!(variance_percent(-5.0, 0.0, Polarity::HigherIsBetter), -100.0);
        assert_eq!(variance_percent(5.0, 0.0, Polarity::LowerIsBetter), -100.0);
        assert_eq!(variance_percent(0.0, 0.0, Polarity::LowerIsBetter), 0.0);
    }

    #[test]
    fn smaller_loss_than_planned_is_positive() {
        let v = variance_percent(-5.0, -10.0, Polarity::HigherIsBetter);
        assert!(close(v, 50.0));
    }

    #[test]
    fn incomplete_pair_is_absent() {
        let figures = MetricFigures {
            actual: Some(10.0),
            target: None,
            variance_percent: None,
        };
        assert_eq!(normalize(Metric::Revenue, &figures), Ok(None));
        assert_eq!(normalize(Metric::Revenue, &MetricFigures::default()), Ok(None));
    }

    #[test]
    fn precomputed_variance_out_of_range_is_rejected() {
        let figures = MetricFigures::precomputed(120.0);
        assert!(matches!(
            normalize(Metric::Revenue, &figures),
            Err(EngineError::VarianceOutOfRange { .. })
        ));
        let ok = MetricFigures::precomputed(-100.0);
        assert_eq!(normalize(Metric::Revenue, &ok), Ok(Some(-100.0)));
    }

    #[test]
    fn negative_revenue_is_rejected_but_negative_net_profit_is_not() {
        let negative = MetricFigures::new(-1.0, 10.0);
        assert!(matches!(
            normalize(Metric::Revenue, &negative),
            Err(EngineError::NegativeAmount { .. })
        ));
        assert!(normalize(Metric::NetProfit, &negative).unwrap().is_some());
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let figures = MetricFigures::new(f64::NAN, 10.0);
        assert!(matches!(
            normalize(Metric::GrossProfit, &figures),
            Err(EngineError::NonFinite(_))
        ));
    }

    #[test]
    fn net_profit_is_derived_without_override() {
        let inputs = FinancialInputs {
            gross_profit: MetricFigures::new(50.0, 60.0),
            overheads: MetricFigures::new(30.0, 25.0),
            net_profit: MetricFigures::new(999.0, 1.0),
            ..Default::default()
        };
        let net = resolve_net_profit(&inputs);
        assert_eq!(net.actual, Some(20.0));
        assert_eq!(net.target, Some(35.0));
        let v = normalize(Metric::NetProfit, &net).unwrap().unwrap();
        assert!(close(v, -42.9));
    }

    #[test]
    fn net_profit_override_uses_supplied_figures() {
        let inputs = FinancialInputs {
            gross_profit: MetricFigures::new(50.0, 60.0),
            overheads: MetricFigures::new(30.0, 25.0),
            net_profit: MetricFigures::new(40.0, 40.0),
            net_profit_override: true,
            ..Default::default()
        };
        assert_eq!(resolve_net_profit(&inputs), MetricFigures::new(40.0, 40.0));
    }

    #[test]
    fn productivity_compares_ratio_to_benchmark() {
        let inputs = FinancialInputs {
            gross_profit: MetricFigures::new(300.0, 300.0),
            wages_actual: Some(100.0),
            productivity_benchmark: Some(2.5),
            ..Default::default()
        };
        let v = productivity_variance(&inputs).unwrap().unwrap();
        assert!(close(v, 20.0));
    }

    #[test]
    fn productivity_with_zero_wages_is_absent() {
        let inputs = FinancialInputs {
            gross_profit: MetricFigures::new(300.0, 300.0),
            wages_actual: Some(0.0),
            productivity_benchmark: Some(2.5),
            ..Default::default()
        };
        assert_eq!(productivity_variance(&inputs), Ok(None));
    }

    #[test]
    fn productivity_benchmark_out_of_range_is_rejected() {
        let inputs = FinancialInputs {
            productivity_benchmark: Some(25.0),
            ..Default::default()
        };
        assert_eq!(
            productivity_variance(&inputs),
            Err(EngineError::BenchmarkOutOfRange(25.0))
        );
    }
}
