use proptest::prelude::*;
use scorecard::config::DEFAULT_RUBRIC;
use scorecard::variance::{Polarity, variance_percent};
use scorecard::{
    FinancialInputs, HeatmapBand, MetricFigures, QualitativeInputs, RagBand, Section,
    SectionScores, TrendDirection, classify_rag, compute_section_scores, compute_total,
    compute_trend, heatmap_band,
};

fn figures() -> impl Strategy<Value = MetricFigures> {
    (
        proptest::option::of(0.0f64..1_000_000.0),
        proptest::option::of(0.0f64..1_000_000.0),
    )
        .prop_map(|(actual, target)| MetricFigures {
            actual,
            target,
            variance_percent: None,
        })
}

fn financial_inputs() -> impl Strategy<Value = FinancialInputs> {
    (
        figures(),
        figures(),
        figures(),
        proptest::option::of(0.0f64..100_000.0),
        proptest::option::of(0.0f64..=20.0),
    )
        .prop_map(
            |(revenue, gross_profit, overheads, wages_actual, productivity_benchmark)| {
                FinancialInputs {
                    revenue,
                    gross_profit,
                    overheads,
                    net_profit: MetricFigures::default(),
                    net_profit_override: false,
                    wages_actual,
                    productivity_benchmark,
                }
            },
        )
}

fn qualitative_inputs() -> impl Strategy<Value = QualitativeInputs> {
    (
        proptest::option::of(0.0f64..=10.0),
        proptest::option::of(0.0f64..=10.0),
        proptest::option::of(0.0f64..=10.0),
    )
        .prop_map(|(customer, people, operations)| QualitativeInputs {
            customer,
            people,
            operations,
        })
}

proptest! {
    #[test]
    fn rag_partitions_every_total(total in 0u32..=100) {
        let rag = classify_rag(total).unwrap();
        let expected = if total >= 75 {
            RagBand::Green
        } else if total >= 60 {
            RagBand::Amber
        } else {
            RagBand::Red
        };
        prop_assert_eq!(rag, expected);
    }

    #[test]
    fn total_is_exact_sum_of_sections(
        financial in 0u32..=40,
        productivity in 0u32..=15,
        customer in 0u32..=15,
        people in 0u32..=15,
        operations in 0u32..=15,
    ) {
        let sections = SectionScores { financial, productivity, customer, people, operations };
        prop_assert_eq!(
            compute_total(&sections),
            financial + productivity + customer + people + operations
        );
    }

    #[test]
    fn section_scores_stay_within_maxima(
        financial in financial_inputs(),
        qualitative in qualitative_inputs(),
    ) {
        let sections = compute_section_scores(&financial, &qualitative, &DEFAULT_RUBRIC).unwrap();
        for section in Section::ALL {
            prop_assert!(sections.get(section) <= DEFAULT_RUBRIC.section_max(section));
        }
        prop_assert!(compute_total(&sections) <= 100);
    }

    #[test]
    fn scoring_is_idempotent(
        financial in financial_inputs(),
        qualitative in qualitative_inputs(),
    ) {
        let first = compute_section_scores(&financial, &qualitative, &DEFAULT_RUBRIC);
        let second = compute_section_scores(&financial, &qualitative, &DEFAULT_RUBRIC);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn derived_values_are_idempotent(
        total in 0u32..=120,
        previous in proptest::option::of(0u32..=100),
        score in -10i32..=60,
        max_score in -5i32..=50,
    ) {
        prop_assert_eq!(classify_rag(total), classify_rag(total));
        prop_assert_eq!(compute_trend(total, previous), compute_trend(total, previous));
        prop_assert_eq!(compute_trend(total, None), None);
        prop_assert_eq!(heatmap_band(score, max_score), heatmap_band(score, max_score));
    }

    #[test]
    fn variance_is_always_bounded(
        actual in -1_000_000.0f64..1_000_000.0,
        target in -1_000_000.0f64..1_000_000.0,
    ) {
        for polarity in [Polarity::HigherIsBetter, Polarity::LowerIsBetter] {
            let v = variance_percent(actual, target, polarity);
            prop_assert!(v.is_finite());
            prop_assert!((-100.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn trend_change_is_magnitude(current in 0u32..=100, previous in 0u32..=100) {
        let trend = compute_trend(current, Some(previous)).unwrap();
        prop_assert_eq!(trend.change, current.abs_diff(previous));
        let expected = match current.cmp(&previous) {
            std::cmp::Ordering::Greater => TrendDirection::Up,
            std::cmp::Ordering::Less => TrendDirection::Down,
            std::cmp::Ordering::Equal => TrendDirection::Same,
        };
        prop_assert_eq!(trend.direction, expected);
    }

    #[test]
    fn zero_max_is_always_empty(score in 0i32..1000) {
        prop_assert_eq!(heatmap_band(score, 0).unwrap(), HeatmapBand::Empty);
    }
}
