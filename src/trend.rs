use crate::models::{Month, Scorecard, TrendData, TrendDirection};

/// Compare a composite score with the previous month's.
///
/// `None` for `previous` means there is no prior scorecard, which yields no
/// trend at all rather than a flat one.
pub fn compute_trend(current: u32, previous: Option<u32>) -> Option<TrendData> {
    let previous = previous?;
    let direction = match current.cmp(&previous) {
        std::cmp::Ordering::Greater => TrendDirection::Up,
        std::cmp::Ordering::Less => TrendDirection::Down,
        std::cmp::Ordering::Equal => TrendDirection::Same,
    };
    Some(TrendData {
        direction,
        change: current.abs_diff(previous),
    })
}

/// Trend for `business_id` in `month`, looked up in an already-fetched
/// history. Only the calendar month directly before counts as prior.
pub fn month_over_month(
    history: &[Scorecard],
    business_id: &str,
    month: Month,
) -> Option<TrendData> {
    let current = find(history, business_id, month)?;
    let prior_month = month.previous()?;
    let prior = find(history, business_id, prior_month);
    if prior.is_none() {
        tracing::debug!(business_id, %month, "no scorecard for {prior_month}, trend unavailable");
    }
    compute_trend(current.total_score, prior.map(|p| p.total_score))
}

fn find<'a>(history: &'a [Scorecard], business_id: &str, month: Month) -> Option<&'a Scorecard> {
    history
        .iter()
        .find(|s| s.business_id == business_id && s.month == month)
}
