//! Growth metrics around the "now" boundary of a timeline

use serde::{Deserialize, Serialize};

use crate::types::round_dp;

const PAST_WINDOW: usize = 30;
const NEAR_WINDOW: usize = 30;
const FAR_WINDOW: usize = 90;

/// Forward-window fields are `None` when the window is empty; growth
/// percentages are `None` when the past average is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    pub current_value: u64,
    pub past_30_days_avg: f64,
    pub next_30_days_avg: Option<f64>,
    pub next_90_days_avg: Option<f64>,
    pub next_30_days_growth_pct: Option<f64>,
    pub next_90_days_growth_pct: Option<f64>,
    pub next_30_days_peak: Option<u64>,
    pub next_90_days_peak: Option<u64>,
}

impl GrowthMetrics {
    /// `values` is the full timeline; the last historical index is
    /// `historical_days - 1`
    pub fn compute(values: &[u64], historical_days: usize) -> Self {
        if values.is_empty() || historical_days == 0 {
            return Self::empty();
        }
        let now = (historical_days - 1).min(values.len() - 1);

        let past = &values[now.saturating_sub(PAST_WINDOW)..=now];
        let past_avg = mean(past).unwrap_or(0.0);

        let near = forward_window(values, now, NEAR_WINDOW);
        let far = forward_window(values, now, FAR_WINDOW);

        let next_30_days_avg = mean(near);
        let next_90_days_avg = mean(far);

        Self {
            current_value: values[now],
            past_30_days_avg: past_avg,
            next_30_days_avg,
            next_90_days_avg,
            next_30_days_growth_pct: growth_pct(next_30_days_avg, past_avg),
            next_90_days_growth_pct: growth_pct(next_90_days_avg, past_avg),
            next_30_days_peak: near.iter().copied().max(),
            next_90_days_peak: far.iter().copied().max(),
        }
    }

    fn empty() -> Self {
        Self {
            current_value: 0,
            past_30_days_avg: 0.0,
            next_30_days_avg: None,
            next_90_days_avg: None,
            next_30_days_growth_pct: None,
            next_90_days_growth_pct: None,
            next_30_days_peak: None,
            next_90_days_peak: None,
        }
    }
}

/// `(now, min(last, now + window)]`
fn forward_window(values: &[u64], now: usize, window: usize) -> &[u64] {
    let end = (now + window).min(values.len() - 1);
    if end > now {
        &values[now + 1..=end]
    } else {
        &[]
    }
}

fn mean(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
}

/// `(next / past - 1) * 100`, 2 decimals
fn growth_pct(next_avg: Option<f64>, past_avg: f64) -> Option<f64> {
    if past_avg <= 0.0 {
        return None;
    }
    next_avg.map(|next| round_dp((next / past_avg - 1.0) * 100.0, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_around_now() {
        // 40 historical days of 100, then 100 forecast days of 150
        let mut values = vec![100u64; 40];
        values.extend(vec![150u64; 100]);

        let metrics = GrowthMetrics::compute(&values, 40);
        assert_eq!(metrics.current_value, 100);
        assert_eq!(metrics.past_30_days_avg, 100.0);
        assert_eq!(metrics.next_30_days_avg, Some(150.0));
        assert_eq!(metrics.next_90_days_avg, Some(150.0));
        assert_eq!(metrics.next_30_days_growth_pct, Some(50.0));
        assert_eq!(metrics.next_90_days_peak, Some(150));
    }

    #[test]
    fn test_past_window_is_inclusive_of_now() {
        // now_index = 31, window [1, 31] includes 31 values
        let mut values: Vec<u64> = vec![0];
        values.extend(vec![10u64; 30]);
        values.push(41);
        let metrics = GrowthMetrics::compute(&values, 32);
        assert!((metrics.past_30_days_avg - (300.0 + 41.0) / 31.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_forward_window_is_truncated() {
        let values = vec![100, 100, 120, 80, 200];
        let metrics = GrowthMetrics::compute(&values, 2);
        assert_eq!(metrics.next_30_days_avg, Some((120.0 + 80.0 + 200.0) / 3.0));
        assert_eq!(metrics.next_30_days_peak, Some(200));
        assert_eq!(metrics.next_90_days_peak, Some(200));
    }

    #[test]
    fn test_no_forecast_segment() {
        let metrics = GrowthMetrics::compute(&[5, 6, 7], 3);
        assert_eq!(metrics.current_value, 7);
        assert_eq!(metrics.next_30_days_avg, None);
        assert_eq!(metrics.next_30_days_growth_pct, None);
        assert_eq!(metrics.next_90_days_peak, None);
    }

    #[test]
    fn test_zero_past_average_has_no_growth_pct() {
        let metrics = GrowthMetrics::compute(&[0, 0, 10, 20], 2);
        assert_eq!(metrics.past_30_days_avg, 0.0);
        assert_eq!(metrics.next_30_days_avg, Some(15.0));
        assert_eq!(metrics.next_30_days_growth_pct, None);
        assert_eq!(metrics.next_90_days_growth_pct, None);
    }

    #[test]
    fn test_growth_pct_rounding() {
        assert_eq!(growth_pct(Some(1.0 / 3.0), 1.0), Some(-66.67));
    }
}
