//! Pattern analyzer
//!
//! Weekday multipliers are learned from the historical window. Monthly
//! multipliers are a fixed table (Q4 ramp, summer lull): inferring seasonality
//! would need at least a year of history, which the window rarely covers.

use serde::{Deserialize, Serialize};

use crate::calendar::weekday_index;
use crate::types::UsagePoint;

/// Indexed by month0 (0 = January)
pub const MONTHLY_MULTIPLIERS: [f64; 12] = [
    1.0, 1.0, 1.0, 1.0, 1.0, // Jan - May
    0.9, 0.9, 0.9, // Jun - Aug
    1.0, // Sep
    1.2, 1.3, 1.4, // Oct - Dec
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternProfile {
    /// 0 = Sunday .. 6 = Saturday, mean 1.0 when every weekday is observed
    pub weekday_multipliers: [f64; 7],
    pub monthly_multipliers: [f64; 12],
}

impl PatternProfile {
    pub fn flat() -> Self {
        Self {
            weekday_multipliers: [1.0; 7],
            monthly_multipliers: MONTHLY_MULTIPLIERS,
        }
    }
}

/// Derive a profile from `series`. Day-of-week comes from each point's own
/// timestamp.
pub fn analyze(series: &[UsagePoint]) -> PatternProfile {
    let mut sums = [0.0f64; 7];
    let mut counts = [0usize; 7];
    for point in series {
        let idx = weekday_index(point.timestamp.date_naive());
        sums[idx] += point.value as f64;
        counts[idx] += 1;
    }

    let averages: Vec<(usize, f64)> = (0..7)
        .filter(|&day| counts[day] > 0)
        .map(|day| (day, sums[day] / counts[day] as f64))
        .collect();

    if averages.is_empty() {
        return PatternProfile::flat();
    }

    let overall = averages.iter().map(|(_, avg)| avg).sum::<f64>() / averages.len() as f64;
    if overall <= 0.0 {
        return PatternProfile::flat();
    }

    let mut weekday_multipliers = [1.0; 7];
    for (day, avg) in averages {
        weekday_multipliers[day] = avg / overall;
    }

    PatternProfile {
        weekday_multipliers,
        monthly_multipliers: MONTHLY_MULTIPLIERS,
    }
}
