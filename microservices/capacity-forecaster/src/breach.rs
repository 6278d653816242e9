//! Breach detector

use chrono::{DateTime, Utc};

use crate::types::UsagePoint;

/// First point at or above `threshold`. Forecast values oscillate with the
/// weekday and monthly multipliers, so this is a forward scan.
pub fn first_breach(points: &[UsagePoint], threshold: f64) -> Option<DateTime<Utc>> {
    points
        .iter()
        .find(|point| point.value as f64 >= threshold)
        .map(|point| point.timestamp)
}
