//! Series synthesizer
//!
//! Produces the historical usage window a forecast is built on. Values follow
//! the usage type's typical load, shaped by a linear trend, a weekday/weekend
//! split, optional seasonality and bounded multiplicative noise.

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use crate::calendar::{days_in_month, is_weekend, utc_midnight};
use crate::capacity::base_value;
use crate::types::{UsagePoint, UsageType};

const WEEKEND_FACTOR: f64 = 0.6;
const WEEKDAY_FACTOR: f64 = 1.1;
const NOISE_MIN: f64 = 0.9;
const NOISE_MAX: f64 = 1.1;

/// Source of the historical window for a usage type
pub trait UsageHistory {
    /// `days` daily points ending the day before `today`, oldest first
    fn history(
        &mut self,
        usage_type: &UsageType,
        days: u32,
        growth_rate: f64,
        include_seasonality: bool,
        today: NaiveDate,
    ) -> Vec<UsagePoint>;
}

/// Synthesizes usage history. Owns its generator, so one instance per call.
pub struct SeriesSynthesizer<R> {
    rng: Option<R>,
}

impl<R: Rng> SeriesSynthesizer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng: Some(rng) }
    }

    pub fn synthesize(
        &mut self,
        usage_type: &UsageType,
        days: u32,
        growth_rate: f64,
        include_seasonality: bool,
        today: NaiveDate,
    ) -> Vec<UsagePoint> {
        let base = base_value(usage_type);
        let start = today - Duration::days(i64::from(days));

        (0..days)
            .map(|i| {
                let date = start + Duration::days(i64::from(i));
                let trend = 1.0 + (growth_rate / 30.0) * f64::from(i);
                let day_factor = if is_weekend(date) { WEEKEND_FACTOR } else { WEEKDAY_FACTOR };
                let seasonal_factor = if include_seasonality {
                    seasonal_factor(date)
                } else {
                    1.0
                };
                let noise = match self.rng.as_mut() {
                    Some(rng) => rng.gen_range(NOISE_MIN..=NOISE_MAX),
                    None => 1.0,
                };

                let raw = base * trend * day_factor * seasonal_factor * noise;
                UsagePoint {
                    timestamp: utc_midnight(date),
                    value: raw.max(0.0).floor() as u64,
                }
            })
            .collect()
    }
}

impl SeriesSynthesizer<StdRng> {
    /// Reproducible noise
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Noise factor pinned to 1.0
    pub fn noiseless() -> Self {
        Self { rng: None }
    }
}

impl<R: Rng> UsageHistory for SeriesSynthesizer<R> {
    fn history(
        &mut self,
        usage_type: &UsageType,
        days: u32,
        growth_rate: f64,
        include_seasonality: bool,
        today: NaiveDate,
    ) -> Vec<UsagePoint> {
        self.synthesize(usage_type, days, growth_rate, include_seasonality, today)
    }
}

/// Monthly-progress dip combined with a yearly swell
fn seasonal_factor(date: NaiveDate) -> f64 {
    let month_progress = f64::from(date.day()) / f64::from(days_in_month(date));
    let monthly = 1.0 - 0.1 * (2.0 * PI * month_progress).sin();
    let yearly = 1.0 + 0.2 * (2.0 * PI * f64::from(date.month0()) / 12.0 + PI / 2.0).sin();
    monthly * yearly
}
