//! Forecast generator
//!
//! Extends the historical window forward from its last observed value using
//! the linear trend, the learned weekday pattern and the monthly table. Bounds
//! widen linearly with distance and narrow as the confidence interval
//! approaches 1.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{label, utc_midnight, weekday_index};
use crate::capacity::capacity_for;
use crate::error::{ForecastError, Result};
use crate::pattern::{analyze, PatternProfile};
use crate::synthesizer::UsageHistory;
use crate::types::{ForecastParams, UsagePoint};

/// Forward segment of a forecast
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Dated `today + j`
    pub points: Vec<UsagePoint>,
    pub confidence_lower: Vec<u64>,
    pub confidence_upper: Vec<u64>,
}

impl Projection {
    pub fn values(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Historical and forecast segments as parallel arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    /// `None` across the historical segment
    pub confidence_lower: Vec<Option<u64>>,
    pub confidence_upper: Vec<Option<u64>>,
    pub threshold_warning: Vec<f64>,
    pub threshold_critical: Vec<f64>,
    pub historical_end_index: usize,
}

impl Timeline {
    pub fn assemble(
        history: &[UsagePoint],
        projection: &Projection,
        capacity: f64,
        params: &ForecastParams,
    ) -> Self {
        let total = history.len() + projection.points.len();
        let points = history.iter().chain(projection.points.iter());

        let mut confidence_lower = vec![None; history.len()];
        confidence_lower.extend(projection.confidence_lower.iter().copied().map(Some));
        let mut confidence_upper = vec![None; history.len()];
        confidence_upper.extend(projection.confidence_upper.iter().copied().map(Some));

        Self {
            labels: points.clone().map(|p| label(p.timestamp.date_naive())).collect(),
            values: points.map(|p| p.value).collect(),
            confidence_lower,
            confidence_upper,
            threshold_warning: vec![capacity * params.threshold_warning; total],
            threshold_critical: vec![capacity * params.threshold_critical; total],
            historical_end_index: history.len().saturating_sub(1),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn forecast_values(&self) -> &[u64] {
        self.values.get(self.historical_end_index + 1..).unwrap_or(&[])
    }
}

/// Everything one forecast call derives
#[derive(Debug, Clone)]
pub struct Forecast {
    pub history: Vec<UsagePoint>,
    pub profile: PatternProfile,
    pub projection: Projection,
    pub timeline: Timeline,
}

/// Relative half-width of the bounds at forward offset `j`
pub fn variance_factor(confidence_interval: f64, j: u32, forecast_days: u32) -> f64 {
    if forecast_days == 0 {
        return 0.0;
    }
    (1.0 - confidence_interval) * (f64::from(j + 1) / f64::from(forecast_days)) * 0.5
}

/// Project `params.forecast_days` days forward from `anchor`, starting today
pub fn project(
    params: &ForecastParams,
    anchor: u64,
    profile: &PatternProfile,
    today: NaiveDate,
) -> Projection {
    let days = params.forecast_days as usize;
    let mut projection = Projection {
        points: Vec::with_capacity(days),
        confidence_lower: Vec::with_capacity(days),
        confidence_upper: Vec::with_capacity(days),
    };

    for j in 0..params.forecast_days {
        let date = today + Duration::days(i64::from(j));
        let trend = 1.0 + (params.growth_rate / 30.0) * f64::from(j);
        let week_mult = profile.weekday_multipliers[weekday_index(date)];
        let season_mult = if params.include_seasonality {
            profile.monthly_multipliers[date.month0() as usize]
        } else {
            1.0
        };

        let value = (anchor as f64 * trend * week_mult * season_mult).max(0.0).floor();
        let spread = variance_factor(params.confidence_interval, j, params.forecast_days);

        projection.points.push(UsagePoint {
            timestamp: utc_midnight(date),
            value: value as u64,
        });
        projection.confidence_lower.push((value * (1.0 - spread)).max(0.0).floor() as u64);
        projection.confidence_upper.push((value * (1.0 + spread)).floor() as u64);
    }

    projection
}

/// Build the history, derive its profile and extend it forward
pub fn forecast<H>(params: &ForecastParams, today: NaiveDate, source: &mut H) -> Result<Forecast>
where
    H: UsageHistory + ?Sized,
{
    params.validate()?;

    let history = source.history(
        &params.usage_type,
        params.historical_days,
        params.growth_rate,
        params.include_seasonality,
        today,
    );
    if history.len() != params.historical_days as usize {
        return Err(ForecastError::ComputationDegenerate(format!(
            "history source returned {} points, expected {}",
            history.len(),
            params.historical_days
        )));
    }
    let anchor = history
        .last()
        .map(|p| p.value)
        .ok_or_else(|| ForecastError::InvalidParameter("historical window is empty".to_string()))?;

    let profile = analyze(&history);
    debug!(
        usage_type = %params.usage_type,
        anchor,
        weekday_multipliers = ?profile.weekday_multipliers,
        "Pattern profile derived"
    );

    let projection = project(params, anchor, &profile, today);
    let timeline = Timeline::assemble(&history, &projection, capacity_for(&params.usage_type), params);

    Ok(Forecast {
        history,
        profile,
        projection,
        timeline,
    })
}
