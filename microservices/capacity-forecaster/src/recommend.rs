//! Capacity recommender and recommendation composer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::growth::GrowthMetrics;
use crate::types::{round_dp, UsageType};

const RAPID_GROWTH_PCT: f64 = 20.0;
const SUSTAINED_GROWTH_PCT: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityIncrease {
    /// Rounded up to the capacity's working increment
    pub increase_amount: f64,
    /// Un-rounded increase relative to current capacity, 1 decimal
    pub increase_percent: f64,
    pub new_capacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityAssessment {
    pub current: f64,
    /// Last observed value against capacity, e.g. `"21.37"`
    pub current_usage_percent: String,
    pub warning_breach_date: Option<DateTime<Utc>>,
    pub critical_breach_date: Option<DateTime<Utc>>,
    /// `None` when the warning threshold is 0 and no headroom target exists
    pub recommended_increase: Option<CapacityIncrease>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Critical,
    Warning,
    Info,
    Optimization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub message: String,
}

impl Recommendation {
    fn new(kind: RecommendationKind, title: &str, message: String) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message,
        }
    }
}

/// Capacity needed to keep the forecast peak at `threshold_warning` of the
/// ceiling. Non-positive capacity or threshold has no defined answer.
pub fn recommend_increase(
    forecast_values: &[u64],
    capacity: f64,
    threshold_warning: f64,
) -> Result<CapacityIncrease> {
    if !capacity.is_finite() || capacity <= 0.0 {
        return Err(ForecastError::ComputationDegenerate(format!(
            "capacity must be positive, got {}",
            capacity
        )));
    }
    if !threshold_warning.is_finite() || threshold_warning <= 0.0 {
        return Err(ForecastError::ComputationDegenerate(format!(
            "warning threshold must be positive, got {}",
            threshold_warning
        )));
    }

    let Some(peak) = forecast_values.iter().copied().max() else {
        return Ok(CapacityIncrease {
            increase_amount: 0.0,
            increase_percent: 0.0,
            new_capacity: capacity,
        });
    };

    let safe_capacity = peak as f64 / threshold_warning;
    let increase_needed = (safe_capacity - capacity).max(0.0);

    let rounding_factor = 10f64.powf(capacity.log10().floor() - 1.0);
    let rounded_increase = (increase_needed / rounding_factor).ceil() * rounding_factor;

    Ok(CapacityIncrease {
        increase_amount: rounded_increase,
        increase_percent: round_dp(increase_needed / capacity * 100.0, 1),
        new_capacity: capacity + rounded_increase,
    })
}

/// Breach advisory first, then growth trends, then one usage-type tip
pub fn compose(
    assessment: &CapacityAssessment,
    metrics: &GrowthMetrics,
    usage_type: &UsageType,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::with_capacity(4);
    let increase_hint = assessment
        .recommended_increase
        .as_ref()
        .filter(|inc| inc.increase_amount > 0.0)
        .map(|inc| {
            format!(
                " Recommended capacity: {:.0} (+{:.0}, {}%).",
                inc.new_capacity, inc.increase_amount, inc.increase_percent
            )
        })
        .unwrap_or_default();

    if let Some(date) = assessment.critical_breach_date {
        recommendations.push(Recommendation::new(
            RecommendationKind::Critical,
            "Critical capacity breach predicted",
            format!(
                "Usage is projected to reach the critical threshold on {}. Increase capacity before then to avoid service degradation.{}",
                date.format("%Y-%m-%d"),
                increase_hint
            ),
        ));
    } else if let Some(date) = assessment.warning_breach_date {
        recommendations.push(Recommendation::new(
            RecommendationKind::Warning,
            "Capacity warning threshold approaching",
            format!(
                "Usage is projected to reach the warning threshold on {}. Plan a capacity increase.{}",
                date.format("%Y-%m-%d"),
                increase_hint
            ),
        ));
    } else {
        recommendations.push(Recommendation::new(
            RecommendationKind::Info,
            "Capacity adequate",
            format!(
                "Current capacity of {:.0} covers the forecast period without reaching the warning threshold.",
                assessment.current
            ),
        ));
    }

    if let Some(pct) = metrics.next_30_days_growth_pct.filter(|&p| p > RAPID_GROWTH_PCT) {
        recommendations.push(Recommendation::new(
            RecommendationKind::Warning,
            "Rapid growth detected",
            format!(
                "Usage is projected to grow {:.2}% over the next 30 days compared with the past 30 days. Review what is driving the increase.",
                pct
            ),
        ));
    }

    if let Some(pct) = metrics.next_90_days_growth_pct.filter(|&p| p > SUSTAINED_GROWTH_PCT) {
        recommendations.push(Recommendation::new(
            RecommendationKind::Info,
            "Sustained growth trend",
            format!(
                "Usage is projected to grow {:.2}% over the next 90 days. Include this trend in long-term capacity planning.",
                pct
            ),
        ));
    }

    recommendations.push(optimization_tip(usage_type));
    recommendations
}

fn optimization_tip(usage_type: &UsageType) -> Recommendation {
    let (title, message) = match usage_type {
        UsageType::DnsQueryUsageSum => (
            "Optimize DNS caching",
            "Raise TTLs on stable records and enable resolver-side caching to cut repeat queries.",
        ),
        UsageType::CdnRequestSum => (
            "Reduce request volume",
            "Set long-lived client cache headers and consolidate small assets to lower request counts.",
        ),
        UsageType::CdnTrafficSum => (
            "Reduce transferred volume",
            "Enable compression for text assets and adaptive bitrate streaming for media to cut traffic.",
        ),
        UsageType::Other(_) => (
            "Review usage patterns",
            "Look for repeated or cacheable workload that can be served closer to clients.",
        ),
    };
    Recommendation::new(RecommendationKind::Optimization, title, message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn assessment() -> CapacityAssessment {
        CapacityAssessment {
            current: 500_000.0,
            current_usage_percent: "20.00".to_string(),
            warning_breach_date: None,
            critical_breach_date: None,
            recommended_increase: None,
        }
    }

    fn metrics(near: Option<f64>, far: Option<f64>) -> GrowthMetrics {
        GrowthMetrics {
            current_value: 100_000,
            past_30_days_avg: 100_000.0,
            next_30_days_avg: Some(100_000.0),
            next_90_days_avg: Some(100_000.0),
            next_30_days_growth_pct: near,
            next_90_days_growth_pct: far,
            next_30_days_peak: Some(100_000),
            next_90_days_peak: Some(100_000),
        }
    }

    #[test]
    fn test_increase_rounds_to_capacity_increment() {
        let inc = recommend_increase(&[300_000, 400_001, 350_000], 500_000.0, 0.7).unwrap();
        // safe = 571 430, needed = 71 430, increment = 10 000
        assert_eq!(inc.increase_amount, 80_000.0);
        assert_eq!(inc.new_capacity, 580_000.0);
        assert_eq!(inc.increase_percent, 14.3);
    }

    #[test]
    fn test_no_increase_when_peak_is_safe() {
        let inc = recommend_increase(&[100_000, 200_000], 500_000.0, 0.7).unwrap();
        assert_eq!(inc.increase_amount, 0.0);
        assert_eq!(inc.increase_percent, 0.0);
        assert_eq!(inc.new_capacity, 500_000.0);
    }

    #[test]
    fn test_empty_forecast_needs_nothing() {
        let inc = recommend_increase(&[], 2_000_000.0, 0.7).unwrap();
        assert_eq!(inc.increase_amount, 0.0);
        assert_eq!(inc.new_capacity, 2_000_000.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(matches!(
            recommend_increase(&[1], 0.0, 0.7),
            Err(ForecastError::ComputationDegenerate(_))
        ));
        assert!(matches!(
            recommend_increase(&[1], -5.0, 0.7),
            Err(ForecastError::ComputationDegenerate(_))
        ));
        assert!(matches!(
            recommend_increase(&[1], 500_000.0, 0.0),
            Err(ForecastError::ComputationDegenerate(_))
        ));
    }

    #[test]
    fn test_adequate_capacity_gets_info_and_tip() {
        let recs = compose(&assessment(), &metrics(Some(5.0), Some(10.0)), &UsageType::DnsQueryUsageSum);
        let kinds: Vec<_> = recs.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RecommendationKind::Info, RecommendationKind::Optimization]);
        assert_eq!(recs[1].title, "Optimize DNS caching");
    }

    #[test]
    fn test_critical_breach_takes_priority() {
        let date = Utc.with_ymd_and_hms(2024, 9, 3, 0, 0, 0).unwrap();
        let mut a = assessment();
        a.warning_breach_date = Some(date);
        a.critical_breach_date = Some(date);
        a.recommended_increase = Some(CapacityIncrease {
            increase_amount: 80_000.0,
            increase_percent: 14.3,
            new_capacity: 580_000.0,
        });

        let recs = compose(&a, &metrics(Some(25.0), Some(60.0)), &UsageType::CdnTrafficSum);
        let kinds: Vec<_> = recs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::Critical,
                RecommendationKind::Warning,
                RecommendationKind::Info,
                RecommendationKind::Optimization,
            ]
        );
        assert!(recs[0].message.contains("2024-09-03"));
        assert!(recs[0].message.contains("580000"));
        assert_eq!(recs[3].title, "Reduce transferred volume");
    }

    #[test]
    fn test_warning_breach_without_critical() {
        let mut a = assessment();
        a.warning_breach_date = Some(Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap());
        let recs = compose(&a, &metrics(None, None), &UsageType::CdnRequestSum);
        assert_eq!(recs[0].kind, RecommendationKind::Warning);
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_growth_thresholds_are_strict() {
        let recs = compose(&assessment(), &metrics(Some(20.0), Some(50.0)), &UsageType::Other("x".into()));
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1].title, "Review usage patterns");
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let rec = optimization_tip(&UsageType::DnsQueryUsageSum);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "optimization");
    }
}
