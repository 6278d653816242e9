//! Forecasting types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ForecastError, Result};
use crate::forecast::Timeline;
use crate::growth::GrowthMetrics;
use crate::recommend::{CapacityAssessment, Recommendation};

pub const DEFAULT_HISTORICAL_DAYS: u32 = 90;
pub const DEFAULT_FORECAST_DAYS: u32 = 90;
pub const DEFAULT_GROWTH_RATE: f64 = 0.05;
pub const DEFAULT_CONFIDENCE_INTERVAL: f64 = 0.95;
pub const DEFAULT_THRESHOLD_WARNING: f64 = 0.7;
pub const DEFAULT_THRESHOLD_CRITICAL: f64 = 0.9;

/// Upper bound on either window, in days
pub const MAX_WINDOW_DAYS: u32 = 3650;
pub const MAX_CONFIDENCE_INTERVAL: f64 = 0.99;

/// Category of metered activity, carried on the wire as its tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UsageType {
    DnsQueryUsageSum,
    CdnRequestSum,
    CdnTrafficSum,
    /// Unrecognised tag; only produced when strict validation is off
    Other(String),
}

impl UsageType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::DnsQueryUsageSum => "dns_query_usage_sum",
            Self::CdnRequestSum => "cdn_request_sum",
            Self::CdnTrafficSum => "cdn_traffic_sum",
            Self::Other(tag) => tag,
        }
    }

    /// Resolve a wire tag. With `strict`, unknown tags are rejected instead of
    /// falling back to the default capacity and base load.
    pub fn parse(tag: &str, strict: bool) -> Result<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ForecastError::InvalidParameter("usage_type is empty".to_string()));
        }
        match Self::from(tag.to_string()) {
            Self::Other(tag) if strict => Err(ForecastError::InvalidParameter(format!(
                "unknown usage_type: {}",
                tag
            ))),
            usage_type => Ok(usage_type),
        }
    }
}

impl From<String> for UsageType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "dns_query_usage_sum" => Self::DnsQueryUsageSum,
            "cdn_request_sum" => Self::CdnRequestSum,
            "cdn_traffic_sum" => Self::CdnTrafficSum,
            _ => Self::Other(tag),
        }
    }
}

impl From<UsageType> for String {
    fn from(usage_type: UsageType) -> Self {
        usage_type.as_str().to_string()
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of usage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsagePoint {
    pub timestamp: DateTime<Utc>,
    pub value: u64,
}

/// Forecast request as received from callers
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForecastRequest {
    #[validate(length(min = 1, max = 128))]
    pub org_id: String,

    pub usage_type: String,

    #[validate(range(min = 1, max = 3650))]
    pub historical_days: Option<u32>,

    #[validate(range(max = 3650))]
    pub forecast_days: Option<u32>,

    /// Monthly growth fraction
    #[validate(range(min = -30.0, max = 30.0))]
    pub growth_rate: Option<f64>,

    pub include_seasonality: Option<bool>,

    #[validate(range(min = 0.0, max = 0.99))]
    pub confidence_interval: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold_warning: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold_critical: Option<f64>,
}

impl ForecastRequest {
    pub fn new(org_id: impl Into<String>, usage_type: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            usage_type: usage_type.into(),
            historical_days: None,
            forecast_days: None,
            growth_rate: None,
            include_seasonality: None,
            confidence_interval: None,
            threshold_warning: None,
            threshold_critical: None,
        }
    }

    /// Validate and fill in defaults
    pub fn to_params(&self, strict_usage_types: bool) -> Result<ForecastParams> {
        self.validate()?;
        if self.org_id.trim().is_empty() {
            return Err(ForecastError::InvalidParameter("org_id is blank".to_string()));
        }

        let params = ForecastParams {
            usage_type: UsageType::parse(&self.usage_type, strict_usage_types)?,
            historical_days: self.historical_days.unwrap_or(DEFAULT_HISTORICAL_DAYS),
            forecast_days: self.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS),
            growth_rate: self.growth_rate.unwrap_or(DEFAULT_GROWTH_RATE),
            include_seasonality: self.include_seasonality.unwrap_or(true),
            confidence_interval: self.confidence_interval.unwrap_or(DEFAULT_CONFIDENCE_INTERVAL),
            threshold_warning: self.threshold_warning.unwrap_or(DEFAULT_THRESHOLD_WARNING),
            threshold_critical: self.threshold_critical.unwrap_or(DEFAULT_THRESHOLD_CRITICAL),
        };
        params.validate()?;
        Ok(params)
    }
}

/// Resolved forecast parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    pub usage_type: UsageType,
    pub historical_days: u32,
    pub forecast_days: u32,
    pub growth_rate: f64,
    pub include_seasonality: bool,
    pub confidence_interval: f64,
    pub threshold_warning: f64,
    pub threshold_critical: f64,
}

impl ForecastParams {
    pub fn new(usage_type: UsageType) -> Self {
        Self {
            usage_type,
            historical_days: DEFAULT_HISTORICAL_DAYS,
            forecast_days: DEFAULT_FORECAST_DAYS,
            growth_rate: DEFAULT_GROWTH_RATE,
            include_seasonality: true,
            confidence_interval: DEFAULT_CONFIDENCE_INTERVAL,
            threshold_warning: DEFAULT_THRESHOLD_WARNING,
            threshold_critical: DEFAULT_THRESHOLD_CRITICAL,
        }
    }

    /// Engine-level checks, applied however the parameters were built
    pub fn validate(&self) -> Result<()> {
        if self.historical_days < 1 {
            return Err(ForecastError::InvalidParameter(
                "historical_days must be at least 1".to_string(),
            ));
        }
        if self.historical_days > MAX_WINDOW_DAYS || self.forecast_days > MAX_WINDOW_DAYS {
            return Err(ForecastError::InvalidParameter(format!(
                "windows are limited to {} days",
                MAX_WINDOW_DAYS
            )));
        }
        if !(0.0..=MAX_CONFIDENCE_INTERVAL).contains(&self.confidence_interval) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence_interval must lie in [0, {}], got {}",
                MAX_CONFIDENCE_INTERVAL, self.confidence_interval
            )));
        }
        for (name, value) in [
            ("threshold_warning", self.threshold_warning),
            ("threshold_critical", self.threshold_critical),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !self.growth_rate.is_finite() {
            return Err(ForecastError::InvalidParameter("growth_rate must be finite".to_string()));
        }
        Ok(())
    }
}

/// Echo of the request, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub org_id: String,
    pub usage_type: UsageType,
    pub historical_days: u32,
    pub forecast_days: u32,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub timeline: Timeline,
    pub capacity: CapacityAssessment,
    pub growth_metrics: GrowthMetrics,
    pub recommendations: Vec<Recommendation>,
}

/// Persisted result of one forecast call. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub id: Uuid,
    pub org_id: String,
    pub usage_type: UsageType,
    pub created_at: DateTime<Utc>,
    pub parameters: ForecastParams,
    pub query: ForecastQuery,
    pub forecast: ForecastBundle,
}

impl ForecastRecord {
    pub fn new(
        org_id: impl Into<String>,
        parameters: ForecastParams,
        forecast: ForecastBundle,
        created_at: DateTime<Utc>,
    ) -> Self {
        let org_id = org_id.into();
        Self {
            id: Uuid::new_v4(),
            query: ForecastQuery {
                org_id: org_id.clone(),
                usage_type: parameters.usage_type.clone(),
                historical_days: parameters.historical_days,
                forecast_days: parameters.forecast_days,
                generated_at: created_at,
            },
            org_id,
            usage_type: parameters.usage_type.clone(),
            created_at,
            parameters,
            forecast,
        }
    }
}

pub(crate) fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_type_wire_tags() {
        let json = serde_json::to_string(&UsageType::CdnTrafficSum).unwrap();
        assert_eq!(json, "\"cdn_traffic_sum\"");

        let parsed: UsageType = serde_json::from_str("\"dns_query_usage_sum\"").unwrap();
        assert_eq!(parsed, UsageType::DnsQueryUsageSum);

        let other: UsageType = serde_json::from_str("\"waf_hits\"").unwrap();
        assert_eq!(other, UsageType::Other("waf_hits".to_string()));
    }

    #[test]
    fn test_strict_usage_type_parsing() {
        assert_eq!(
            UsageType::parse("cdn_request_sum", true).unwrap(),
            UsageType::CdnRequestSum
        );
        assert!(matches!(
            UsageType::parse("waf_hits", true),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert_eq!(
            UsageType::parse("waf_hits", false).unwrap(),
            UsageType::Other("waf_hits".to_string())
        );
        assert!(UsageType::parse("  ", false).is_err());
    }

    #[test]
    fn test_request_defaults() {
        let params = ForecastRequest::new("org-1", "dns_query_usage_sum")
            .to_params(true)
            .unwrap();
        assert_eq!(params, ForecastParams::new(UsageType::DnsQueryUsageSum));
    }

    #[test]
    fn test_request_rejects_out_of_range_values() {
        let mut request = ForecastRequest::new("org-1", "dns_query_usage_sum");
        request.confidence_interval = Some(0.995);
        assert!(matches!(request.to_params(true), Err(ForecastError::InvalidParameter(_))));

        let mut request = ForecastRequest::new("org-1", "dns_query_usage_sum");
        request.historical_days = Some(0);
        assert!(matches!(request.to_params(true), Err(ForecastError::InvalidParameter(_))));

        let request = ForecastRequest::new("", "dns_query_usage_sum");
        assert!(matches!(request.to_params(true), Err(ForecastError::InvalidParameter(_))));
    }

    #[test]
    fn test_params_validation() {
        let mut params = ForecastParams::new(UsageType::CdnRequestSum);
        assert!(params.validate().is_ok());

        params.confidence_interval = -0.1;
        assert!(params.validate().is_err());

        params.confidence_interval = 0.99;
        params.threshold_critical = 1.5;
        assert!(params.validate().is_err());

        params.threshold_critical = 0.9;
        params.growth_rate = f64::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(12.3456, 2), 12.35);
        assert_eq!(round_dp(2.25, 1), 2.3);
    }
}
