//! Forecast engine
//!
//! Runs one forecast call end to end: validate, synthesize the history, derive
//! the pattern profile, project forward, assess capacity, compose advice and
//! append the record. A call either persists a complete record or nothing.

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use brivas_core::{DependencyStatus, ReadinessStatus};
use brivas_telemetry::{Counter, Histogram, HistogramSnapshot};

use crate::breach::first_breach;
use crate::capacity::capacity_for;
use crate::error::{ForecastError, Result};
use crate::forecast::forecast;
use crate::growth::GrowthMetrics;
use crate::recommend::{compose, recommend_increase, CapacityAssessment};
use crate::store::ForecastStore;
use crate::synthesizer::{SeriesSynthesizer, UsageHistory};
use crate::types::{ForecastBundle, ForecastParams, ForecastRecord, ForecastRequest};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Fixed noise seed; `None` draws from entropy on every call
    pub seed: Option<u64>,
    pub strict_usage_types: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            seed: None,
            strict_usage_types: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub store: &'static str,
    pub forecasts_generated: u64,
    pub forecasts_failed: u64,
    pub generation_ms: HistogramSnapshot,
}

pub struct ForecastEngine {
    store: Arc<dyn ForecastStore>,
    settings: EngineSettings,
    generated: Counter,
    failed: Counter,
    generation_ms: Histogram,
}

impl ForecastEngine {
    pub fn new(store: Arc<dyn ForecastStore>, settings: EngineSettings) -> Self {
        Self {
            store,
            settings,
            generated: Counter::new("forecasts_generated"),
            failed: Counter::new("forecasts_failed"),
            generation_ms: Histogram::new("forecast_generation_ms"),
        }
    }

    /// Generate, persist and return a forecast
    pub async fn generate(&self, request: &ForecastRequest) -> Result<ForecastRecord> {
        let started = Instant::now();
        let result = self.try_generate(request).await;
        self.generation_ms.record(started.elapsed().as_secs_f64() * 1_000.0);

        match &result {
            Ok(record) => {
                self.generated.inc();
                info!(
                    forecast_id = %record.id,
                    org_id = %record.org_id,
                    usage_type = %record.usage_type,
                    warning_breach = ?record.forecast.capacity.warning_breach_date,
                    critical_breach = ?record.forecast.capacity.critical_breach_date,
                    "Forecast generated"
                );
            }
            Err(e) => {
                self.failed.inc();
                warn!(
                    org_id = %request.org_id,
                    usage_type = %request.usage_type,
                    error = %e,
                    "Forecast failed"
                );
            }
        }
        result
    }

    async fn try_generate(&self, request: &ForecastRequest) -> Result<ForecastRecord> {
        let params = request.to_params(self.settings.strict_usage_types)?;
        let now = Utc::now();

        let bundle = compute(&params, now.date_naive(), &mut self.synthesizer())?;
        let record = ForecastRecord::new(request.org_id.trim(), params, bundle, now);

        self.store.append(&record).await?;
        Ok(record)
    }

    /// Fresh generator per call
    fn synthesizer(&self) -> SeriesSynthesizer<StdRng> {
        match self.settings.seed {
            Some(seed) => SeriesSynthesizer::seeded(seed),
            None => SeriesSynthesizer::from_entropy(),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<ForecastRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ForecastError::NotFound(id.to_string()))
    }

    pub async fn list_for_org(&self, org_id: &str, limit: usize) -> Result<Vec<ForecastRecord>> {
        self.store.list_for_org(org_id, limit).await
    }

    /// Readiness hinges on the record store alone
    pub async fn readiness(&self) -> ReadinessStatus {
        let checked = Instant::now();
        let available = self.store.is_healthy().await;
        ReadinessStatus {
            ready: available,
            dependencies: vec![DependencyStatus {
                name: self.store.name().to_string(),
                available,
                latency_ms: Some(checked.elapsed().as_millis() as u64),
            }],
        }
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            store: self.store.name(),
            forecasts_generated: self.generated.get(),
            forecasts_failed: self.failed.get(),
            generation_ms: self.generation_ms.snapshot(),
        }
    }
}

/// Store-free part of a forecast call
pub fn compute<H>(params: &ForecastParams, today: NaiveDate, source: &mut H) -> Result<ForecastBundle>
where
    H: UsageHistory + ?Sized,
{
    let result = forecast(params, today, source)?;
    let capacity = capacity_for(&params.usage_type);

    let warning_breach_date =
        first_breach(&result.projection.points, capacity * params.threshold_warning);
    let critical_breach_date =
        first_breach(&result.projection.points, capacity * params.threshold_critical);
    debug!(
        ?warning_breach_date,
        ?critical_breach_date,
        "Breach scan complete"
    );

    let growth_metrics =
        GrowthMetrics::compute(&result.timeline.values, params.historical_days as usize);

    let recommended_increase = if params.threshold_warning > 0.0 {
        Some(recommend_increase(
            &result.projection.values(),
            capacity,
            params.threshold_warning,
        )?)
    } else {
        warn!("Warning threshold is 0; no capacity increase can be derived");
        None
    };

    let current_value = result.timeline.values[result.timeline.historical_end_index];
    let capacity_assessment = CapacityAssessment {
        current: capacity,
        current_usage_percent: format!("{:.2}", current_value as f64 / capacity * 100.0),
        warning_breach_date,
        critical_breach_date,
        recommended_increase,
    };

    let recommendations = compose(&capacity_assessment, &growth_metrics, &params.usage_type);

    Ok(ForecastBundle {
        timeline: result.timeline,
        capacity: capacity_assessment,
        growth_metrics,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::RecommendationKind;
    use crate::store::InMemoryForecastStore;
    use crate::types::UsageType;
    use async_trait::async_trait;

    fn engine_with(store: Arc<dyn ForecastStore>) -> ForecastEngine {
        ForecastEngine::new(
            store,
            EngineSettings {
                seed: Some(11),
                strict_usage_types: true,
            },
        )
    }

    #[test]
    fn test_compute_bundle_shape() {
        let params = ForecastParams::new(UsageType::DnsQueryUsageSum);
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let bundle = compute(&params, today, &mut SeriesSynthesizer::seeded(5)).unwrap();

        assert_eq!(bundle.timeline.len(), 180);
        assert_eq!(bundle.capacity.current, 500_000.0);
        assert_eq!(
            bundle.recommendations.last().map(|r| r.kind),
            Some(RecommendationKind::Optimization)
        );
        assert_eq!(
            bundle.recommendations.iter().filter(|r| r.kind == RecommendationKind::Optimization).count(),
            1
        );
    }

    #[test]
    fn test_zero_warning_threshold_skips_increase() {
        let params = ForecastParams {
            threshold_warning: 0.0,
            ..ForecastParams::new(UsageType::CdnRequestSum)
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let bundle = compute(&params, today, &mut SeriesSynthesizer::noiseless()).unwrap();
        assert!(bundle.capacity.recommended_increase.is_none());
        assert!(bundle.capacity.warning_breach_date.is_some());
    }

    #[tokio::test]
    async fn test_generate_persists_record() {
        let store = Arc::new(InMemoryForecastStore::new());
        let engine = engine_with(store.clone());

        let record = engine
            .generate(&ForecastRequest::new("org-1", "cdn_request_sum"))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(engine.get(record.id).await.unwrap(), record);
        assert_eq!(record.query.org_id, "org-1");
        assert_eq!(record.query.historical_days, 90);
        assert_eq!(engine.stats().forecasts_generated, 1);
    }

    #[tokio::test]
    async fn test_invalid_request_persists_nothing() {
        let store = Arc::new(InMemoryForecastStore::new());
        let engine = engine_with(store.clone());

        let mut request = ForecastRequest::new("org-1", "dns_query_usage_sum");
        request.confidence_interval = Some(1.0);
        let err = engine.generate(&request).await.unwrap_err();

        assert!(matches!(err, ForecastError::InvalidParameter(_)));
        assert!(store.is_empty());
        assert_eq!(engine.stats().forecasts_failed, 1);
    }

    #[tokio::test]
    async fn test_unknown_usage_type_policy() {
        let strict = engine_with(Arc::new(InMemoryForecastStore::new()));
        let request = ForecastRequest::new("org-1", "waf_hits");
        assert!(matches!(
            strict.generate(&request).await,
            Err(ForecastError::InvalidParameter(_))
        ));

        let lenient = ForecastEngine::new(
            Arc::new(InMemoryForecastStore::new()),
            EngineSettings {
                seed: Some(1),
                strict_usage_types: false,
            },
        );
        let record = lenient.generate(&request).await.unwrap();
        assert_eq!(record.forecast.capacity.current, 1_000_000.0);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let engine = engine_with(Arc::new(InMemoryForecastStore::new()));
        assert!(matches!(
            engine.get(Uuid::new_v4()).await,
            Err(ForecastError::NotFound(_))
        ));
    }

    struct FailingStore;

    #[async_trait]
    impl ForecastStore for FailingStore {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn append(&self, _: &ForecastRecord) -> Result<()> {
            Err(ForecastError::Storage("unavailable".to_string()))
        }

        async fn get(&self, _: Uuid) -> Result<Option<ForecastRecord>> {
            Ok(None)
        }

        async fn list_for_org(&self, _: &str, _: usize) -> Result<Vec<ForecastRecord>> {
            Ok(vec![])
        }

        async fn is_healthy(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let engine = engine_with(Arc::new(FailingStore));
        let err = engine
            .generate(&ForecastRequest::new("org-1", "dns_query_usage_sum"))
            .await
            .unwrap_err();
        assert!(matches!(err, ForecastError::Storage(_)));
        assert_eq!(engine.stats().store, "failing");
    }

    #[tokio::test]
    async fn test_readiness_reports_store() {
        let ready = engine_with(Arc::new(InMemoryForecastStore::new())).readiness().await;
        assert!(ready.ready);
        assert_eq!(ready.dependencies[0].name, "memory");

        let not_ready = engine_with(Arc::new(FailingStore)).readiness().await;
        assert!(!not_ready.ready);
        assert_eq!(not_ready.dependencies[0].name, "failing");
        assert!(!not_ready.dependencies[0].available);
    }
}
