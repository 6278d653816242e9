//! Capacity Forecaster service
//!
//! HTTP front for the forecasting engine. Records go to LumaDB when
//! `LUMADB_URL` is set, otherwise to an in-process store.

use brivas_core::{
    BrivasError, BrivasService, HealthStatus, MicroserviceRuntime, ReadinessStatus, Result,
};
use brivas_lumadb::{LumaDbPool, PoolConfig};
use brivas_telemetry::TelemetryConfig;
use capacity_forecaster::{
    api, ForecastEngine, ForecastStore, ForecasterConfig, InMemoryForecastStore,
    LumaDbForecastStore,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ForecasterConfig::from_env()?;

    brivas_telemetry::init_tracing(&TelemetryConfig::new(
        &config.service.service_name,
        &config.service.log_level,
        config.service.json_logs,
    ))
    .map_err(|e| BrivasError::Config(e.to_string()))?;

    info!("Starting Capacity Forecaster");

    let service = Arc::new(ForecasterService::new(config).await?);
    MicroserviceRuntime::run(service).await
}

pub struct ForecasterService {
    config: ForecasterConfig,
    engine: Arc<ForecastEngine>,
    start_time: Instant,
}

impl ForecasterService {
    pub async fn new(config: ForecasterConfig) -> Result<Self> {
        let store: Arc<dyn ForecastStore> = match &config.service.lumadb_url {
            Some(url) => {
                let pool = LumaDbPool::new(PoolConfig::new(url.clone(), config.lumadb_pool_size))
                    .map_err(|e| BrivasError::Database(e.to_string()))?;
                let store = LumaDbForecastStore::new(pool);
                store.ensure_schema().await?;
                Arc::new(store)
            }
            None => {
                info!("LUMADB_URL not set, keeping forecasts in memory");
                Arc::new(InMemoryForecastStore::new())
            }
        };

        let engine = Arc::new(ForecastEngine::new(store, config.engine_settings()));

        Ok(Self {
            config,
            engine,
            start_time: Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl BrivasService for ForecasterService {
    fn service_id(&self) -> &'static str {
        "capacity-forecaster"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        self.engine.readiness().await
    }

    async fn shutdown(&self) -> Result<()> {
        let stats = self.engine.stats();
        info!(
            forecasts_generated = stats.forecasts_generated,
            forecasts_failed = stats.forecasts_failed,
            "Shutting down Capacity Forecaster"
        );
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            http = %self.config.service.http_bind,
            seeded = self.config.forecast_seed.is_some(),
            strict_usage_types = self.config.strict_usage_types,
            "Starting Capacity Forecaster HTTP server"
        );

        let router = api::rest::create_router(self.engine.clone());
        let listener = tokio::net::TcpListener::bind(&self.config.service.http_bind).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
