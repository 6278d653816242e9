//! Capacity Forecaster Configuration

use brivas_core::{parse_bool, BrivasError, Result, ServiceConfig};

use crate::engine::EngineSettings;

#[derive(Debug, Clone)]
pub struct ForecasterConfig {
    pub service: ServiceConfig,
    /// Fixed noise seed for reproducible forecasts
    pub forecast_seed: Option<u64>,
    pub strict_usage_types: bool,
    pub lumadb_pool_size: usize,
}

impl ForecasterConfig {
    pub fn from_env() -> Result<Self> {
        let mut service = ServiceConfig::from_env()?;
        if std::env::var("SERVICE_NAME").is_err() {
            service.service_name = "capacity-forecaster".to_string();
        }

        Ok(Self {
            service,
            forecast_seed: std::env::var("FORECAST_SEED")
                .ok()
                .map(|v| {
                    v.trim()
                        .parse()
                        .map_err(|e| BrivasError::Config(format!("Invalid FORECAST_SEED: {}", e)))
                })
                .transpose()?,
            strict_usage_types: match std::env::var("STRICT_USAGE_TYPES") {
                Ok(v) => parse_bool("STRICT_USAGE_TYPES", &v)?,
                Err(_) => true,
            },
            lumadb_pool_size: std::env::var("LUMADB_POOL_SIZE")
                .unwrap_or_else(|_| "16".to_string())
                .parse()
                .map_err(|e| BrivasError::Config(format!("Invalid LUMADB_POOL_SIZE: {}", e)))?,
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            seed: self.forecast_seed,
            strict_usage_types: self.strict_usage_types,
        }
    }
}
