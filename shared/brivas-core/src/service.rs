//! Service lifecycle shared by all microservices

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tracing::{error, info, warn};

use crate::error::{BrivasError, Result};

/// Liveness probe payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub service_id: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Readiness probe payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessStatus {
    pub ready: bool,
    pub dependencies: Vec<DependencyStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub name: String,
    pub available: bool,
    pub latency_ms: Option<u64>,
}

/// Standard trait all microservices implement
#[async_trait]
pub trait BrivasService: Send + Sync + 'static {
    /// Service identifier (e.g., "capacity-forecaster")
    fn service_id(&self) -> &'static str;

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    async fn health(&self) -> HealthStatus;

    async fn ready(&self) -> ReadinessStatus;

    async fn shutdown(&self) -> Result<()>;

    /// Serve until the listener stops
    async fn start(&self) -> Result<()>;
}

/// Runs a service until it exits or a shutdown signal arrives
pub struct MicroserviceRuntime;

impl MicroserviceRuntime {
    pub async fn run<S: BrivasService>(service: Arc<S>) -> Result<()> {
        let started = Instant::now();

        info!(
            service_id = service.service_id(),
            version = service.version(),
            "Starting microservice"
        );

        let serving = service.clone();
        let mut handle = tokio::spawn(async move { serving.start().await });

        let outcome = tokio::select! {
            joined = &mut handle => match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("Service task failed: {}", e);
                    Err(BrivasError::Internal(format!("service task failed: {}", e)))
                }
            },
            _ = Self::wait_for_shutdown() => {
                info!("Shutdown signal received, gracefully stopping...");
                handle.abort();
                Ok(())
            }
        };

        if let Err(e) = service.shutdown().await {
            warn!("Error during shutdown: {}", e);
        }

        info!(
            uptime_seconds = started.elapsed().as_secs(),
            "Microservice stopped"
        );

        outcome
    }

    async fn wait_for_shutdown() {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!("Failed to listen for SIGTERM: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }
}
