//! Connection Pool for LumaDB

use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use tokio_postgres::NoTls;
use tracing::{debug, info};

use crate::{LumaDbError, Result};

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub url: String,
    pub max_size: usize,
}

impl PoolConfig {
    pub fn new(url: impl Into<String>, max_size: usize) -> Self {
        Self {
            url: url.into(),
            max_size: max_size.max(1),
        }
    }
}

/// LumaDB connection pool
#[derive(Clone)]
pub struct LumaDbPool {
    pool: Pool,
}

impl LumaDbPool {
    /// Build the pool. Connections are opened lazily on first use.
    pub fn new(config: PoolConfig) -> Result<Self> {
        info!(max_size = config.max_size, "Creating LumaDB connection pool");

        let pg_config: tokio_postgres::Config = config
            .url
            .parse()
            .map_err(|e| LumaDbError::Configuration(format!("Invalid URL: {}", e)))?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let pool = Pool::builder(manager)
            .max_size(config.max_size)
            .build()
            .map_err(|e| LumaDbError::Pool(e.to_string()))?;

        debug!("LumaDB pool created");
        Ok(Self { pool })
    }

    pub async fn get(&self) -> Result<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| LumaDbError::Pool(e.to_string()))
    }

    /// Run one or more `;`-separated statements without parameters
    pub async fn batch_execute(&self, sql: &str) -> Result<()> {
        let conn = self.get().await?;
        conn.batch_execute(sql).await?;
        Ok(())
    }

    pub async fn is_healthy(&self) -> bool {
        match self.pool.get().await {
            Ok(conn) => conn.simple_query("SELECT 1").await.is_ok(),
            Err(_) => false,
        }
    }
}
