//! Forecast record store
//!
//! Append-only: each forecast call writes one new record. Records are never
//! updated or deleted here; retention belongs to the database.

use async_trait::async_trait;
use brivas_lumadb::LumaDbPool;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ForecastError, Result};
use crate::types::ForecastRecord;

#[async_trait]
pub trait ForecastStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Persist a new record. Fails if the id already exists.
    async fn append(&self, record: &ForecastRecord) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<ForecastRecord>>;

    /// Newest first
    async fn list_for_org(&self, org_id: &str, limit: usize) -> Result<Vec<ForecastRecord>>;

    async fn is_healthy(&self) -> bool {
        true
    }
}

/// Process-local store
#[derive(Clone, Default)]
pub struct InMemoryForecastStore {
    records: Arc<DashMap<Uuid, ForecastRecord>>,
}

impl InMemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ForecastStore for InMemoryForecastStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, record: &ForecastRecord) -> Result<()> {
        match self.records.entry(record.id) {
            Entry::Occupied(_) => Err(ForecastError::Storage(format!(
                "forecast {} already exists",
                record.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<ForecastRecord>> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn list_for_org(&self, org_id: &str, limit: usize) -> Result<Vec<ForecastRecord>> {
        let mut records: Vec<ForecastRecord> = self
            .records
            .iter()
            .filter(|r| r.value().org_id == org_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS capacity_forecasts (
        id TEXT PRIMARY KEY,
        org_id TEXT NOT NULL,
        usage_type TEXT NOT NULL,
        created_at_ms BIGINT NOT NULL,
        payload TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS capacity_forecasts_org_idx
        ON capacity_forecasts (org_id, created_at_ms DESC);
"#;

/// LumaDB-backed store. The record is kept as JSON text next to the columns
/// used for lookup.
#[derive(Clone)]
pub struct LumaDbForecastStore {
    pool: LumaDbPool,
}

impl LumaDbForecastStore {
    pub fn new(pool: LumaDbPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        self.pool.batch_execute(SCHEMA).await?;
        info!("capacity_forecasts schema ready");
        Ok(())
    }
}

#[async_trait]
impl ForecastStore for LumaDbForecastStore {
    fn name(&self) -> &'static str {
        "lumadb"
    }

    async fn append(&self, record: &ForecastRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        let id = record.id.to_string();
        let usage_type = record.usage_type.to_string();
        let created_at_ms = record.created_at.timestamp_millis();

        let conn = self.pool.get().await?;
        conn.execute(
            "INSERT INTO capacity_forecasts (id, org_id, usage_type, created_at_ms, payload)
             VALUES ($1, $2, $3, $4, $5)",
            &[&id, &record.org_id, &usage_type, &created_at_ms, &payload],
        )
        .await
        .map_err(|e| ForecastError::Storage(e.to_string()))?;

        debug!(forecast_id = %record.id, "Forecast record appended");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ForecastRecord>> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_opt(
                "SELECT payload FROM capacity_forecasts WHERE id = $1",
                &[&id.to_string()],
            )
            .await
            .map_err(|e| ForecastError::Storage(e.to_string()))?;

        row.map(|row| {
            let payload: String = row.get(0);
            serde_json::from_str(&payload).map_err(ForecastError::from)
        })
        .transpose()
    }

    async fn list_for_org(&self, org_id: &str, limit: usize) -> Result<Vec<ForecastRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT payload FROM capacity_forecasts
                 WHERE org_id = $1
                 ORDER BY created_at_ms DESC
                 LIMIT $2",
                &[&org_id, &limit],
            )
            .await
            .map_err(|e| ForecastError::Storage(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let payload: String = row.get(0);
                serde_json::from_str(&payload).map_err(ForecastError::from)
            })
            .collect()
    }

    async fn is_healthy(&self) -> bool {
        self.pool.is_healthy().await
    }
}
