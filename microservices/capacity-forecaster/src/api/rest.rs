//! Capacity Forecaster REST API

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::capacity::capacity_for;
use crate::engine::ForecastEngine;
use crate::error::ForecastError;
use crate::types::{ForecastRequest, UsageType};

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ForecastEngine>,
}

pub fn create_router(engine: Arc<ForecastEngine>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Forecasts
        .route("/v1/forecasts", post(create_forecast))
        .route("/v1/forecasts/{id}", get(get_forecast))
        .route("/v1/orgs/{org_id}/forecasts", get(list_forecasts))
        // Lookups
        .route("/v1/capacity/{usage_type}", get(get_capacity))
        .route("/v1/stats", get(get_stats))
        .with_state(AppState { engine })
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": self.error_code(),
        }));
        (status, body).into_response()
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let readiness = state.engine.readiness().await;
    let status = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness))
}

async fn create_forecast(
    State(state): State<AppState>,
    payload: Result<Json<ForecastRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ForecastError> {
    let Json(req) = payload?;
    let record = state.engine.generate(&req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_forecast(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ForecastError> {
    Ok(Json(state.engine.get(id).await?))
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_forecasts(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ForecastError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let forecasts = state.engine.list_for_org(&org_id, limit).await?;
    Ok(Json(serde_json::json!({
        "org_id": org_id,
        "count": forecasts.len(),
        "forecasts": forecasts,
    })))
}

#[derive(Serialize)]
struct CapacityResponse {
    usage_type: UsageType,
    daily_capacity: f64,
}

async fn get_capacity(Path(usage_type): Path<String>) -> Json<CapacityResponse> {
    let usage_type = UsageType::from(usage_type);
    Json(CapacityResponse {
        daily_capacity: capacity_for(&usage_type),
        usage_type,
    })
}

async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.stats())
}
