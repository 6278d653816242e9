//! Forecasting error taxonomy

use brivas_core::BrivasError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// Out-of-range or malformed input; nothing was computed
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The inputs are valid but the arithmetic has no defined result
    #[error("Degenerate computation: {0}")]
    ComputationDegenerate(String),

    #[error("Forecast not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ForecastError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidParameter(_) => 400,
            Self::NotFound(_) => 404,
            Self::ComputationDegenerate(_) => 422,
            Self::Storage(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::ComputationDegenerate(_) => "COMPUTATION_DEGENERATE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<brivas_lumadb::LumaDbError> for ForecastError {
    fn from(err: brivas_lumadb::LumaDbError) -> Self {
        ForecastError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Storage(format!("record encoding: {}", err))
    }
}

impl From<validator::ValidationErrors> for ForecastError {
    fn from(err: validator::ValidationErrors) -> Self {
        ForecastError::InvalidParameter(err.to_string())
    }
}

/// Undecodable or out-of-type request bodies are caller input errors
impl From<axum::extract::rejection::JsonRejection> for ForecastError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ForecastError::InvalidParameter(rejection.body_text())
    }
}

impl From<ForecastError> for BrivasError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::InvalidParameter(msg) => BrivasError::Validation(msg),
            ForecastError::ComputationDegenerate(msg) => BrivasError::Unprocessable(msg),
            ForecastError::NotFound(msg) => BrivasError::NotFound(msg),
            ForecastError::Storage(msg) => BrivasError::Database(msg),
        }
    }
}
