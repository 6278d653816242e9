//! LumaDB Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LumaDbError>;

#[derive(Debug, Error)]
pub enum LumaDbError {
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
