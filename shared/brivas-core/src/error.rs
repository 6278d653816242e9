//! Error types shared by Brivas services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrivasError>;

#[derive(Error, Debug)]
pub enum BrivasError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BrivasError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Unprocessable(_) => 422,
            Self::Unavailable(_) => 503,
            _ => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unprocessable(_) => "UNPROCESSABLE",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for BrivasError {
    fn from(err: std::io::Error) -> Self {
        BrivasError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BrivasError::Validation("x".into()).status_code(), 400);
        assert_eq!(BrivasError::NotFound("x".into()).status_code(), 404);
        assert_eq!(BrivasError::Unprocessable("x".into()).status_code(), 422);
        assert_eq!(BrivasError::Database("x".into()).status_code(), 500);
    }

    #[test]
    fn test_io_error_maps_to_network() {
        let err: BrivasError = std::io::Error::new(std::io::ErrorKind::AddrInUse, "bind").into();
        assert_eq!(err.error_code(), "NETWORK_ERROR");
    }
}
