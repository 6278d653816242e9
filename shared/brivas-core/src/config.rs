//! Configuration management for microservices

use crate::error::{BrivasError, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub http_bind: String,
    /// Unset means the service runs without a database
    pub lumadb_url: Option<String>,
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            http_bind: "0.0.0.0:8080".to_string(),
            lumadb_url: None,
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            service_name: env::var("SERVICE_NAME").unwrap_or(defaults.service_name),
            http_bind: env::var("HTTP_BIND").unwrap_or(defaults.http_bind),
            lumadb_url: env::var("LUMADB_URL").ok().filter(|url| !url.trim().is_empty()),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: match env::var("JSON_LOGS") {
                Ok(v) => parse_bool("JSON_LOGS", &v)?,
                Err(_) => defaults.json_logs,
            },
        })
    }
}

/// Parse a boolean environment value (`true`/`false`/`1`/`0`)
pub fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(BrivasError::Config(format!("Invalid {}: {}", name, other))),
    }
}
