//! Telemetry Configuration

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "brivas-service".to_string(),
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

impl TelemetryConfig {
    pub fn new(service_name: &str, log_level: &str, json_logs: bool) -> Self {
        Self {
            service_name: service_name.to_string(),
            log_level: log_level.to_string(),
            json_logs,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set: the service's own
    /// crate and the shared runtime at `log_level`, everything else at `warn`
    pub fn default_directive(&self) -> String {
        let target = self.service_name.replace('-', "_");
        format!(
            "warn,brivas_core={level},{target}={level}",
            level = self.log_level,
            target = target
        )
    }
}
