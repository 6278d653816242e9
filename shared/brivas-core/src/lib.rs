//! Brivas Core - shared service infrastructure
//!
//! This crate provides:
//! - The service trait and runtime every microservice runs under
//! - The platform error taxonomy
//! - Environment-driven service configuration

pub mod config;
pub mod error;
pub mod service;

pub use config::{parse_bool, ServiceConfig};
pub use error::{BrivasError, Result};
pub use service::{BrivasService, DependencyStatus, HealthStatus, MicroserviceRuntime, ReadinessStatus};
