//! Capacity Forecaster
//!
//! Projects daily usage (DNS queries, CDN requests, CDN traffic) forward from
//! a historical window and turns the projection into:
//! - Confidence bounds that widen with forecast distance
//! - Warning/critical capacity breach dates
//! - Growth metrics around today
//! - A rounded capacity increase and advisory recommendations
//!
//! Every generated forecast is appended to a record store.

pub mod api;
pub mod breach;
pub mod calendar;
pub mod capacity;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod growth;
pub mod pattern;
pub mod recommend;
pub mod store;
pub mod synthesizer;
pub mod types;

pub use config::ForecasterConfig;
pub use engine::{compute, EngineSettings, EngineStats, ForecastEngine};
pub use error::{ForecastError, Result};
pub use store::{ForecastStore, InMemoryForecastStore, LumaDbForecastStore};
pub use synthesizer::{SeriesSynthesizer, UsageHistory};
pub use types::*;
