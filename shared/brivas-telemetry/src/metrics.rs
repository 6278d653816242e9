//! Metrics primitives

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic counter
#[derive(Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
    name: String,
}

impl Counter {
    pub fn new(name: &str) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0)),
            name: name.to_string(),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Point-in-time summary of a histogram
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HistogramSnapshot {
    pub count: usize,
    pub mean: f64,
    pub p50: f64,
    pub p99: f64,
    pub max: f64,
}

/// Sliding-window histogram; keeps the most recent `max_samples` values
#[derive(Clone)]
pub struct Histogram {
    samples: Arc<Mutex<VecDeque<f64>>>,
    name: String,
    max_samples: usize,
}

impl Histogram {
    pub fn new(name: &str) -> Self {
        Self::with_window(name, 10_000)
    }

    pub fn with_window(name: &str, max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(max_samples.min(1024)))),
            name: name.to_string(),
            max_samples,
        }
    }

    pub fn record(&self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let mut samples = self.samples.lock();
        if samples.len() == self.max_samples {
            samples.pop_front();
        }
        samples.push_back(value);
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let mut sorted: Vec<f64> = self.samples.lock().iter().copied().collect();
        if sorted.is_empty() {
            return HistogramSnapshot::default();
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let rank = |p: f64| sorted[(((count as f64) * p / 100.0) as usize).min(count - 1)];

        HistogramSnapshot {
            count,
            mean: sorted.iter().sum::<f64>() / count as f64,
            p50: rank(50.0),
            p99: rank(99.0),
            max: sorted[count - 1],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
