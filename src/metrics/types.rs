use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::MetricKind;

/// How a gauge behaves across flush windows.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GaugePolicy {
    /// Latest write wins and the value is reported until overwritten.
    #[default]
    Persist,
    /// Latest write wins and the gauge is removed after each flush.
    Clear,
    /// Writes are added to the current value, which persists across flushes.
    Accumulate,
}

impl GaugePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            GaugePolicy::Persist => "persist",
            GaugePolicy::Clear => "clear",
            GaugePolicy::Accumulate => "accumulate",
        }
    }
}

/// Mean reduction applied to timer samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MeanMode {
    #[default]
    Arithmetic,
    /// Mean of the lowest samples up to `percent_threshold`.
    Trimmed { percent_threshold: u8 },
}

/// Reduced view of one timer bucket for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimerDistribution {
    pub count: u64,
    pub count_per_second: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CounterValue {
    pub count: i64,
    pub rate_per_second: f64,
}

/// Everything one flush hands to the backends.
///
/// Produced by swapping the aggregation maps, so it owns its data and can be
/// dispatched while the next window accumulates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushSnapshot {
    pub counters: Vec<(String, CounterValue)>,
    pub gauges: Vec<(String, f64)>,
    pub timers: Vec<(String, TimerDistribution)>,
    pub window: Duration,
    pub timestamp: i64,
}

impl FlushSnapshot {
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.counters
            .len()
            .saturating_add(self.gauges.len())
            .saturating_add(self.timers.len())
    }
}

/// An event whose value could not be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Rejected {kind:?} value '{value}' for bucket '{bucket}'")]
pub struct RejectedEvent {
    pub bucket: String,
    pub value: String,
    pub kind: MetricKind,
}

/// Rate of `value` over `window`, zero for an empty window.
pub(crate) fn per_second(value: f64, window: Duration) -> f64 {
    let seconds = window.as_secs_f64();
    if seconds > 0.0 { value / seconds } else { 0.0 }
}
