use std::collections::HashMap;
use std::time::Duration;

use crate::protocol::{MetricEvent, MetricKind};

use super::distribution::summarize;
use super::types::{
    CounterValue, FlushSnapshot, GaugePolicy, MeanMode, RejectedEvent, per_second,
};

/// Per-bucket counters, gauges, and timer samples for the current window.
///
/// Owned by the collector task; nothing else reads or writes it.
#[derive(Debug, Default)]
pub struct AggregationState {
    counters: HashMap<String, i64>,
    gauges: HashMap<String, f64>,
    timers: HashMap<String, Vec<f64>>,
    gauge_policy: GaugePolicy,
}

impl AggregationState {
    #[must_use]
    pub fn new(gauge_policy: GaugePolicy) -> Self {
        Self {
            gauge_policy,
            ..Self::default()
        }
    }

    /// Apply one event to the aggregation maps.
    ///
    /// # Errors
    ///
    /// Returns [`RejectedEvent`] when a counter or gauge value is not a
    /// finite number. Timer values that fail to parse are recorded as `0`.
    pub fn apply(&mut self, event: MetricEvent) -> Result<(), RejectedEvent> {
        let parsed = event
            .value
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite());

        match event.kind {
            MetricKind::Counter => {
                let Some(raw) = parsed else {
                    return Err(rejected(event));
                };
                let scaled = (raw / event.sample_rate).round();
                if !scaled.is_finite() {
                    return Err(rejected(event));
                }
                self.add_counter(event.bucket, scaled as i64);
            }
            MetricKind::Gauge => {
                let Some(value) = parsed else {
                    return Err(rejected(event));
                };
                match self.gauge_policy {
                    GaugePolicy::Persist | GaugePolicy::Clear => {
                        self.gauges.insert(event.bucket, value);
                    }
                    GaugePolicy::Accumulate => {
                        *self.gauges.entry(event.bucket).or_insert(0.0) += value;
                    }
                }
            }
            MetricKind::Timer => {
                self.timers
                    .entry(event.bucket)
                    .or_default()
                    .push(parsed.unwrap_or(0.0));
            }
        }
        Ok(())
    }

    pub fn add_counter(&mut self, bucket: String, delta: i64) {
        let count = self.counters.entry(bucket).or_insert(0);
        *count = count.saturating_add(delta);
    }

    /// Swap out the current window, with each kind sorted by bucket name.
    ///
    /// Counters reset to zero and timer sequences to empty; their buckets stay
    /// known so idle windows still report zeros. Gauges follow the configured
    /// [`GaugePolicy`].
    pub fn take_snapshot(
        &mut self,
        window: Duration,
        mean_mode: MeanMode,
        timestamp: i64,
    ) -> FlushSnapshot {
        let mut counters: Vec<_> = self
            .counters
            .iter_mut()
            .map(|(bucket, count)| {
                let count = std::mem::take(count);
                let value = CounterValue {
                    count,
                    rate_per_second: per_second(count as f64, window),
                };
                (bucket.clone(), value)
            })
            .collect();

        let mut gauges: Vec<_> = match self.gauge_policy {
            GaugePolicy::Persist | GaugePolicy::Accumulate => self
                .gauges
                .iter()
                .map(|(bucket, value)| (bucket.clone(), *value))
                .collect(),
            GaugePolicy::Clear => self.gauges.drain().collect(),
        };

        let mut timers: Vec<_> = self
            .timers
            .iter_mut()
            .map(|(bucket, samples)| {
                let distribution = summarize(std::mem::take(samples), window, mean_mode);
                (bucket.clone(), distribution)
            })
            .collect();

        counters.sort_unstable_by(|left, right| left.0.cmp(&right.0));
        gauges.sort_unstable_by(|left, right| left.0.cmp(&right.0));
        timers.sort_unstable_by(|left, right| left.0.cmp(&right.0));

        FlushSnapshot {
            counters,
            gauges,
            timers,
            window,
            timestamp,
        }
    }

    #[must_use]
    pub fn counter(&self, bucket: &str) -> Option<i64> {
        self.counters.get(bucket).copied()
    }

    #[must_use]
    pub fn gauge(&self, bucket: &str) -> Option<f64> {
        self.gauges.get(bucket).copied()
    }

    #[must_use]
    pub fn timer_samples(&self, bucket: &str) -> Option<&[f64]> {
        self.timers.get(bucket).map(Vec::as_slice)
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.counters
            .len()
            .saturating_add(self.gauges.len())
            .saturating_add(self.timers.len())
    }
}

fn rejected(event: MetricEvent) -> RejectedEvent {
    RejectedEvent {
        bucket: event.bucket,
        value: event.value,
        kind: event.kind,
    }
}
