use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{DEFAULT_SAMPLE_RATE, MetricEvent, MetricKind};

/// One statsd sample: `bucket:value|kind[|@rate]`. Matches are extracted from
/// anywhere in the payload, so separators between lines are not significant.
static LINE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    match Regex::new(r"([a-zA-Z0-9_.\-]+):(-?[0-9.]+)\|(c|g|ms)(\|@([0-9.]+))?") {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::error!("Failed to compile statsd line pattern: {}", err);
            None
        }
    }
});

/// Timer value used when the sample does not parse as a float.
const TIMER_FALLBACK_VALUE: &str = "0";

/// Synthetic per-datagram observation emitted alongside decoded events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfMetrics {
    pub prefix: String,
}

impl SelfMetrics {
    #[must_use]
    pub fn packets_received_bucket(&self) -> String {
        format!("{}.packets_received", self.prefix)
    }

    #[must_use]
    pub fn events_dropped_bucket(&self) -> String {
        format!("{}.events_dropped", self.prefix)
    }
}

/// Decode every valid metric line contained in `payload`.
///
/// Fragments that do not match the grammar are skipped without error.
#[must_use]
pub fn decode(payload: &[u8]) -> Vec<MetricEvent> {
    let Some(pattern) = LINE_PATTERN.as_ref() else {
        return Vec::new();
    };
    let text = String::from_utf8_lossy(payload);

    pattern
        .captures_iter(&text)
        .filter_map(|captures| {
            let bucket = captures.get(1)?.as_str();
            let raw_value = captures.get(2)?.as_str();
            let kind = MetricKind::from_suffix(captures.get(3)?.as_str())?;
            let sample_rate = parse_sample_rate(captures.get(5).map(|rate| rate.as_str()));

            let value = if kind == MetricKind::Timer && raw_value.parse::<f64>().is_err() {
                TIMER_FALLBACK_VALUE
            } else {
                raw_value
            };

            Some(MetricEvent::new(bucket, value, kind).with_sample_rate(sample_rate))
        })
        .collect()
}

/// Decode a received datagram, appending the packet counter when self
/// observation is enabled.
#[must_use]
pub fn decode_datagram(payload: &[u8], self_metrics: Option<&SelfMetrics>) -> Vec<MetricEvent> {
    let mut events = decode(payload);
    if let Some(self_metrics) = self_metrics {
        events.push(MetricEvent::new(
            self_metrics.packets_received_bucket(),
            "1",
            MetricKind::Counter,
        ));
    }
    events
}

fn parse_sample_rate(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.parse::<f64>().ok())
        .filter(|rate| rate.is_finite() && *rate > 0.0 && *rate <= 1.0)
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}
