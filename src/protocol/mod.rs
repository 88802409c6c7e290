//! Statsd wire format: metric event types and the datagram decoder.
mod decoder;
mod types;

#[cfg(test)]
mod tests;

pub use decoder::{SelfMetrics, decode, decode_datagram};
pub use types::{DEFAULT_SAMPLE_RATE, MetricEvent, MetricKind};
