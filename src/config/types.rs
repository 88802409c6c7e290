use std::time::Duration;

use serde::Deserialize;

use crate::args::MeanKind;
use crate::backends::FailurePolicy;
use crate::error::ValidationError;
use crate::metrics::GaugePolicy;
use crate::server::OverflowPolicy;

/// On-disk configuration; every field is optional and CLI flags win.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub address: Option<String>,
    pub flush_interval: Option<DurationValue>,
    pub percent_threshold: Option<u64>,
    pub mean: Option<MeanKind>,
    pub gauge_policy: Option<GaugePolicy>,
    pub queue_capacity: Option<usize>,
    pub overflow: Option<OverflowPolicy>,
    pub self_metrics: Option<bool>,
    pub self_prefix: Option<String>,
    #[serde(alias = "fwd_to")]
    pub forward_to: Option<String>,
    pub max_datagram_size: Option<usize>,
    pub verbose: Option<bool>,
    pub backends: Option<BackendsConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendsConfig {
    pub timeout: Option<DurationValue>,
    pub graphite: Option<GraphiteConfig>,
    pub console: Option<ConsoleConfig>,
    pub file: Option<FileConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphiteConfig {
    pub address: Option<String>,
    pub prefix: Option<String>,
    pub on_failure: Option<FailurePolicy>,
}

/// A `[backends.console]` table without `prefix` prints every bucket.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    pub prefix: Option<String>,
    pub on_failure: Option<FailurePolicy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub path: Option<String>,
    pub on_failure: Option<FailurePolicy>,
}

/// Either a number of seconds or a duration string such as `"500ms"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                super::ensure_duration_in_range(Duration::from_secs(*secs))
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
