use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::backends::{
    BackendSettings, ConsoleSettings, DEFAULT_GRAPHITE_PREFIX, FailurePolicy, FileSettings,
    GraphiteSettings,
};
use crate::metrics::{GaugePolicy, MeanMode};
use crate::protocol::SelfMetrics;
use crate::server::OverflowPolicy;

use super::defaults::{
    DEFAULT_ADDRESS, DEFAULT_BACKEND_TIMEOUT, DEFAULT_FLUSH_INTERVAL, DEFAULT_MAX_DATAGRAM_SIZE,
    DEFAULT_PERCENT_THRESHOLD, DEFAULT_QUEUE_CAPACITY, DEFAULT_SELF_PREFIX,
};
use super::parsers::{parse_duration_arg, parse_percent_threshold, parse_positive_usize};
use super::types::{MeanKind, PercentThreshold, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "statsd-compatible metrics aggregation daemon - counters, gauges and timers aggregated per flush window and shipped to pluggable backends."
)]
pub struct DaemonArgs {
    /// UDP address to receive statsd datagrams on
    #[arg(long = "address", short = 'a', env = "TALLYD_ADDRESS", default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// Flush interval (supports ms/s/m/h; bare numbers are seconds)
    #[arg(
        long = "flush-interval",
        short = 'f',
        default_value = DEFAULT_FLUSH_INTERVAL,
        value_parser = parse_duration_arg
    )]
    pub flush_interval: Duration,

    /// Percentage of lowest timer samples averaged when --mean=trimmed
    #[arg(
        long = "percent-threshold",
        default_value = DEFAULT_PERCENT_THRESHOLD,
        value_parser = parse_percent_threshold
    )]
    pub percent_threshold: PercentThreshold,

    /// How timer means are computed
    #[arg(long = "mean", value_enum, default_value_t = MeanKind::Arithmetic)]
    pub mean: MeanKind,

    /// What happens to gauges after a flush
    #[arg(long = "gauge-policy", value_enum, default_value_t = GaugePolicy::Persist)]
    pub gauge_policy: GaugePolicy,

    /// Capacity of the queue between decoders and the aggregator
    #[arg(
        long = "queue-capacity",
        default_value = DEFAULT_QUEUE_CAPACITY,
        value_parser = parse_positive_usize
    )]
    pub queue_capacity: PositiveUsize,

    /// Behaviour when the ingestion queue is full
    #[arg(long = "overflow", value_enum, default_value_t = OverflowPolicy::Block)]
    pub overflow: OverflowPolicy,

    /// Do not emit packets_received / events_dropped counters
    #[arg(long = "no-self-metrics")]
    pub no_self_metrics: bool,

    /// Bucket prefix for the daemon's own counters
    #[arg(long = "self-prefix", default_value = DEFAULT_SELF_PREFIX)]
    pub self_prefix: String,

    /// Relay every received datagram, unmodified, to this UDP address
    #[arg(long = "fwd-to", env = "TALLYD_FWD_TO")]
    pub forward_to: Option<String>,

    /// Receive buffer size in bytes; longer datagrams are truncated
    #[arg(
        long = "max-datagram-size",
        default_value = DEFAULT_MAX_DATAGRAM_SIZE,
        value_parser = parse_positive_usize
    )]
    pub max_datagram_size: PositiveUsize,

    /// Deadline for each backend call (supports ms/s/m/h)
    #[arg(
        long = "backend-timeout",
        default_value = DEFAULT_BACKEND_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub backend_timeout: Duration,

    /// Graphite plaintext endpoint (host:port)
    #[arg(long = "graphite", env = "TALLYD_GRAPHITE")]
    pub graphite: Option<String>,

    /// Prefix for graphite metric paths
    #[arg(long = "graphite-prefix", default_value = DEFAULT_GRAPHITE_PREFIX)]
    pub graphite_prefix: String,

    /// Print buckets starting with this prefix to stdout ("" prints everything)
    #[arg(long = "console")]
    pub console: Option<String>,

    /// Append one JSON line per metric per flush to this file
    #[arg(long = "file-backend")]
    pub file_backend: Option<PathBuf>,

    #[arg(skip)]
    pub graphite_on_failure: Option<FailurePolicy>,

    #[arg(skip)]
    pub console_on_failure: Option<FailurePolicy>,

    #[arg(skip)]
    pub file_on_failure: Option<FailurePolicy>,

    /// Enable verbose logging (sets log level to debug unless overridden by TALLYD_LOG/RUST_LOG)
    #[arg(long = "verbose", short = 'v', visible_alias = "debug")]
    pub verbose: bool,

    /// Path to config file (TOML/JSON). Defaults to ./tallyd.toml or ./tallyd.json if present.
    #[arg(long = "config", short = 'c')]
    pub config: Option<String>,
}

impl DaemonArgs {
    #[must_use]
    pub const fn mean_mode(&self) -> MeanMode {
        match self.mean {
            MeanKind::Arithmetic => MeanMode::Arithmetic,
            MeanKind::Trimmed => MeanMode::Trimmed {
                percent_threshold: self.percent_threshold.get(),
            },
        }
    }

    #[must_use]
    pub fn self_metrics(&self) -> Option<SelfMetrics> {
        if self.no_self_metrics {
            return None;
        }
        Some(SelfMetrics {
            prefix: self.self_prefix.clone(),
        })
    }

    #[must_use]
    pub fn backend_settings(&self) -> BackendSettings {
        let graphite = self.graphite.as_ref().map(|address| {
            let mut settings = GraphiteSettings::new(address.clone());
            settings.prefix.clone_from(&self.graphite_prefix);
            if let Some(policy) = self.graphite_on_failure {
                settings.on_failure = policy;
            }
            settings
        });
        let console = self.console.as_ref().map(|prefix| {
            let mut settings = ConsoleSettings::new(prefix.clone());
            if let Some(policy) = self.console_on_failure {
                settings.on_failure = policy;
            }
            settings
        });
        let file = self.file_backend.as_ref().map(|path| {
            let mut settings = FileSettings::new(path.clone());
            if let Some(policy) = self.file_on_failure {
                settings.on_failure = policy;
            }
            settings
        });

        BackendSettings {
            timeout: self.backend_timeout,
            graphite,
            console,
            file,
        }
    }
}
