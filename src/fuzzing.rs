use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::{DaemonArgs, PercentThreshold};
use crate::config::types::ConfigFile;
use crate::config::{apply_config, parse_duration_value};
use crate::error::{AppError, AppResult};
use crate::metrics::{
    AggregationState, FlushSnapshot, GaugePolicy, MeanMode, TimerDistribution, summarize,
};
use crate::protocol::{MetricEvent, decode};

/// Window used when fuzzing the aggregation path.
const FUZZ_WINDOW: Duration = Duration::from_secs(10);

thread_local! {
    static BASE_MATCHES: ArgMatches = DaemonArgs::command().get_matches_from(["tallyd"]);
}

/// Decodes a raw datagram payload.
#[must_use]
pub fn decode_payload_input(payload: &[u8]) -> Vec<MetricEvent> {
    decode(payload)
}

/// Decodes a payload, applies every event, and takes one snapshot.
#[must_use]
pub fn aggregate_payload_input(payload: &[u8], gauge_policy: GaugePolicy) -> FlushSnapshot {
    let mut state = AggregationState::new(gauge_policy);
    for event in decode(payload) {
        let _rejected = state.apply(event);
    }
    state.take_snapshot(FUZZ_WINDOW, MeanMode::Arithmetic, 0)
}

/// Reduces samples with an optional trimmed-mean threshold.
#[must_use]
pub fn summarize_samples_input(
    samples: Vec<f64>,
    percent_threshold: Option<u8>,
) -> TimerDistribution {
    let mean_mode = percent_threshold
        .and_then(|threshold| PercentThreshold::try_from(u64::from(threshold)).ok())
        .map_or(MeanMode::Arithmetic, |threshold| MeanMode::Trimmed {
            percent_threshold: threshold.get(),
        });
    summarize(samples, FUZZ_WINDOW, mean_mode)
}

/// Parses a duration value from config.
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_value_input(input: &str) -> AppResult<Duration> {
    parse_duration_value(input).map_err(AppError::validation)
}

/// Parses TOML config and applies it to defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_toml(input: &str) -> AppResult<DaemonArgs> {
    let config: ConfigFile = toml::from_str(input)?;
    apply_config_to_defaults(&config)
}

/// Parses JSON config and applies it to defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_json(input: &[u8]) -> AppResult<DaemonArgs> {
    let config: ConfigFile = serde_json::from_slice(input)?;
    apply_config_to_defaults(&config)
}

fn apply_config_to_defaults(config: &ConfigFile) -> AppResult<DaemonArgs> {
    BASE_MATCHES.with(|matches| {
        let mut args = DaemonArgs::from_arg_matches(matches)?;
        apply_config(&mut args, matches, config)?;
        Ok(args)
    })
}
