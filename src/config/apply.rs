use std::path::PathBuf;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{DaemonArgs, PercentThreshold, PositiveUsize};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{BackendsConfig, ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments.
///
/// A value from the file is used only when the matching flag was not given
/// on the command line.
///
/// # Errors
///
/// Returns an error when a config value is out of range.
pub fn apply_config(
    args: &mut DaemonArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    apply_server_config(args, matches, config)?;
    apply_aggregation_config(args, matches, config)?;
    if let Some(backends) = config.backends.as_ref() {
        apply_backends_config(args, matches, backends)?;
    }
    Ok(())
}

fn apply_server_config(
    args: &mut DaemonArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "address")
        && let Some(address) = config.address.clone()
    {
        args.address = address;
    }

    if !is_cli(matches, "queue_capacity")
        && let Some(capacity) = config.queue_capacity
    {
        args.queue_capacity = ensure_positive_usize(capacity, "queue_capacity")?;
    }

    if !is_cli(matches, "overflow")
        && let Some(overflow) = config.overflow
    {
        args.overflow = overflow;
    }

    if !is_cli(matches, "max_datagram_size")
        && let Some(size) = config.max_datagram_size
    {
        args.max_datagram_size = ensure_positive_usize(size, "max_datagram_size")?;
    }

    if !is_cli(matches, "forward_to")
        && let Some(target) = config.forward_to.clone()
    {
        args.forward_to = Some(target);
    }

    if !is_cli(matches, "no_self_metrics")
        && let Some(enabled) = config.self_metrics
    {
        args.no_self_metrics = !enabled;
    }

    if !is_cli(matches, "self_prefix")
        && let Some(prefix) = config.self_prefix.clone()
    {
        args.self_prefix = prefix;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    Ok(())
}

fn apply_aggregation_config(
    args: &mut DaemonArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "flush_interval")
        && let Some(interval) = config.flush_interval.as_ref()
    {
        args.flush_interval = to_duration(interval, "flush_interval")?;
    }

    if !is_cli(matches, "percent_threshold")
        && let Some(threshold) = config.percent_threshold
    {
        args.percent_threshold = PercentThreshold::try_from(threshold).map_err(|_err| {
            AppError::config(ConfigError::PercentThresholdOutOfRange { value: threshold })
        })?;
    }

    if !is_cli(matches, "mean")
        && let Some(mean) = config.mean
    {
        args.mean = mean;
    }

    if !is_cli(matches, "gauge_policy")
        && let Some(policy) = config.gauge_policy
    {
        args.gauge_policy = policy;
    }

    Ok(())
}

fn apply_backends_config(
    args: &mut DaemonArgs,
    matches: &ArgMatches,
    config: &BackendsConfig,
) -> AppResult<()> {
    if !is_cli(matches, "backend_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.backend_timeout = to_duration(timeout, "backends.timeout")?;
    }

    if let Some(graphite) = config.graphite.as_ref() {
        if !is_cli(matches, "graphite")
            && let Some(address) = graphite.address.clone()
        {
            args.graphite = Some(address);
        }
        if !is_cli(matches, "graphite_prefix")
            && let Some(prefix) = graphite.prefix.clone()
        {
            args.graphite_prefix = prefix;
        }
        if graphite.on_failure.is_some() {
            args.graphite_on_failure = graphite.on_failure;
        }
    }

    if let Some(console) = config.console.as_ref() {
        if !is_cli(matches, "console") {
            args.console = Some(console.prefix.clone().unwrap_or_default());
        }
        if console.on_failure.is_some() {
            args.console_on_failure = console.on_failure;
        }
    }

    if let Some(file) = config.file.as_ref() {
        if !is_cli(matches, "file_backend") {
            let path = file.path.as_ref().ok_or_else(|| {
                AppError::config(ConfigError::InvalidField {
                    field: "backends.file.path",
                    message: "a path is required when [backends.file] is present".to_owned(),
                })
            })?;
            args.file_backend = Some(PathBuf::from(path));
        }
        if file.on_failure.is_some() {
            args.file_on_failure = file.on_failure;
        }
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|_err| AppError::config(ConfigError::FieldMustBePositive { field }))
}

fn to_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value.to_duration().map_err(|err| {
        AppError::config(ConfigError::InvalidField {
            field,
            message: err.to_string(),
        })
    })
}
