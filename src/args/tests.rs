use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::*;
use crate::backends::FailurePolicy;
use crate::error::{AppError, AppResult};
use crate::metrics::{GaugePolicy, MeanMode};
use crate::server::OverflowPolicy;

fn parse_test_args<I, T>(args: I) -> AppResult<DaemonArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    DaemonArgs::try_parse_from(args).map_err(AppError::from)
}

#[test]
fn parse_args_defaults() -> AppResult<()> {
    let args = parse_test_args(["tallyd"])?;

    let checks = [
        (
            args.address == "0.0.0.0:8125" || std::env::var("TALLYD_ADDRESS").is_ok(),
            "Unexpected address",
        ),
        (
            args.flush_interval == Duration::from_secs(10),
            "Unexpected flush interval",
        ),
        (args.percent_threshold.get() == 90, "Unexpected threshold"),
        (args.mean == MeanKind::Arithmetic, "Expected arithmetic mean"),
        (
            args.gauge_policy == GaugePolicy::Persist,
            "Expected persistent gauges",
        ),
        (args.queue_capacity.get() == 10_000, "Unexpected capacity"),
        (args.overflow == OverflowPolicy::Block, "Expected block"),
        (!args.no_self_metrics, "Self metrics should be on"),
        (args.self_prefix == "tallyd", "Unexpected self prefix"),
        (args.max_datagram_size.get() == 8192, "Unexpected datagram size"),
        (
            args.backend_timeout == Duration::from_secs(5),
            "Unexpected backend timeout",
        ),
        (args.console.is_none(), "Console should be off"),
        (args.file_backend.is_none(), "File backend should be off"),
        (!args.verbose, "Verbose should be off"),
        (args.config.is_none(), "Config should be unset"),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(AppError::validation(message));
        }
    }
    Ok(())
}

#[test]
fn parse_args_overrides() -> AppResult<()> {
    let args = parse_test_args([
        "tallyd",
        "--address",
        "127.0.0.1:9125",
        "--flush-interval",
        "500ms",
        "--mean",
        "trimmed",
        "--percent-threshold",
        "75",
        "--gauge-policy",
        "clear",
        "--overflow",
        "drop",
        "--queue-capacity",
        "16",
        "--no-self-metrics",
        "--fwd-to",
        "127.0.0.1:8126",
        "--debug",
    ])?;

    let checks = [
        (args.address == "127.0.0.1:9125", "Unexpected address"),
        (
            args.flush_interval == Duration::from_millis(500),
            "Unexpected flush interval",
        ),
        (
            args.mean_mode()
                == MeanMode::Trimmed {
                    percent_threshold: 75,
                },
            "Unexpected mean mode",
        ),
        (args.gauge_policy == GaugePolicy::Clear, "Expected clear"),
        (args.overflow == OverflowPolicy::Drop, "Expected drop"),
        (args.queue_capacity.get() == 16, "Unexpected capacity"),
        (args.self_metrics().is_none(), "Self metrics should be off"),
        (
            args.forward_to.as_deref() == Some("127.0.0.1:8126"),
            "Unexpected forward target",
        ),
        (args.verbose, "--debug should enable verbose"),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(AppError::validation(message));
        }
    }
    Ok(())
}

#[test]
fn bare_number_interval_is_seconds() -> AppResult<()> {
    let args = parse_test_args(["tallyd", "--flush-interval", "2"])?;
    if args.flush_interval != Duration::from_secs(2) {
        return Err(AppError::validation(format!(
            "Unexpected interval {:?}",
            args.flush_interval
        )));
    }
    Ok(())
}

#[test]
fn invalid_values_are_rejected() -> AppResult<()> {
    let cases: [&[&str]; 6] = [
        &["tallyd", "--flush-interval", "0s"],
        &["tallyd", "--flush-interval", "soon"],
        &["tallyd", "--percent-threshold", "0"],
        &["tallyd", "--percent-threshold", "101"],
        &["tallyd", "--queue-capacity", "0"],
        &["tallyd", "--overflow", "spill"],
    ];
    for case in cases {
        if parse_test_args(case.iter().copied()).is_ok() {
            return Err(AppError::validation(format!("Expected failure for {:?}", case)));
        }
    }
    Ok(())
}

#[test]
fn backend_settings_follow_flags() -> AppResult<()> {
    let mut args = parse_test_args([
        "tallyd",
        "--graphite",
        "graphite.local:2003",
        "--graphite-prefix",
        "prod",
        "--console",
        "app.",
        "--file-backend",
        "/tmp/tallyd.jsonl",
        "--backend-timeout",
        "2s",
    ])?;
    args.file_on_failure = Some(FailurePolicy::Isolate);

    let settings = args.backend_settings();
    let graphite = settings
        .graphite
        .ok_or_else(|| AppError::validation("Missing graphite settings"))?;
    let console = settings
        .console
        .ok_or_else(|| AppError::validation("Missing console settings"))?;
    let file = settings
        .file
        .ok_or_else(|| AppError::validation("Missing file settings"))?;

    let checks = [
        (settings.timeout == Duration::from_secs(2), "Unexpected timeout"),
        (graphite.address == "graphite.local:2003", "Unexpected address"),
        (graphite.prefix == "prod", "Unexpected prefix"),
        (
            graphite.on_failure == FailurePolicy::Isolate,
            "Graphite should isolate by default",
        ),
        (console.prefix == "app.", "Unexpected console prefix"),
        (file.path == PathBuf::from("/tmp/tallyd.jsonl"), "Unexpected path"),
        (
            file.on_failure == FailurePolicy::Isolate,
            "File policy override ignored",
        ),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(AppError::validation(message));
        }
    }
    Ok(())
}

#[test]
fn percent_threshold_bounds() -> Result<(), String> {
    for value in [1u64, 50, 100] {
        let parsed = PercentThreshold::try_from(value).map_err(|err| err.to_string())?;
        if u64::from(parsed.get()) != value {
            return Err(format!("Round trip failed for {}", value));
        }
    }
    for value in [0u64, 101, 1000] {
        if PercentThreshold::try_from(value).is_ok() {
            return Err(format!("Expected {} to be rejected", value));
        }
    }
    Ok(())
}
