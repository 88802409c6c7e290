
use std::future::Future;
use std::net::UdpSocket;
use std::time::Duration;

use clap::Parser;
use tempfile::tempdir;

use support_graphite::{run_tallyd, spawn_graphite_server};
use tallyd::app::Daemon;
use tallyd::args::DaemonArgs;

const LINE_TIMEOUT: Duration = Duration::from_secs(5);

fn run_async<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn daemon_args(extra: &[&str]) -> Result<DaemonArgs, String> {
    let mut args = vec!["tallyd", "--address", "127.0.0.1:0"];
    args.extend_from_slice(extra);
    DaemonArgs::try_parse_from(args).map_err(|err| format!("args rejected: {}", err))
}

fn send_datagrams(target: std::net::SocketAddr, payloads: &[&[u8]]) -> Result<(), String> {
    let client =
        UdpSocket::bind("127.0.0.1:0").map_err(|err| format!("client bind failed: {}", err))?;
    for payload in payloads {
        client
            .send_to(payload, target)
            .map_err(|err| format!("send failed: {}", err))?;
    }
    Ok(())
}

fn line_value(line: &str) -> Result<f64, String> {
    line.split_whitespace()
        .nth(1)
        .ok_or_else(|| format!("Malformed line '{}'", line))?
        .parse::<f64>()
        .map_err(|err| format!("Bad value in '{}': {}", line, err))
}

#[test]
fn e2e_daemon_flushes_to_graphite() -> Result<(), String> {
    let graphite = spawn_graphite_server()?;
    let args = daemon_args(&[
        "--flush-interval",
        "200ms",
        "--graphite",
        graphite.address(),
    ])?;

    run_async(async move {
        let daemon = Daemon::start(&args)
            .await
            .map_err(|err| format!("start failed: {}", err))?;
        send_datagrams(
            daemon.local_addr(),
            &[
                b"app.hits:1|c|@0.1\napp.temp:5|g",
                b"app.latency:10|ms\napp.latency:30|ms",
            ],
        )?;

        let hits = tokio::task::spawn_blocking(move || {
            let hits = graphite.wait_for_line("stats_counts.app.hits 10 ", LINE_TIMEOUT)?;
            graphite.wait_for_line("stats.gauges.app.temp 5 ", LINE_TIMEOUT)?;
            let upper = graphite.wait_for_line("stats.timers.app.latency.upper ", LINE_TIMEOUT)?;
            let count = graphite.wait_for_line("stats.timers.app.latency.count ", LINE_TIMEOUT)?;
            graphite.wait_for_line("stats_counts.tallyd.packets_received ", LINE_TIMEOUT)?;
            if (line_value(&upper)? - 30.0).abs() > f64::EPSILON {
                return Err(format!("Unexpected upper line '{}'", upper));
            }
            if (line_value(&count)? - 2.0).abs() > f64::EPSILON {
                return Err(format!("Unexpected count line '{}'", count));
            }
            Ok::<String, String>(hits)
        })
        .await
        .map_err(|err| format!("join failed: {}", err))??;
        if hits.split_whitespace().count() != 3 {
            return Err(format!("Expected a timestamp in '{}'", hits));
        }

        daemon.shutdown();
        let report = daemon
            .wait()
            .await
            .map_err(|err| format!("daemon failed: {}", err))?;
        if report.listener.datagrams_received != 2 {
            return Err(format!("Unexpected report: {:?}", report));
        }
        if report.collector.windows_flushed < 2 {
            return Err(format!("Expected periodic and final flush: {:?}", report));
        }
        Ok(())
    })
}

#[test]
fn e2e_daemon_final_flush_writes_file_backend() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("metrics.jsonl");
    let path_arg = path.to_string_lossy().into_owned();
    let args = daemon_args(&[
        "--flush-interval",
        "1h",
        "--file-backend",
        &path_arg,
        "--no-self-metrics",
    ])?;

    run_async(async move {
        let daemon = Daemon::start(&args)
            .await
            .map_err(|err| format!("start failed: {}", err))?;
        send_datagrams(daemon.local_addr(), &[b"jobs.done:3|c\njobs.done:4|c"])?;
        tokio::time::sleep(Duration::from_millis(300)).await;

        daemon.shutdown();
        let report = daemon
            .wait()
            .await
            .map_err(|err| format!("daemon failed: {}", err))?;
        if report.collector.windows_flushed != 1 || report.collector.events_applied != 2 {
            return Err(format!("Unexpected report: {:?}", report));
        }
        Ok(())
    })?;

    let contents =
        std::fs::read_to_string(&path).map_err(|err| format!("read failed: {}", err))?;
    let record: serde_json::Value = contents
        .lines()
        .next()
        .ok_or_else(|| "metrics file is empty".to_owned())
        .and_then(|line| serde_json::from_str(line).map_err(|err| err.to_string()))?;
    if record.get("type").and_then(serde_json::Value::as_str) != Some("counter")
        || record.get("name").and_then(serde_json::Value::as_str) != Some("jobs.done")
        || record.get("count").and_then(serde_json::Value::as_i64) != Some(7)
    {
        return Err(format!("Unexpected record: {}", record));
    }
    Ok(())
}

#[test]
fn e2e_daemon_rejects_unbindable_address() -> Result<(), String> {
    let args = DaemonArgs::try_parse_from(["tallyd", "--address", "not-an-address"])
        .map_err(|err| format!("args rejected: {}", err))?;
    run_async(async move {
        match Daemon::start(&args).await {
            Ok(_) => Err("Expected bind failure".to_owned()),
            Err(_err) => Ok(()),
        }
    })
}

#[test]
fn e2e_cli_version() -> Result<(), String> {
    let output = run_tallyd(["--version"])?;
    if !output.status.success() {
        return Err(format!("Non-zero exit: {:?}", output.status));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("tallyd") {
        return Err(format!("Unexpected version output: {}", stdout));
    }
    Ok(())
}

#[test]
fn e2e_cli_rejects_bad_threshold() -> Result<(), String> {
    let output = run_tallyd(["--percent-threshold", "0"])?;
    if output.status.success() {
        return Err("Expected failure for --percent-threshold 0".to_owned());
    }
    Ok(())
}
