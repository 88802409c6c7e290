use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::backends::{DispatcherHandle, FlushResult};
use crate::error::{AppError, AppResult, BackendError};
use crate::protocol::{MetricEvent, SelfMetrics};
use crate::shutdown::ShutdownSender;

use super::{AggregationState, GaugePolicy, MeanMode};

/// Upper bound on draining already-queued events during shutdown.
const DRAIN_DEADLINE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub flush_interval: Duration,
    pub mean_mode: MeanMode,
    pub gauge_policy: GaugePolicy,
    pub self_metrics: Option<SelfMetrics>,
}

/// Totals reported by the collector when it stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectorReport {
    pub windows_flushed: u64,
    pub events_applied: u64,
    pub events_rejected: u64,
    pub ticks_coalesced: u64,
}

struct Collector {
    state: AggregationState,
    config: CollectorConfig,
    report: CollectorReport,
    dropped_events: Arc<AtomicU64>,
    dispatcher: DispatcherHandle,
    in_flight: Option<oneshot::Receiver<FlushResult>>,
    /// Intervals covered by the next flush; grows when a tick is coalesced.
    pending_windows: u32,
    last_flush: Instant,
}

impl Collector {
    fn new(
        config: CollectorConfig,
        dropped_events: Arc<AtomicU64>,
        dispatcher: DispatcherHandle,
    ) -> Self {
        Self {
            state: AggregationState::new(config.gauge_policy),
            config,
            report: CollectorReport::default(),
            dropped_events,
            dispatcher,
            in_flight: None,
            pending_windows: 1,
            last_flush: Instant::now(),
        }
    }

    fn apply(&mut self, event: MetricEvent) {
        match self.state.apply(event) {
            Ok(()) => {
                self.report.events_applied = self.report.events_applied.saturating_add(1);
            }
            Err(rejected) => {
                tracing::trace!("{}", rejected);
                self.report.events_rejected = self.report.events_rejected.saturating_add(1);
            }
        }
    }

    fn on_tick(&mut self) -> Result<(), BackendError> {
        if self.flush_in_progress()? {
            self.pending_windows = self.pending_windows.saturating_add(1);
            self.report.ticks_coalesced = self.report.ticks_coalesced.saturating_add(1);
            tracing::warn!(
                "Previous flush still running; folding this interval into the next window ({} intervals).",
                self.pending_windows
            );
            return Ok(());
        }

        let window = self
            .config
            .flush_interval
            .saturating_mul(self.pending_windows);
        self.pending_windows = 1;
        self.flush(window)
    }

    /// Checks the outstanding flush without waiting for it.
    fn flush_in_progress(&mut self) -> Result<bool, BackendError> {
        let Some(done_rx) = self.in_flight.as_mut() else {
            return Ok(false);
        };
        match done_rx.try_recv() {
            Ok(result) => {
                self.in_flight = None;
                log_flush_result(result)?;
                Ok(false)
            }
            Err(oneshot::error::TryRecvError::Empty) => Ok(true),
            Err(oneshot::error::TryRecvError::Closed) => {
                self.in_flight = None;
                Err(BackendError::DispatcherGone)
            }
        }
    }

    fn on_flush_done(
        &mut self,
        done: Result<FlushResult, oneshot::error::RecvError>,
    ) -> Result<(), BackendError> {
        self.in_flight = None;
        let result = done.map_err(|_err| BackendError::DispatcherGone)?;
        log_flush_result(result)
    }

    async fn wait_for_flush(&mut self) -> Result<(), BackendError> {
        let Some(done_rx) = self.in_flight.take() else {
            return Ok(());
        };
        let result = done_rx.await.map_err(|_err| BackendError::DispatcherGone)?;
        log_flush_result(result)
    }

    fn flush(&mut self, window: Duration) -> Result<(), BackendError> {
        let dropped = self.dropped_events.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            match self.config.self_metrics.as_ref() {
                Some(self_metrics) => self.state.add_counter(
                    self_metrics.events_dropped_bucket(),
                    i64::try_from(dropped).unwrap_or(i64::MAX),
                ),
                None => tracing::warn!("Ingestion queue full; dropped {} events.", dropped),
            }
        }

        let snapshot = self.state.take_snapshot(
            window,
            self.config.mean_mode,
            chrono::Utc::now().timestamp(),
        );
        tracing::debug!(
            "Flushing {} metrics over a {:?} window",
            snapshot.metric_count(),
            window
        );
        self.in_flight = Some(self.dispatcher.submit(snapshot)?);
        self.report.windows_flushed = self.report.windows_flushed.saturating_add(1);
        self.last_flush = Instant::now();
        Ok(())
    }

    async fn finish(
        mut self,
        events_rx: &mut mpsc::Receiver<MetricEvent>,
    ) -> Result<CollectorReport, BackendError> {
        let drain_deadline = Instant::now()
            .checked_add(DRAIN_DEADLINE)
            .unwrap_or_else(Instant::now);
        loop {
            if Instant::now() > drain_deadline {
                break;
            }
            match events_rx.try_recv() {
                Ok(event) => self.apply(event),
                Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
            }
        }

        self.wait_for_flush().await?;
        let window = self.last_flush.elapsed();
        self.flush(window)?;
        self.wait_for_flush().await?;
        Ok(self.report)
    }
}

/// Resolves with the outstanding flush result; never resolves when idle.
async fn flush_done(
    in_flight: &mut Option<oneshot::Receiver<FlushResult>>,
) -> Result<FlushResult, oneshot::error::RecvError> {
    match in_flight.as_mut() {
        Some(done_rx) => done_rx.await,
        None => std::future::pending().await,
    }
}

fn log_flush_result(result: FlushResult) -> Result<(), BackendError> {
    let report = result?;
    if report.failed_backends.is_empty() {
        tracing::debug!("Flushed {} metrics", report.metrics_emitted());
    } else {
        tracing::debug!(
            "Flushed {} metrics; skipped backends: {}",
            report.metrics_emitted(),
            report.failed_backends.join(", ")
        );
    }
    Ok(())
}

/// Spawn the task that owns the aggregation state.
///
/// The task applies queued events and flushes on every interval tick until
/// shutdown is broadcast or every producer is gone, then drains the queue and
/// performs a final flush. Flush results are read as soon as the dispatcher
/// reports them, so a fatal backend failure stops the task right away.
#[must_use]
pub fn setup_metrics_collector(
    config: CollectorConfig,
    shutdown_tx: &ShutdownSender,
    mut events_rx: mpsc::Receiver<MetricEvent>,
    dropped_events: Arc<AtomicU64>,
    dispatcher: DispatcherHandle,
) -> JoinHandle<AppResult<CollectorReport>> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::spawn(async move {
        let period = config.flush_interval;
        let mut collector = Collector::new(config, dropped_events, dispatcher);
        let first_tick = Instant::now()
            .checked_add(period)
            .unwrap_or_else(Instant::now);
        let mut flush_interval = tokio::time::interval_at(first_tick, period);
        flush_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let flush_pending = collector.in_flight.is_some();
            let step = tokio::select! {
                _ = shutdown_rx.recv() => break,
                maybe_event = events_rx.recv() => {
                    match maybe_event {
                        Some(event) => {
                            collector.apply(event);
                            Ok(())
                        }
                        None => break,
                    }
                },
                done = flush_done(&mut collector.in_flight), if flush_pending => {
                    collector.on_flush_done(done)
                },
                _ = flush_interval.tick() => collector.on_tick(),
            };
            if let Err(err) = step {
                tracing::error!("Flush failed: {}", err);
                drop(shutdown_tx.send(()));
                return Err(AppError::backend(err));
            }
        }

        match collector.finish(&mut events_rx).await {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::error!("Final flush failed: {}", err);
                drop(shutdown_tx.send(()));
                Err(AppError::backend(err))
            }
        }
    })
}
