use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::error::{BackendError, BackendOperation};
use crate::metrics::{CounterValue, FlushSnapshot, TimerDistribution};

use super::{Backend, FailurePolicy};

/// One snapshot in flight at a time; the collector coalesces ticks instead of
/// queueing more.
const FLUSH_CHANNEL_CAPACITY: usize = 1;

pub type FlushResult = Result<FlushReport, BackendError>;

/// Outcome of a single flush cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub counters: usize,
    pub gauges: usize,
    pub timers: usize,
    /// Backends that were skipped for part of the cycle.
    pub failed_backends: Vec<String>,
}

impl FlushReport {
    #[must_use]
    pub const fn metrics_emitted(&self) -> usize {
        self.counters
            .saturating_add(self.gauges)
            .saturating_add(self.timers)
    }
}

#[derive(Clone, Copy)]
enum Step<'a> {
    Begin,
    Counter(&'a str, &'a CounterValue),
    Gauge(&'a str, f64),
    Timing(&'a str, &'a TimerDistribution),
    End,
}

impl Step<'_> {
    const fn operation(self) -> BackendOperation {
        match self {
            Step::Begin => BackendOperation::Begin,
            Step::Counter(..) => BackendOperation::Counter,
            Step::Gauge(..) => BackendOperation::Gauge,
            Step::Timing(..) => BackendOperation::Timing,
            Step::End => BackendOperation::End,
        }
    }
}

struct RegisteredBackend {
    backend: Box<dyn Backend>,
    policy: FailurePolicy,
}

impl RegisteredBackend {
    async fn run(&mut self, step: Step<'_>, timeout: Duration) -> Result<(), BackendError> {
        let call = async {
            match step {
                Step::Begin => self.backend.begin_aggregation().await,
                Step::Counter(name, value) => {
                    self.backend
                        .handle_counter(name, value.count, value.rate_per_second)
                        .await
                }
                Step::Gauge(name, value) => self.backend.handle_gauge(name, value).await,
                Step::Timing(name, distribution) => {
                    self.backend.handle_timing(name, distribution).await
                }
                Step::End => self.backend.end_aggregation().await,
            }
        };
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout {
                backend: self.backend.name().to_owned(),
                operation: step.operation(),
                timeout,
            }),
        }
    }
}

/// Per-cycle bookkeeping of which backends are still being driven.
struct Cycle {
    skipped: Vec<bool>,
    failures: Failures,
}

impl Cycle {
    fn new(backends: usize) -> Self {
        Self {
            skipped: vec![false; backends],
            failures: Failures::default(),
        }
    }
}

#[derive(Default)]
struct Failures {
    failed_backends: Vec<String>,
    fatal: Option<BackendError>,
}

impl Failures {
    fn record(
        &mut self,
        entry: &RegisteredBackend,
        err: BackendError,
        operation: BackendOperation,
    ) {
        let name = entry.backend.name().to_owned();
        match entry.policy {
            FailurePolicy::Isolate => {
                tracing::warn!(
                    "Backend '{}' failed during {}: {}; skipping it for this flush.",
                    name,
                    operation,
                    err
                );
            }
            FailurePolicy::Fatal => {
                tracing::error!("Backend '{}' failed during {}: {}", name, operation, err);
                if self.fatal.is_none() {
                    self.fatal = Some(BackendError::Fatal {
                        backend: name.clone(),
                        operation,
                        source: Box::new(err),
                    });
                }
            }
        }
        self.failed_backends.push(name);
    }
}

/// Drives every registered backend through a flush cycle in registration
/// order.
pub struct BackendDispatcher {
    backends: Vec<RegisteredBackend>,
    timeout: Duration,
}

impl BackendDispatcher {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            backends: Vec::new(),
            timeout,
        }
    }

    pub fn register(&mut self, backend: Box<dyn Backend>, policy: FailurePolicy) {
        tracing::info!(
            "Registered backend '{}' (on failure: {})",
            backend.name(),
            policy.as_str()
        );
        self.backends.push(RegisteredBackend { backend, policy });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.backends
            .iter()
            .map(|entry| entry.backend.name())
            .collect()
    }

    /// Emit one snapshot to every backend.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Fatal`] when a backend registered with
    /// [`FailurePolicy::Fatal`] failed. The other backends still receive the
    /// complete cycle before the error is returned.
    pub async fn dispatch(&mut self, snapshot: &FlushSnapshot) -> FlushResult {
        let mut cycle = Cycle::new(self.backends.len());

        self.run_step(&mut cycle, Step::Begin).await;
        for (name, value) in &snapshot.counters {
            self.run_step(&mut cycle, Step::Counter(name, value)).await;
        }
        for (name, value) in &snapshot.gauges {
            self.run_step(&mut cycle, Step::Gauge(name, *value)).await;
        }
        for (name, distribution) in &snapshot.timers {
            self.run_step(&mut cycle, Step::Timing(name, distribution)).await;
        }
        self.run_step(&mut cycle, Step::End).await;

        if let Some(err) = cycle.failures.fatal {
            return Err(err);
        }
        Ok(FlushReport {
            counters: snapshot.counters.len(),
            gauges: snapshot.gauges.len(),
            timers: snapshot.timers.len(),
            failed_backends: cycle.failures.failed_backends,
        })
    }

    async fn run_step(&mut self, cycle: &mut Cycle, step: Step<'_>) {
        let timeout = self.timeout;
        for (entry, skipped) in self.backends.iter_mut().zip(cycle.skipped.iter_mut()) {
            if *skipped {
                continue;
            }
            if let Err(err) = entry.run(step, timeout).await {
                *skipped = true;
                cycle.failures.record(entry, err, step.operation());
            }
        }
    }
}

struct FlushRequest {
    snapshot: FlushSnapshot,
    done_tx: oneshot::Sender<FlushResult>,
}

/// Sending half of the dispatcher task.
#[derive(Clone)]
pub struct DispatcherHandle {
    requests_tx: mpsc::Sender<FlushRequest>,
}

impl DispatcherHandle {
    /// Hand a snapshot to the dispatcher task without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::DispatcherBusy`] when a previous snapshot has
    /// not been picked up yet, or [`BackendError::DispatcherGone`] when the
    /// task has stopped.
    pub fn submit(
        &self,
        snapshot: FlushSnapshot,
    ) -> Result<oneshot::Receiver<FlushResult>, BackendError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.requests_tx
            .try_send(FlushRequest { snapshot, done_tx })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => BackendError::DispatcherBusy,
                mpsc::error::TrySendError::Closed(_) => BackendError::DispatcherGone,
            })?;
        Ok(done_rx)
    }
}

/// Move the dispatcher onto its own task so backend I/O never blocks
/// aggregation. The task ends once every handle is dropped.
#[must_use]
pub fn spawn_dispatcher(mut dispatcher: BackendDispatcher) -> (DispatcherHandle, JoinHandle<()>) {
    let (requests_tx, mut requests_rx) = mpsc::channel::<FlushRequest>(FLUSH_CHANNEL_CAPACITY);
    let handle = tokio::spawn(async move {
        while let Some(request) = requests_rx.recv().await {
            let result = dispatcher.dispatch(&request.snapshot).await;
            if request.done_tx.send(result).is_err() {
                tracing::debug!("Flush result dropped; collector already stopped.");
            }
        }
    });
    (DispatcherHandle { requests_tx }, handle)
}
