use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{BackendError, BackendOperation};
use crate::metrics::TimerDistribution;

use super::Backend;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Begin,
    Counter {
        name: String,
        count: i64,
        rate_per_second: f64,
    },
    Gauge {
        name: String,
        value: f64,
    },
    Timing {
        name: String,
        distribution: TimerDistribution,
    },
    End,
}

pub(crate) type CallLog = Arc<Mutex<Vec<Call>>>;

/// Backend that records every call and can be told to misbehave.
pub(crate) struct RecordingBackend {
    name: &'static str,
    calls: CallLog,
    fail_on: Option<BackendOperation>,
    stall_on: Option<(BackendOperation, Duration)>,
}

impl RecordingBackend {
    pub(crate) fn new(name: &'static str) -> (Self, CallLog) {
        let calls = CallLog::default();
        (
            Self {
                name,
                calls: Arc::clone(&calls),
                fail_on: None,
                stall_on: None,
            },
            calls,
        )
    }

    pub(crate) const fn failing_on(mut self, operation: BackendOperation) -> Self {
        self.fail_on = Some(operation);
        self
    }

    pub(crate) const fn stalling_on(
        mut self,
        operation: BackendOperation,
        delay: Duration,
    ) -> Self {
        self.stall_on = Some((operation, delay));
        self
    }

    async fn record(
        &mut self,
        operation: BackendOperation,
        call: Call,
    ) -> Result<(), BackendError> {
        if let Some((stall, delay)) = self.stall_on
            && stall == operation
        {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on == Some(operation) {
            return Err(BackendError::NotConnected);
        }
        self.calls
            .lock()
            .map_err(|_err| BackendError::TestExpectation {
                message: "call log poisoned",
            })?
            .push(call);
        Ok(())
    }
}

pub(crate) fn snapshot_calls(calls: &CallLog) -> Result<Vec<Call>, String> {
    calls
        .lock()
        .map(|guard| guard.clone())
        .map_err(|_err| "call log poisoned".to_owned())
}

#[async_trait]
impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        self.name
    }

    async fn begin_aggregation(&mut self) -> Result<(), BackendError> {
        self.record(BackendOperation::Begin, Call::Begin).await
    }

    async fn handle_counter(
        &mut self,
        name: &str,
        count: i64,
        rate_per_second: f64,
    ) -> Result<(), BackendError> {
        self.record(
            BackendOperation::Counter,
            Call::Counter {
                name: name.to_owned(),
                count,
                rate_per_second,
            },
        )
        .await
    }

    async fn handle_gauge(&mut self, name: &str, value: f64) -> Result<(), BackendError> {
        self.record(
            BackendOperation::Gauge,
            Call::Gauge {
                name: name.to_owned(),
                value,
            },
        )
        .await
    }

    async fn handle_timing(
        &mut self,
        name: &str,
        distribution: &TimerDistribution,
    ) -> Result<(), BackendError> {
        self.record(
            BackendOperation::Timing,
            Call::Timing {
                name: name.to_owned(),
                distribution: *distribution,
            },
        )
        .await
    }

    async fn end_aggregation(&mut self) -> Result<(), BackendError> {
        self.record(BackendOperation::End, Call::End).await
    }
}
