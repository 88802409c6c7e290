use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// The lifecycle step a backend was executing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendOperation {
    Begin,
    Counter,
    Gauge,
    Timing,
    End,
}

impl BackendOperation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            BackendOperation::Begin => "begin_aggregation",
            BackendOperation::Counter => "handle_counter",
            BackendOperation::Gauge => "handle_gauge",
            BackendOperation::Timing => "handle_timing",
            BackendOperation::End => "end_aggregation",
        }
    }
}

impl fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to connect to '{address}': {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Backend is not connected.")]
    NotConnected,
    #[error("Failed to write {target}: {source}")]
    Write {
        target: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize record: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to format line: {source}")]
    Format {
        #[source]
        source: std::fmt::Error,
    },
    #[error("Backend '{backend}' timed out after {timeout:?} during {operation}.")]
    Timeout {
        backend: String,
        operation: BackendOperation,
        timeout: Duration,
    },
    #[error("Backend '{backend}' failed fatally during {operation}: {source}")]
    Fatal {
        backend: String,
        operation: BackendOperation,
        #[source]
        source: Box<BackendError>,
    },
    #[error("Flush dispatcher stopped unexpectedly.")]
    DispatcherGone,
    /// A snapshot was submitted while another one was still waiting to be
    /// picked up. The collector awaits every flush result before submitting
    /// again, so only direct users of `DispatcherHandle` can hit this.
    #[error("Flush dispatcher is still busy with the previous window.")]
    DispatcherBusy,
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
