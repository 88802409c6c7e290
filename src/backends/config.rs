use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

/// Per-call deadline applied to every backend method.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_GRAPHITE_PREFIX: &str = "stats";

/// What the dispatcher does when a backend call fails or times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log a warning and skip the backend for the rest of the cycle.
    Isolate,
    /// Finish the cycle for the other backends, then stop the daemon.
    Fatal,
}

impl FailurePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailurePolicy::Isolate => "isolate",
            FailurePolicy::Fatal => "fatal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphiteSettings {
    pub address: String,
    pub prefix: String,
    pub on_failure: FailurePolicy,
}

impl GraphiteSettings {
    #[must_use]
    pub fn new(address: String) -> Self {
        Self {
            address,
            prefix: DEFAULT_GRAPHITE_PREFIX.to_owned(),
            on_failure: FailurePolicy::Isolate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub prefix: String,
    pub on_failure: FailurePolicy,
}

impl ConsoleSettings {
    #[must_use]
    pub const fn new(prefix: String) -> Self {
        Self {
            prefix,
            on_failure: FailurePolicy::Isolate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSettings {
    pub path: PathBuf,
    pub on_failure: FailurePolicy,
}

impl FileSettings {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            on_failure: FailurePolicy::Fatal,
        }
    }
}

/// Resolved backend configuration after CLI and config file are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub timeout: Duration,
    pub graphite: Option<GraphiteSettings>,
    pub console: Option<ConsoleSettings>,
    pub file: Option<FileSettings>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_BACKEND_TIMEOUT,
            graphite: None,
            console: None,
            file: None,
        }
    }
}
