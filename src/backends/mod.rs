mod config;
mod console;
mod dispatcher;
mod file;
mod format;
mod graphite;
mod registry;
mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{
    BackendSettings, ConsoleSettings, DEFAULT_BACKEND_TIMEOUT, DEFAULT_GRAPHITE_PREFIX,
    FailurePolicy, FileSettings, GraphiteSettings,
};
pub use console::ConsoleBackend;
pub use dispatcher::{
    BackendDispatcher, DispatcherHandle, FlushReport, FlushResult, spawn_dispatcher,
};
pub use file::FileBackend;
pub use graphite::GraphiteBackend;
pub use registry::build_dispatcher;
pub use traits::Backend;
