use super::{
    BackendDispatcher, BackendSettings, ConsoleBackend, FileBackend, GraphiteBackend,
};

/// Instantiate every configured backend, in a fixed order: graphite, console,
/// file.
#[must_use]
pub fn build_dispatcher(settings: &BackendSettings) -> BackendDispatcher {
    let mut dispatcher = BackendDispatcher::new(settings.timeout);

    if let Some(graphite) = settings.graphite.as_ref() {
        dispatcher.register(Box::new(GraphiteBackend::new(graphite)), graphite.on_failure);
    }
    if let Some(console) = settings.console.as_ref() {
        dispatcher.register(Box::new(ConsoleBackend::stdout(console)), console.on_failure);
    }
    if let Some(file) = settings.file.as_ref() {
        dispatcher.register(Box::new(FileBackend::new(file)), file.on_failure);
    }

    if dispatcher.is_empty() {
        tracing::warn!("No backends configured; aggregated metrics will be lost.");
    }
    dispatcher
}
