use std::net::SocketAddr;

use tokio::task::JoinHandle;

use crate::args::DaemonArgs;
use crate::backends::{build_dispatcher, spawn_dispatcher};
use crate::error::AppResult;
use crate::metrics::{CollectorConfig, CollectorReport, setup_metrics_collector};
use crate::server::{
    Forwarder, ListenerConfig, ListenerReport, bind_listener, ingest_channel, spawn_listener,
};
use crate::shutdown::ShutdownSender;
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};

/// Totals gathered from every task once the daemon has stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonReport {
    pub collector: CollectorReport,
    pub listener: ListenerReport,
}

/// A running daemon: listener, collector and dispatcher tasks sharing one
/// shutdown broadcast.
pub struct Daemon {
    local_addr: SocketAddr,
    shutdown_tx: ShutdownSender,
    listener: JoinHandle<ListenerReport>,
    collector: JoinHandle<AppResult<CollectorReport>>,
    dispatcher: JoinHandle<()>,
}

impl Daemon {
    /// Bind the socket and spawn every task.
    ///
    /// # Errors
    ///
    /// Returns an error when the listen address cannot be bound or the
    /// forwarding target cannot be resolved.
    pub async fn start(args: &DaemonArgs) -> AppResult<Self> {
        let (shutdown_tx, _) = shutdown_channel();

        let socket = bind_listener(&args.address).await?;
        let local_addr = socket.local_addr()?;
        let forwarder = match args.forward_to.as_deref() {
            Some(target) => Some(Forwarder::connect(target).await?),
            None => None,
        };

        let dispatcher = build_dispatcher(&args.backend_settings());
        tracing::info!(
            "Flushing every {:?} to [{}]",
            args.flush_interval,
            dispatcher.names().join(", ")
        );
        let (dispatcher_handle, dispatcher) = spawn_dispatcher(dispatcher);

        let (sender, events_rx, dropped_events) =
            ingest_channel(args.queue_capacity.get(), args.overflow);
        tracing::debug!(
            "Ingestion queue holds {} events (overflow: {})",
            args.queue_capacity.get(),
            args.overflow.as_str()
        );

        let collector = setup_metrics_collector(
            CollectorConfig {
                flush_interval: args.flush_interval,
                mean_mode: args.mean_mode(),
                gauge_policy: args.gauge_policy,
                self_metrics: args.self_metrics(),
            },
            &shutdown_tx,
            events_rx,
            dropped_events,
            dispatcher_handle,
        );

        let listener = spawn_listener(
            socket,
            ListenerConfig {
                max_datagram_size: args.max_datagram_size.get(),
                self_metrics: args.self_metrics(),
            },
            sender,
            forwarder,
            &shutdown_tx,
        );

        Ok(Self {
            local_addr,
            shutdown_tx,
            listener,
            collector,
            dispatcher,
        })
    }

    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    #[must_use]
    pub fn shutdown_sender(&self) -> ShutdownSender {
        self.shutdown_tx.clone()
    }

    /// Ask every task to stop; the collector performs a final flush.
    pub fn shutdown(&self) {
        drop(self.shutdown_tx.send(()));
    }

    /// Wait until the daemon has stopped and collect its report.
    ///
    /// # Errors
    ///
    /// Returns the collector's error when a fatal backend failed, or a join
    /// error when a task panicked.
    pub async fn wait(self) -> AppResult<DaemonReport> {
        let collector = self.collector.await?;
        // The collector may have stopped on its own after a fatal backend error.
        drop(self.shutdown_tx.send(()));
        let listener = self.listener.await?;
        self.dispatcher.await?;

        let collector = collector?;
        tracing::info!(
            "Stopped after {} datagrams, {} events, {} flushes",
            listener.datagrams_received,
            collector.events_applied,
            collector.windows_flushed
        );
        Ok(DaemonReport {
            collector,
            listener,
        })
    }
}

/// Run until SIGINT/SIGTERM, then flush once more and stop.
///
/// # Errors
///
/// Returns an error when startup fails or a fatal backend error stops the
/// daemon.
pub async fn run_daemon(args: DaemonArgs) -> AppResult<DaemonReport> {
    let daemon = Daemon::start(&args).await?;
    let signals = setup_signal_shutdown_handler(&daemon.shutdown_sender());
    let result = daemon.wait().await;
    signals.await?;
    result
}
