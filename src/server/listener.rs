use std::sync::Arc;

use tokio::{net::UdpSocket, task::JoinHandle};

use crate::error::IngestError;
use crate::protocol::{SelfMetrics, decode_datagram};
use crate::shutdown::ShutdownSender;

use super::{Forwarder, IngestSender};

#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Receive buffer size; longer datagrams are truncated by the OS.
    pub max_datagram_size: usize,
    pub self_metrics: Option<SelfMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerReport {
    pub datagrams_received: u64,
    pub receive_errors: u64,
}

/// Bind the inbound statsd socket.
///
/// # Errors
///
/// Returns [`IngestError::Bind`] when the address is invalid or in use.
pub async fn bind_listener(address: &str) -> Result<UdpSocket, IngestError> {
    let socket = UdpSocket::bind(address)
        .await
        .map_err(|source| IngestError::Bind {
            address: address.to_owned(),
            source,
        })?;
    match socket.local_addr() {
        Ok(local) => tracing::info!("Listening for statsd datagrams on udp://{}", local),
        Err(err) => tracing::debug!("Bound {} but could not read local address: {}", address, err),
    }
    Ok(socket)
}

/// Receive datagrams until shutdown.
///
/// Each datagram is optionally forwarded as-is, then decoded and queued on
/// its own task so a full queue never stalls the socket.
#[must_use]
pub fn spawn_listener(
    socket: UdpSocket,
    config: ListenerConfig,
    sender: IngestSender,
    forwarder: Option<Forwarder>,
    shutdown_tx: &ShutdownSender,
) -> JoinHandle<ListenerReport> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let self_metrics = config.self_metrics.map(Arc::new);

    tokio::spawn(async move {
        let mut report = ListenerReport::default();
        let mut buffer = vec![0u8; config.max_datagram_size.max(1)];

        loop {
            let received = tokio::select! {
                _ = shutdown_rx.recv() => break,
                received = socket.recv_from(&mut buffer) => received,
            };

            let payload = match received {
                Ok((len, _peer)) => match buffer.get(..len) {
                    Some(payload) => payload.to_vec(),
                    None => continue,
                },
                Err(err) => {
                    report.receive_errors = report.receive_errors.saturating_add(1);
                    tracing::warn!("UDP receive failed: {}", err);
                    continue;
                }
            };
            report.datagrams_received = report.datagrams_received.saturating_add(1);

            if let Some(forwarder) = forwarder.as_ref() {
                forwarder.forward(&payload).await;
            }

            let sender = sender.clone();
            let self_metrics = self_metrics.clone();
            tokio::spawn(async move {
                let events = decode_datagram(&payload, self_metrics.as_deref());
                if events.is_empty() {
                    tracing::trace!("Ignoring datagram without metric lines");
                    return;
                }
                if let Err(err) = sender.enqueue_all(events).await {
                    tracing::trace!("Discarding decoded events: {}", err);
                }
            });
        }

        tracing::debug!(
            "Listener stopped after {} datagrams",
            report.datagrams_received
        );
        report
    })
}
