use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::error::IngestError;

/// Relays every received datagram, unmodified, to another statsd endpoint.
#[derive(Debug)]
pub struct Forwarder {
    socket: UdpSocket,
    target: SocketAddr,
}

impl Forwarder {
    /// Resolve `target` and connect an ephemeral UDP socket to it.
    ///
    /// # Errors
    ///
    /// Returns an error when the address does not resolve or the socket
    /// cannot be bound or connected.
    pub async fn connect(target: &str) -> Result<Self, IngestError> {
        let resolved = tokio::net::lookup_host(target)
            .await
            .map_err(|source| IngestError::Resolve {
                address: target.to_owned(),
                source,
            })?
            .next()
            .ok_or_else(|| IngestError::Unresolved {
                address: target.to_owned(),
            })?;

        let local: SocketAddr = if resolved.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| IngestError::ForwardConnect {
                target: resolved,
                source,
            })?;
        socket
            .connect(resolved)
            .await
            .map_err(|source| IngestError::ForwardConnect {
                target: resolved,
                source,
            })?;

        tracing::info!("Forwarding raw datagrams to {}", resolved);
        Ok(Self {
            socket,
            target: resolved,
        })
    }

    /// Send failures are logged and otherwise ignored.
    pub async fn forward(&self, payload: &[u8]) {
        if let Err(err) = self.socket.send(payload).await {
            tracing::warn!("Failed to forward datagram to {}: {}", self.target, err);
        }
    }
}
