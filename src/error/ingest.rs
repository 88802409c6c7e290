use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to bind UDP listener on '{address}': {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to resolve address '{address}': {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Address '{address}' did not resolve to any socket address.")]
    Unresolved { address: String },
    #[error("Failed to connect forwarding socket to {target}: {source}")]
    ForwardConnect {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Ingestion queue is closed.")]
    QueueClosed,
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
