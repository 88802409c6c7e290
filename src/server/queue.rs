use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use clap::ValueEnum;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::error::IngestError;
use crate::protocol::MetricEvent;

/// Producer behaviour when the ingestion queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Wait for the collector to free capacity.
    #[default]
    Block,
    /// Discard the event and count it.
    Drop,
}

impl OverflowPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OverflowPolicy::Block => "block",
            OverflowPolicy::Drop => "drop",
        }
    }
}

/// Producer half of the ingestion queue, cloned into every decode task.
#[derive(Debug, Clone)]
pub struct IngestSender {
    events_tx: mpsc::Sender<MetricEvent>,
    policy: OverflowPolicy,
    dropped_events: Arc<AtomicU64>,
}

/// Build the bounded queue between decode tasks and the collector.
///
/// The returned counter is shared with the collector, which reads and resets
/// it on every flush.
#[must_use]
pub fn ingest_channel(
    capacity: usize,
    policy: OverflowPolicy,
) -> (IngestSender, mpsc::Receiver<MetricEvent>, Arc<AtomicU64>) {
    let (events_tx, events_rx) = mpsc::channel(capacity.max(1));
    let dropped_events = Arc::new(AtomicU64::new(0));
    let sender = IngestSender {
        events_tx,
        policy,
        dropped_events: Arc::clone(&dropped_events),
    };
    (sender, events_rx, dropped_events)
}

impl IngestSender {
    /// Queue one event according to the overflow policy.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::QueueClosed`] once the collector has stopped.
    pub async fn enqueue(&self, event: MetricEvent) -> Result<(), IngestError> {
        match self.policy {
            OverflowPolicy::Block => self
                .events_tx
                .send(event)
                .await
                .map_err(|_err| IngestError::QueueClosed),
            OverflowPolicy::Drop => match self.events_tx.try_send(event) {
                Ok(()) => Ok(()),
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.dropped_events.fetch_add(1, Ordering::Relaxed);
                    Ok(())
                }
                Err(mpsc::error::TrySendError::Closed(_)) => Err(IngestError::QueueClosed),
            },
        }
    }

    /// Queue every event decoded from one datagram, in order.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::QueueClosed`] once the collector has stopped.
    pub async fn enqueue_all(&self, events: Vec<MetricEvent>) -> Result<(), IngestError> {
        for event in events {
            self.enqueue(event).await?;
        }
        Ok(())
    }

    /// Events discarded since the collector last reset the counter.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }
}
