mod forward;
mod listener;
mod queue;


pub use forward::Forwarder;
pub use listener::{ListenerConfig, ListenerReport, bind_listener, spawn_listener};
pub use queue::{IngestSender, OverflowPolicy, ingest_channel};
