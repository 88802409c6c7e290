//! Core library for the `tallyd` daemon.
//!
//! `tallyd` receives statsd datagrams over UDP, aggregates counters, gauges
//! and timers in a single collector task, and hands one snapshot per flush
//! interval to the configured backends. The binary is a thin wrapper around
//! [`entry::run`]; the modules below are public so the pieces can be driven
//! directly, for example from integration tests.
pub mod app;
pub mod args;
pub mod backends;
pub mod config;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod server;
pub mod shutdown;

mod logger;
mod shutdown_handlers;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
