//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::DaemonArgs;
pub use types::{MeanKind, PercentThreshold, PositiveUsize};
