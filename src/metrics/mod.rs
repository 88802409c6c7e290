//! Aggregation state, timer distributions, and the single-consumer collector.
mod collector;
mod distribution;
mod state;
mod types;


pub use collector::{CollectorConfig, CollectorReport, setup_metrics_collector};
pub use distribution::summarize;
pub use state::AggregationState;
pub use types::{
    CounterValue, FlushSnapshot, GaugePolicy, MeanMode, RejectedEvent, TimerDistribution,
};
