use async_trait::async_trait;

use crate::error::BackendError;
use crate::metrics::TimerDistribution;

/// Receiver of one flush cycle.
///
/// Every cycle is driven as `begin_aggregation`, then one handler call per
/// aggregated bucket, then `end_aggregation`. A backend that returns an error
/// is handled according to the [`FailurePolicy`](super::FailurePolicy) it was
/// registered with.
#[async_trait]
pub trait Backend: Send {
    /// Short identifier used in logs and flush reports.
    fn name(&self) -> &str;

    async fn begin_aggregation(&mut self) -> Result<(), BackendError>;

    /// `count` is the window total, `rate_per_second` is that total divided
    /// by the window length.
    async fn handle_counter(
        &mut self,
        name: &str,
        count: i64,
        rate_per_second: f64,
    ) -> Result<(), BackendError>;

    async fn handle_gauge(&mut self, name: &str, value: f64) -> Result<(), BackendError>;

    async fn handle_timing(
        &mut self,
        name: &str,
        distribution: &TimerDistribution,
    ) -> Result<(), BackendError>;

    async fn end_aggregation(&mut self) -> Result<(), BackendError>;
}
