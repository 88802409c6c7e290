use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, net::TcpStream};

use crate::error::BackendError;
use crate::metrics::TimerDistribution;

use super::format::push_line;
use super::{Backend, GraphiteSettings};

/// Graphite plaintext protocol over TCP.
///
/// Lines are buffered for the whole cycle and written in one go from
/// `end_aggregation`, on a connection opened per flush.
pub struct GraphiteBackend {
    address: String,
    prefix: String,
    counts_prefix: String,
    timestamp: i64,
    buffer: String,
    stream: Option<TcpStream>,
}

impl GraphiteBackend {
    #[must_use]
    pub fn new(settings: &GraphiteSettings) -> Self {
        Self {
            address: settings.address.clone(),
            prefix: settings.prefix.clone(),
            counts_prefix: format!("{}_counts", settings.prefix),
            timestamp: 0,
            buffer: String::new(),
            stream: None,
        }
    }

    fn push_timer_stat(&mut self, name: &str, stat: &str, value: f64) -> Result<(), BackendError> {
        push_line(
            &mut self.buffer,
            format_args!("{}.timers.{}.{} {} {}", self.prefix, name, stat, value, self.timestamp),
        )
    }
}

#[async_trait]
impl Backend for GraphiteBackend {
    fn name(&self) -> &str {
        "graphite"
    }

    async fn begin_aggregation(&mut self) -> Result<(), BackendError> {
        self.timestamp = chrono::Utc::now().timestamp();
        self.buffer.clear();
        let stream = TcpStream::connect(&self.address)
            .await
            .map_err(|source| BackendError::Connect {
                address: self.address.clone(),
                source,
            })?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn handle_counter(
        &mut self,
        name: &str,
        count: i64,
        rate_per_second: f64,
    ) -> Result<(), BackendError> {
        push_line(
            &mut self.buffer,
            format_args!("{}.{} {} {}", self.prefix, name, rate_per_second, self.timestamp),
        )?;
        push_line(
            &mut self.buffer,
            format_args!("{}.{} {} {}", self.counts_prefix, name, count, self.timestamp),
        )
    }

    async fn handle_gauge(&mut self, name: &str, value: f64) -> Result<(), BackendError> {
        push_line(
            &mut self.buffer,
            format_args!("{}.gauges.{} {} {}", self.prefix, name, value, self.timestamp),
        )
    }

    async fn handle_timing(
        &mut self,
        name: &str,
        distribution: &TimerDistribution,
    ) -> Result<(), BackendError> {
        self.push_timer_stat(name, "mean", distribution.mean)?;
        self.push_timer_stat(name, "upper", distribution.max)?;
        self.push_timer_stat(name, "upper_75", distribution.p75)?;
        self.push_timer_stat(name, "upper_90", distribution.p90)?;
        self.push_timer_stat(name, "upper_95", distribution.p95)?;
        self.push_timer_stat(name, "lower", distribution.min)?;
        self.push_timer_stat(name, "median", distribution.p50)?;
        push_line(
            &mut self.buffer,
            format_args!(
                "{}.timers.{}.count {} {}",
                self.prefix, name, distribution.count, self.timestamp
            ),
        )?;
        self.push_timer_stat(name, "count_ps", distribution.count_per_second)
    }

    async fn end_aggregation(&mut self) -> Result<(), BackendError> {
        let mut stream = self.stream.take().ok_or(BackendError::NotConnected)?;
        stream
            .write_all(self.buffer.as_bytes())
            .await
            .map_err(|source| BackendError::Write {
                target: "graphite",
                source,
            })?;
        stream
            .shutdown()
            .await
            .map_err(|source| BackendError::Write {
                target: "graphite",
                source,
            })?;
        self.buffer.clear();
        Ok(())
    }
}
