use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};

use crate::error::BackendError;
use crate::metrics::TimerDistribution;

use super::format::push_line;
use super::{Backend, ConsoleSettings};

/// Prints buckets that start with a prefix, one `name value` line each.
pub struct ConsoleBackend<W = Stdout> {
    prefix: String,
    buffer: String,
    writer: W,
}

impl ConsoleBackend<Stdout> {
    #[must_use]
    pub fn stdout(settings: &ConsoleSettings) -> Self {
        Self::with_writer(settings.prefix.clone(), tokio::io::stdout())
    }
}

impl<W> ConsoleBackend<W>
where
    W: AsyncWrite + Unpin + Send,
{
    #[must_use]
    pub const fn with_writer(prefix: String, writer: W) -> Self {
        Self {
            prefix,
            buffer: String::new(),
            writer,
        }
    }

    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn wants(&self, name: &str) -> bool {
        name.starts_with(self.prefix.as_str())
    }
}

#[async_trait]
impl<W> Backend for ConsoleBackend<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &str {
        "console"
    }

    async fn begin_aggregation(&mut self) -> Result<(), BackendError> {
        self.buffer.clear();
        Ok(())
    }

    async fn handle_counter(
        &mut self,
        name: &str,
        count: i64,
        _rate_per_second: f64,
    ) -> Result<(), BackendError> {
        if !self.wants(name) {
            return Ok(());
        }
        push_line(&mut self.buffer, format_args!("{} {}", name, count))
    }

    async fn handle_gauge(&mut self, name: &str, value: f64) -> Result<(), BackendError> {
        if !self.wants(name) {
            return Ok(());
        }
        push_line(&mut self.buffer, format_args!("{} {}", name, value))
    }

    async fn handle_timing(
        &mut self,
        name: &str,
        distribution: &TimerDistribution,
    ) -> Result<(), BackendError> {
        if !self.wants(name) {
            return Ok(());
        }
        push_line(
            &mut self.buffer,
            format_args!("{}.mean {}", name, distribution.mean),
        )?;
        push_line(
            &mut self.buffer,
            format_args!("{}.upper_90 {}", name, distribution.p90),
        )?;
        push_line(
            &mut self.buffer,
            format_args!("{}.count {}", name, distribution.count),
        )
    }

    async fn end_aggregation(&mut self) -> Result<(), BackendError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.writer
            .write_all(self.buffer.as_bytes())
            .await
            .map_err(|source| BackendError::Write {
                target: "console",
                source,
            })?;
        self.writer
            .flush()
            .await
            .map_err(|source| BackendError::Write {
                target: "console",
                source,
            })?;
        self.buffer.clear();
        Ok(())
    }
}
