use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncWriteExt, BufWriter},
};

use crate::error::BackendError;
use crate::metrics::TimerDistribution;

use super::{Backend, FileSettings};

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record<'a> {
    Counter {
        name: &'a str,
        timestamp: i64,
        count: i64,
        rate_per_second: f64,
    },
    Gauge {
        name: &'a str,
        timestamp: i64,
        value: f64,
    },
    Timer {
        name: &'a str,
        timestamp: i64,
        #[serde(flatten)]
        distribution: &'a TimerDistribution,
    },
}

/// Appends one JSON object per metric per flush.
pub struct FileBackend {
    path: PathBuf,
    timestamp: i64,
    writer: Option<BufWriter<File>>,
}

impl FileBackend {
    #[must_use]
    pub fn new(settings: &FileSettings) -> Self {
        Self {
            path: settings.path.clone(),
            timestamp: 0,
            writer: None,
        }
    }

    async fn append(&mut self, record: &Record<'_>) -> Result<(), BackendError> {
        let writer = self.writer.as_mut().ok_or(BackendError::NotConnected)?;
        let mut line =
            serde_json::to_vec(record).map_err(|source| BackendError::Serialize { source })?;
        line.push(b'\n');
        writer
            .write_all(&line)
            .await
            .map_err(|source| BackendError::Write {
                target: "metrics file",
                source,
            })
    }
}

#[async_trait]
impl Backend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    async fn begin_aggregation(&mut self) -> Result<(), BackendError> {
        self.timestamp = chrono::Utc::now().timestamp();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| BackendError::Open {
                path: self.path.display().to_string(),
                source,
            })?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    async fn handle_counter(
        &mut self,
        name: &str,
        count: i64,
        rate_per_second: f64,
    ) -> Result<(), BackendError> {
        let record = Record::Counter {
            name,
            timestamp: self.timestamp,
            count,
            rate_per_second,
        };
        self.append(&record).await
    }

    async fn handle_gauge(&mut self, name: &str, value: f64) -> Result<(), BackendError> {
        let record = Record::Gauge {
            name,
            timestamp: self.timestamp,
            value,
        };
        self.append(&record).await
    }

    async fn handle_timing(
        &mut self,
        name: &str,
        distribution: &TimerDistribution,
    ) -> Result<(), BackendError> {
        let record = Record::Timer {
            name,
            timestamp: self.timestamp,
            distribution,
        };
        self.append(&record).await
    }

    async fn end_aggregation(&mut self) -> Result<(), BackendError> {
        let mut writer = self.writer.take().ok_or(BackendError::NotConnected)?;
        writer.flush().await.map_err(|source| BackendError::Write {
            target: "metrics file",
            source,
        })
    }
}
