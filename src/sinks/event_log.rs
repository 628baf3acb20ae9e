use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::{
    fs::OpenOptions,
    io::{AsyncWriteExt, BufWriter},
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, SinkError};

use super::format::write_event_line;
use super::{EventSink, LogEvent};

const LOG_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug)]
enum LogCommand {
    Event(LogEvent),
    Close,
}

#[derive(Debug, Clone)]
struct ChannelSink {
    tx: mpsc::UnboundedSender<LogCommand>,
}

impl EventSink for ChannelSink {
    fn record(&self, event: LogEvent) {
        if self.tx.send(LogCommand::Event(event)).is_err() {
            debug!("Event log already closed; dropping event.");
        }
    }
}

/// Append-only event log file with an explicit open/close lifecycle.
///
/// Events recorded through [`EventLog::sink`] are written by a background task
/// in the order they were recorded. [`EventLog::close`] flushes everything
/// recorded before it and stops the writer.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    sink: Arc<ChannelSink>,
    writer: JoinHandle<AppResult<u64>>,
}

impl EventLog {
    /// Opens (or creates) the log file for appending and starts the writer.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened.
    pub async fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                AppError::sink(SinkError::OpenEventLog {
                    path: path.to_path_buf(),
                    source: err,
                })
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|err| {
                AppError::sink(SinkError::OpenEventLog {
                    path: path.to_path_buf(),
                    source: err,
                })
            })?;
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_events(path.to_path_buf(), file, rx));
        debug!("Opened event log {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            sink: Arc::new(ChannelSink { tx }),
            writer,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn sink(&self) -> Arc<dyn EventSink> {
        self.sink.clone()
    }

    /// Flushes pending events, closes the file and returns the number of lines
    /// written. Events recorded after this call are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error when writing or flushing the file failed.
    pub async fn close(self) -> AppResult<u64> {
        if self.sink.tx.send(LogCommand::Close).is_err() {
            warn!("Event log writer stopped before close.");
        }
        self.writer.await?
    }
}

async fn write_events(
    path: PathBuf,
    file: tokio::fs::File,
    mut rx: mpsc::UnboundedReceiver<LogCommand>,
) -> AppResult<u64> {
    let mut writer = BufWriter::with_capacity(LOG_BUFFER_SIZE, file);
    let mut buffer = String::new();
    let mut lines: u64 = 0;
    let write_error = |err| {
        AppError::sink(SinkError::WriteEventLog {
            path: path.clone(),
            source: err,
        })
    };

    while let Some(command) = rx.recv().await {
        let event = match command {
            LogCommand::Event(event) => event,
            LogCommand::Close => break,
        };
        buffer.clear();
        write_event_line(&mut buffer, &event)?;
        writer
            .write_all(buffer.as_bytes())
            .await
            .map_err(write_error)?;
        lines = lines.saturating_add(1);
    }

    writer.flush().await.map_err(write_error)?;
    writer.shutdown().await.map_err(write_error)?;
    Ok(lines)
}
