//! Append-only log file sink
//!
//! Writes every event at or above the configured level in the shared
//! `timestamp - LEVEL - message` format so the log filter can read it back.

use super::{is_sdk_target, log_level};
use super::visitor::EventVisitor;
use aws_cleaner_common::LogLevel;
use aws_cleaner_common::log_format::format_line;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Tracing layer that appends formatted lines to a writer
#[derive(Debug)]
pub struct LogFileLayer<W: Write + Send + 'static = File> {
    sink: Arc<Mutex<W>>,
    min_level: LogLevel,
}

impl LogFileLayer<File> {
    /// Open (or create) `path` for appending.
    pub fn open(path: &Path, min_level: LogLevel) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file, min_level))
    }
}

impl<W: Write + Send + 'static> LogFileLayer<W> {
    pub fn new(writer: W, min_level: LogLevel) -> Self {
        Self {
            sink: Arc::new(Mutex::new(writer)),
            min_level,
        }
    }

    /// Shared handle to the underlying writer
    pub fn sink(&self) -> Arc<Mutex<W>> {
        Arc::clone(&self.sink)
    }

    fn accepts(&self, level: &Level, target: &str) -> bool {
        let level = log_level(level);
        // SDK internals only reach the file when something is wrong
        if is_sdk_target(target) {
            return level >= LogLevel::Warning;
        }
        level >= self.min_level
    }
}

impl<S, W> Layer<S> for LogFileLayer<W>
where
    S: Subscriber,
    W: Write + Send + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.accepts(metadata.level(), metadata.target()) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        let line = format_line(
            chrono::Local::now().naive_local(),
            log_level(metadata.level()),
            &visitor.into_line(),
        );

        let mut sink = self.sink.lock().unwrap();
        // A failed write must never take the run down with it
        let _ = writeln!(sink, "{line}");
        let _ = sink.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn written(min_level: LogLevel, f: impl FnOnce()) -> Vec<String> {
        let layer = LogFileLayer::new(Vec::new(), min_level);
        let sink = layer.sink();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);

        let bytes = sink.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn lines_use_the_shared_format() {
        let lines = written(LogLevel::Info, || {
            tracing::warn!("Deleting NAT Gateway nat-1");
            tracing::info!("Completed VPC resource cleanup in us-east-1");
            tracing::debug!("noise");
        });

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - WARNING - Deleting NAT Gateway nat-1"));
        assert!(lines[1].ends_with(" - INFO - Completed VPC resource cleanup in us-east-1"));
        // 2024-05-01 12:00:00 is 19 characters
        assert_eq!(lines[0].find(" - "), Some(19));
    }

    #[test]
    fn minimum_level_is_respected() {
        let lines = written(LogLevel::Warning, || {
            tracing::info!("dropped");
            tracing::error!("kept");
        });
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" - ERROR - kept"));
    }

    #[test]
    fn sdk_targets_need_warning() {
        let lines = written(LogLevel::Debug, || {
            tracing::info!(target: "aws_smithy_runtime::client", "sending request");
            tracing::warn!(target: "aws_config::profile", "profile file missing");
            tracing::debug!(target: "aws_cleaner::cleaner", "Waiting for settle");
        });
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("profile file missing"));
        assert!(lines[1].ends_with(" - DEBUG - Waiting for settle"));
    }
}
