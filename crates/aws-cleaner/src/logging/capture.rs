//! Capture ERROR and WARN log entries for display after the TUI exits.
//!
//! tui-logger keeps its history in memory and it disappears with the
//! alternate screen, so warnings and errors are also kept here and printed
//! to stderr once the terminal is restored.

use super::visitor::EventVisitor;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CapturedLog {
    level: Level,
    message: String,
}

/// Ring buffer of the most recent WARN/ERROR entries.
///
/// Clones share the buffer; keep one to print from after the TUI closes.
#[derive(Debug, Clone)]
pub struct LogCapture {
    buffer: Arc<Mutex<VecDeque<CapturedLog>>>,
    max_entries: usize,
}

impl LogCapture {
    pub fn new(max_entries: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(max_entries))),
            max_entries,
        }
    }

    /// Print captured errors, then warnings, to stderr.
    pub fn print_to_stderr(&self) {
        for line in self.report_lines() {
            eprintln!("{line}");
        }
    }

    fn report_lines(&self) -> Vec<String> {
        let buffer = self.buffer.lock().unwrap();
        let mut lines = Vec::new();
        for (level, title) in [(Level::ERROR, "Errors"), (Level::WARN, "Warnings")] {
            let matching: Vec<_> = buffer.iter().filter(|log| log.level == level).collect();
            if matching.is_empty() {
                continue;
            }
            lines.push(format!("\n=== {} ({}) ===", title, matching.len()));
            lines.extend(matching.iter().map(|log| log.message.clone()));
        }
        lines
    }

    pub fn has_entries(&self) -> bool {
        !self.buffer.lock().unwrap().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.buffer
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.level == Level::ERROR)
            .count()
    }

    fn push(&self, log: CapturedLog) {
        if self.max_entries == 0 {
            return;
        }
        let mut buffer = self.buffer.lock().unwrap();
        if buffer.len() >= self.max_entries {
            buffer.pop_front();
        }
        buffer.push_back(log);
    }
}

/// Tracing layer feeding a [`LogCapture`]
#[derive(Debug, Clone)]
pub struct LogCaptureLayer {
    capture: LogCapture,
}

impl LogCaptureLayer {
    pub fn new(capture: LogCapture) -> Self {
        Self { capture }
    }
}

impl<S: Subscriber> Layer<S> for LogCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level != Level::ERROR && level != Level::WARN {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        self.capture.push(CapturedLog {
            level,
            message: visitor.into_line(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn warn_entry(message: &str) -> CapturedLog {
        CapturedLog {
            level: Level::WARN,
            message: message.to_string(),
        }
    }

    #[test]
    fn ring_buffer_keeps_the_newest() {
        let capture = LogCapture::new(3);
        for i in 0..5 {
            capture.push(warn_entry(&format!("message {i}")));
        }

        let buffer = capture.buffer.lock().unwrap();
        let messages: Vec<_> = buffer.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["message 2", "message 3", "message 4"]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let capture = LogCapture::new(0);
        capture.push(warn_entry("dropped"));
        assert!(!capture.has_entries());
    }

    #[test]
    fn layer_keeps_only_warnings_and_errors() {
        let capture = LogCapture::new(10);
        let subscriber = tracing_subscriber::registry().with(LogCaptureLayer::new(capture.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Checking for EC2 instances in us-east-1...");
            tracing::warn!("Could not delete security group sg-1: in use");
            tracing::error!("Failed to delete VPC vpc-1: AccessDenied");
        });

        assert_eq!(capture.error_count(), 1);
        assert_eq!(
            capture.report_lines(),
            vec![
                "\n=== Errors (1) ===".to_string(),
                "Failed to delete VPC vpc-1: AccessDenied".to_string(),
                "\n=== Warnings (1) ===".to_string(),
                "Could not delete security group sg-1: in use".to_string(),
            ]
        );
    }
}
