//! Field extraction from tracing events

use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};

/// Collects an event's message and renders the remaining fields as
/// `key=value` pairs after it.
#[derive(Debug, Default)]
pub(crate) struct EventVisitor {
    message: String,
    fields: String,
}

impl EventVisitor {
    /// `message key=value key=value`
    pub(crate) fn into_line(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        write!(&mut self.fields, "{name}={value}").ok();
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            write!(&mut self.message, "{:?}", value).ok();
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    /// Records the rendered line of every event
    struct Lines(Arc<Mutex<Vec<String>>>);

    impl<S: Subscriber> Layer<S> for Lines {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = EventVisitor::default();
            event.record(&mut visitor);
            self.0.lock().unwrap().push(visitor.into_line());
        }
    }

    fn render(f: impl FnOnce()) -> Vec<String> {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(Lines(lines.clone()));
        tracing::subscriber::with_default(subscriber, f);
        let out = lines.lock().unwrap().clone();
        out
    }

    #[test]
    fn message_then_fields() {
        let vpc_id = "vpc-0abc";
        let lines = render(|| {
            tracing::warn!(vpc_id = %vpc_id, attempts = 1, "Deleting VPC {}", vpc_id);
            tracing::info!("plain");
            tracing::info!(only = "field");
        });
        assert_eq!(
            lines,
            vec![
                "Deleting VPC vpc-0abc vpc_id=vpc-0abc attempts=1",
                "plain",
                "only=field",
            ]
        );
    }
}
