//! In-memory event collection for tests

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// A recorded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level
    pub level: Level,
    /// The event's message
    pub message: String,
    /// Remaining fields, rendered as strings
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Value of a recorded field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Shared handle to the events recorded so far
#[derive(Debug, Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedEvents {
    /// Every recorded event
    pub fn all(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Events at `ERROR` level
    pub fn errors(&self) -> Vec<CapturedEvent> {
        self.all()
            .into_iter()
            .filter(|event| event.level == Level::ERROR)
            .collect()
    }

    /// Events with the given message
    pub fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.all()
            .into_iter()
            .filter(|event| event.message == message)
            .collect()
    }

    fn push(&self, event: CapturedEvent) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

/// Layer that records every event into [`CapturedEvents`]
#[derive(Debug, Clone)]
pub struct CaptureLayer {
    events: CapturedEvents,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.events.push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_owned(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }
}

/// Record events on the current thread until the guard is dropped
///
/// Works with `#[tokio::test]`, whose default runtime keeps every task on
/// the test thread.
pub fn capture() -> (DefaultGuard, CapturedEvents) {
    let events = CapturedEvents::default();
    let layer = CaptureLayer { events: events.clone() };
    let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(layer));

    (guard, events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_message_and_fields() {
        let (_guard, events) = capture();

        tracing::error!(error = %"disk full", code = 500_u16, "http handler error");
        tracing::warn!(path = "/x", "slow request");

        let errors = events.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "http handler error");
        assert_eq!(errors[0].field("error"), Some("disk full"));
        assert_eq!(errors[0].field("code"), Some("500"));

        let warnings = events.with_message("slow request");
        assert_eq!(warnings[0].field("path"), Some("/x"));
    }
}
