//! In-memory event capture for assertions on what the store logs.
//!
//! Capture is scoped to the current thread, so parallel tests do not see
//! each other's events.
//!
//! ```
//! use recall::logging::capture::LogCapture;
//! use recall::{Snapshot, Store};
//!
//! let capture = LogCapture::start();
//! let store = Store::new(Snapshot::new());
//! store.merge(Snapshot::new()).unwrap();
//! capture.assert_event_exists("set_state", "commit");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// A captured log event with all its fields
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}

type Events = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    events: Events,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            component: visitor.fields.get("component").cloned(),
            op: visitor.fields.get("op").cloned(),
            event: visitor.fields.get("event").cloned(),
            fields: visitor.fields,
        };

        self.events
            .lock()
            .map(|mut events| events.push(captured))
            .ok();
    }
}

/// Collects events emitted on this thread until dropped.
pub struct LogCapture {
    events: Events,
    _guard: DefaultGuard,
}

impl LogCapture {
    pub fn start() -> Self {
        let events = Events::default();
        let layer = CaptureLayer {
            events: Arc::clone(&events),
        };
        let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(layer));
        Self {
            events,
            _guard: guard,
        }
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// # Panics
    ///
    /// Panics if no captured event has the given `op` and `event` fields
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        let found = events
            .iter()
            .any(|e| e.op.as_deref() == Some(op) && e.event.as_deref() == Some(event));
        assert!(
            found,
            "Expected event op={} event={} not found in {} captured events",
            op,
            event,
            events.len()
        );
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.events.lock().map(|mut e| e.clear()).ok();
    }
}

impl fmt::Debug for LogCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCapture")
            .field("events", &self.events().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_structured_fields() {
        let capture = LogCapture::start();
        tracing::warn!(component = "store", op = "inspect", event = "seen", depth = 3u64);

        let events = capture.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
        assert_eq!(events[0].component.as_deref(), Some("store"));
        assert_eq!(events[0].fields.get("depth").map(String::as_str), Some("3"));
        capture.assert_event_exists("inspect", "seen");
    }

    #[test]
    fn clear_drops_events() {
        let capture = LogCapture::start();
        tracing::info!(op = "a", event = "b");
        capture.clear();
        assert!(capture.events().is_empty());
    }

    #[test]
    fn capture_ends_when_dropped() {
        let capture = LogCapture::start();
        let events = Arc::clone(&capture.events);
        drop(capture);
        tracing::error!(op = "late", event = "ignored");
        assert!(events.lock().unwrap().is_empty());
    }
}
