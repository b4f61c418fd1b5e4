//! Tracing layer that captures structured log fields for assertions.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Records every field of every new span and event, in order.
#[derive(Clone, Default)]
pub struct FieldCapture {
    fields: Arc<Mutex<Vec<(String, String)>>>,
}

impl FieldCapture {
    /// First recorded value for `name`, formatted with `Debug` (strings unquoted).
    pub fn value(&self, name: &str) -> Option<String> {
        self.fields
            .lock()
            .unwrap()
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.clone())
    }
}

struct Recorder<'a>(&'a mut Vec<(String, String)>);

impl Visit for Recorder<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{:?}", value)));
    }
}

impl<S: Subscriber> Layer<S> for FieldCapture {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut fields = self.fields.lock().unwrap();
        attrs.record(&mut Recorder(&mut fields));
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = self.fields.lock().unwrap();
        event.record(&mut Recorder(&mut fields));
    }
}
