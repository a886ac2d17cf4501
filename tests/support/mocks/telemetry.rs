// tests/support/mocks/telemetry.rs
use std::sync::Mutex;

use folio_core::application::ports::telemetry::{Properties, Telemetry};

/// Keeps every event name so tests can assert on what was reported.
#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<String>>,
    exceptions: Mutex<Vec<String>>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn exceptions(&self) -> Vec<String> {
        self.exceptions.lock().unwrap().clone()
    }
}

impl Telemetry for RecordingTelemetry {
    fn record_event(&self, name: &str, _properties: Properties) {
        self.events.lock().unwrap().push(name.to_string());
    }

    fn record_exception(&self, error: &(dyn std::error::Error + Send + Sync), _context: Properties) {
        self.exceptions.lock().unwrap().push(error.to_string());
    }
}
