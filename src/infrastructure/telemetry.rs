use crate::application::ports::telemetry::{Properties, Telemetry};
use serde_json::Value;

/// Forwards telemetry to `tracing` under the `telemetry` target.
#[derive(Default, Clone)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn record_event(&self, name: &str, properties: Properties) {
        let properties = Value::Object(properties);
        tracing::info!(
            target: "telemetry",
            event = name,
            properties = %properties,
            "event"
        );
    }

    fn record_exception(&self, error: &(dyn std::error::Error + Send + Sync), context: Properties) {
        let context = Value::Object(context);
        tracing::error!(
            target: "telemetry",
            error = %error,
            context = %context,
            "exception"
        );
    }
}
