// src/application/ports/telemetry.rs
use serde_json::{Map, Value};

pub type Properties = Map<String, Value>;

/// Fire-and-forget event sink. Implementations must not fail the caller.
pub trait Telemetry: Send + Sync {
    fn record_event(&self, name: &str, properties: Properties);

    fn record_exception(&self, error: &(dyn std::error::Error + Send + Sync), context: Properties);
}

/// Build a property map from `key => value` pairs.
#[macro_export]
macro_rules! telemetry_props {
    ($($key:literal => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::application::ports::telemetry::Properties::new();
        $(map.insert($key.to_string(), ::serde_json::json!($value));)*
        map
    }};
}
