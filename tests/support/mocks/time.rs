// tests/support/mocks/time.rs
use chrono::{DateTime, Utc};

/// Deterministic starting instant for clocks in tests.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .expect("invalid RFC3339 in tests/support/mocks/time.rs")
        .with_timezone(&Utc)
}
