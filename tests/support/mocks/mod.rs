// tests/support/mocks/mod.rs
pub mod flaky;
pub mod storage;
pub mod telemetry;
pub mod time;

pub use flaky::FlakyStore;
pub use storage::MemoryStorage;
pub use telemetry::RecordingTelemetry;
pub use time::fixed_now;
