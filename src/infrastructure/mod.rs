pub mod database;
pub mod store;
pub mod telemetry;
pub mod time;
pub mod util;
