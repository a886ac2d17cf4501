// src/application/ports/mod.rs
pub mod storage;
pub mod telemetry;
pub mod time;
pub mod util;
