// src/presentation/mod.rs
pub mod api;
pub mod cache;
pub mod error;
