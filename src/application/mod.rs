pub mod commands;
pub mod dto;
pub mod error;
pub mod ports;
pub mod queries;
pub mod services;
pub mod unit_of_work;

pub use error::{ApplicationError, ApplicationResult};
