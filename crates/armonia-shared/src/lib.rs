//! # Armonia Shared
//!
//! Configuration, telemetry, common types and constants shared by every crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use error::AppError;
