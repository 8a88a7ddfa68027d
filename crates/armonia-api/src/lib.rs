//! # Armonia API
//!
//! HTTP handlers, middleware, DTOs and the API response envelope.

pub mod cookies;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
