//! # Armonia Core
//!
//! Domain entities, services, and repository traits for the Armonía
//! multi-tenant administration backend.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

pub use domain::*;
pub use error::DomainError;
