//! Request middleware and extractors

pub mod auth;

pub use auth::{resolve_tenant, AuthUser, TenantContext};
