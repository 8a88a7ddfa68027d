//! # Armonia Infrastructure
//!
//! Postgres adapters: connection pools, the schema-per-tenant router and
//! repository implementations.

pub mod database;

pub use database::tenant_router::TenantRouter;
