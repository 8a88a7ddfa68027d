//! Database adapters

pub mod connection;
pub mod postgres;
pub mod tenant_router;

/// Migrations for the shared (public) schema: conjunto registry and users.
pub static PUBLIC_MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/public");

/// Migrations every tenant partition runs, the default one included.
pub static TENANT_MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/tenant");
