//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub pqr: PqrSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

impl AppSettings {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    /// Connections per cached tenant pool. Tenants are many and mostly idle,
    /// so each schema pool stays small.
    pub tenant_max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub refresh_secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
    pub reset_token_expiry: i64,
    pub verification_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PqrSettings {
    /// When true, ticket status may only move forward through
    /// RECIBIDO -> EN_PROCESO -> RESUELTO -> CERRADO. When false any
    /// enumerated status is accepted and only the timestamp side effects
    /// are enforced.
    pub transiciones_estrictas: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "armonia-server")?
            .set_default("database.max_connections", 10)?
            .set_default("database.tenant_max_connections", 3)?
            .set_default("jwt.access_token_expiry", constants::DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("jwt.refresh_token_expiry", constants::DEFAULT_REFRESH_TOKEN_EXPIRY)?
            .set_default("jwt.reset_token_expiry", constants::DEFAULT_RESET_TOKEN_EXPIRY)?
            .set_default(
                "jwt.verification_token_expiry",
                constants::DEFAULT_VERIFICATION_TOKEN_EXPIRY,
            )?
            .set_default("pqr.transiciones_estrictas", false)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}
