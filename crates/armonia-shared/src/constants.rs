//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

pub const JWT_ISSUER: &str = "armonia-app";
pub const JWT_AUDIENCE_USERS: &str = "armonia-users";
pub const JWT_AUDIENCE_REFRESH: &str = "armonia-refresh";

pub const TOKEN_TYPE_PASSWORD_RESET: &str = "password-reset";
pub const TOKEN_TYPE_EMAIL_VERIFICATION: &str = "email-verification";

pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 900;
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 604800;
pub const DEFAULT_RESET_TOKEN_EXPIRY: i64 = 3600;
pub const DEFAULT_VERIFICATION_TOKEN_EXPIRY: i64 = 86400;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 100;

pub const TENANT_SCHEMA_PREFIX: &str = "tenant_";

pub const COOKIE_ACCESS_TOKEN: &str = "auth-token";
pub const COOKIE_REFRESH_TOKEN: &str = "refresh-token";
