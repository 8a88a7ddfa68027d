//! Domain errors

use thiserror::Error;

/// Three-tier taxonomy: validation failures (before any mutation), business
/// rule violations (well-formed input against a lifecycle invariant), and
/// internal failures (logged in detail, surfaced opaquely).
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Datos de entrada inválidos")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    BusinessRule(String),

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Cuenta desactivada. Contacte al administrador.")]
    UserNotActive,

    #[error("Conjunto desactivado. Contacte al administrador.")]
    TenantNotActive,

    #[error("{0}")]
    Forbidden(String),

    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("Conjunto no encontrado")]
    TenantNotFound,

    #[error("PQR no encontrado")]
    PqrNotFound,

    #[error("Asamblea no encontrada")]
    AsambleaNotFound,

    #[error("Email ya registrado: {0}")]
    EmailAlreadyExists(String),

    #[error("ID de tenant inválido: {0}. Formato esperado: ccNNNN")]
    InvalidTenantId(String),

    #[error("Token inválido o expirado")]
    InvalidToken,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<armonia_security::PasswordError> for DomainError {
    fn from(e: armonia_security::PasswordError) -> Self {
        DomainError::PasswordHashError(e.to_string())
    }
}

impl From<armonia_security::JwtError> for DomainError {
    fn from(e: armonia_security::JwtError) -> Self {
        DomainError::TokenGenerationError(e.to_string())
    }
}

impl DomainError {
    /// True for the validation tier: the request never touched state.
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_) | DomainError::InvalidInput(_))
    }
}
