//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use armonia_core::DomainError;

use crate::response::ApiResponse;

/// Wrapper turning a `DomainError` into the HTTP envelope. Validation and
/// business-rule failures keep their specific messages; internal failures
/// are logged server-side and surfaced as an opaque generic message.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self.0 {
            DomainError::Validation(errors) => {
                tracing::warn!("Validation error: {}", errors);
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Datos de entrada inválidos".to_string(),
                    serde_json::to_value(errors).ok(),
                )
            }
            DomainError::InvalidInput(msg) => {
                tracing::warn!("Invalid input: {}", msg);
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            DomainError::InvalidTenantId(_) => {
                tracing::warn!("{}", self.0);
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.0.to_string(), None)
            }
            DomainError::BusinessRule(msg) => {
                tracing::warn!("Business rule violation: {}", msg);
                (StatusCode::BAD_REQUEST, "BUSINESS_RULE", msg.clone(), None)
            }
            DomainError::InvalidCredentials | DomainError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                self.0.to_string(),
                None,
            ),
            DomainError::UserNotActive | DomainError::TenantNotActive => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", self.0.to_string(), None)
            }
            DomainError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None)
            }
            DomainError::UserNotFound
            | DomainError::TenantNotFound
            | DomainError::PqrNotFound
            | DomainError::AsambleaNotFound => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.0.to_string(), None)
            }
            DomainError::EmailAlreadyExists(_) => {
                (StatusCode::CONFLICT, "CONFLICT", self.0.to_string(), None)
            }
            DomainError::PasswordHashError(msg)
            | DomainError::TokenGenerationError(msg)
            | DomainError::DatabaseError(msg)
            | DomainError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Error interno del servidor".to_string(),
                    None,
                )
            }
        };

        let body = Json(ApiResponse::<()>::error_with_details(code, &message, details));
        (status, body).into_response()
    }
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError(DomainError::InvalidToken)
    }

    pub fn forbidden(message: &str) -> Self {
        ApiError(DomainError::Forbidden(message.to_string()))
    }
}
