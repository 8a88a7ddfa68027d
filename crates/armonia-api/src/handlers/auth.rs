// ============================================================================
// Armonia API - Auth Handlers
// File: crates/armonia-api/src/handlers/auth.rs
// ============================================================================
//! Authentication HTTP handlers (login, register, logout, refresh,
//! password reset, email verification)

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{HeaderValue, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use armonia_core::services::{LoginResult, RegistroUsuario};
use armonia_core::DomainError;
use armonia_shared::constants::{COOKIE_ACCESS_TOKEN, COOKIE_REFRESH_TOKEN};

use crate::cookies::{build_cookie, clear_cookie, cookie_value};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

const REMEMBER_MAX_AGE: i64 = 7 * 24 * 60 * 60;

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Formato de email inválido"))]
    pub email: String,

    #[validate(length(min = 1, message = "La contraseña es requerida"))]
    pub password: String,

    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Formato de email inválido"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token requerido"))]
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, message = "Token requerido"))]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Response> {
    payload.validate().map_err(DomainError::from)?;

    let result = state.auth_service().login(&payload.email, &payload.password).await?;

    // Persistent cookies only when the caller asked to be remembered.
    let max_age = payload.remember.then_some(REMEMBER_MAX_AGE);
    session_response(&state, StatusCode::OK, result, max_age)
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegistroUsuario>,
) -> ApiResult<Response> {
    let result = state.auth_service().register(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(result))).into_response())
}

/// POST /api/v1/auth/logout
pub async fn logout(State(state): State<AppState>) -> ApiResult<Response> {
    let secure = state.config.app.is_production();
    let mut response = Json(ApiResponse::success(MessageResponse {
        message: "Sesión cerrada exitosamente".into(),
    }))
    .into_response();
    append_set_cookie(&mut response, clear_cookie(COOKIE_ACCESS_TOKEN, secure))?;
    append_set_cookie(&mut response, clear_cookie(COOKIE_REFRESH_TOKEN, secure))?;
    Ok(response)
}

/// POST /api/v1/auth/refresh
///
/// The refresh token comes from the `refresh-token` cookie or, as a
/// fallback, the request body.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let cookie_token = headers
        .get(COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| cookie_value(h, COOKIE_REFRESH_TOKEN));
    let body_token = body.ok().and_then(|Json(b)| b.refresh_token);

    let token = cookie_token
        .or(body_token)
        .ok_or(ApiError(DomainError::InvalidToken))?;

    let result = state.auth_service().refresh(&token).await?;
    session_response(&state, StatusCode::OK, result, Some(REMEMBER_MAX_AGE))
}

/// POST /api/v1/auth/forgot-password
///
/// Success-shaped regardless of whether the email exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    payload.validate().map_err(DomainError::from)?;
    state.auth_service().forgot_password(&payload.email).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Si el email existe en nuestro sistema, recibirás un enlace de recuperación"
            .into(),
    })))
}

/// POST /api/v1/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    payload.validate().map_err(DomainError::from)?;
    if payload.password != payload.confirm_password {
        return Err(ApiError(DomainError::InvalidInput(
            "Las contraseñas no coinciden".into(),
        )));
    }
    state.auth_service().reset_password(&payload.token, &payload.password).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Contraseña actualizada exitosamente".into(),
    })))
}

/// POST /api/v1/auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    payload.validate().map_err(DomainError::from)?;
    state.auth_service().verify_email(&payload.token).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Email verificado exitosamente".into(),
    })))
}

fn session_response(
    state: &AppState,
    status: StatusCode,
    result: LoginResult,
    max_age: Option<i64>,
) -> ApiResult<Response> {
    let secure = state.config.app.is_production();
    let access = build_cookie(COOKIE_ACCESS_TOKEN, &result.tokens.access_token, max_age, secure);
    let refresh =
        build_cookie(COOKIE_REFRESH_TOKEN, &result.tokens.refresh_token, max_age, secure);

    let mut response = (status, Json(ApiResponse::success(result))).into_response();
    append_set_cookie(&mut response, access)?;
    append_set_cookie(&mut response, refresh)?;
    Ok(response)
}

fn append_set_cookie(response: &mut Response, cookie: String) -> ApiResult<()> {
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError(DomainError::InternalError(e.to_string())))?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(())
}
