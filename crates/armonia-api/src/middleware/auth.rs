// ============================================================================
// Armonia API - Auth Extractor
// File: crates/armonia-api/src/middleware/auth.rs
// ============================================================================
//! Bearer/cookie session extraction and tenant scoping.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;

use armonia_core::repositories::ConjuntoRepository;
use armonia_core::DomainError;
use armonia_security::jwt::AccessClaims;
use armonia_security::Rol;
use armonia_shared::constants::COOKIE_ACCESS_TOKEN;
use uuid::Uuid;

use crate::cookies::cookie_value;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller. Tries the `Authorization: Bearer` header first and
/// falls back to the `auth-token` cookie; any verification failure is a
/// uniform 401.
pub struct AuthUser(pub AccessClaims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(ApiError::unauthorized)?;

        state
            .jwt
            .verify_access_token(&token)
            .map(AuthUser)
            .ok_or_else(ApiError::unauthorized)
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(str::to_string)
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(COOKIE)?.to_str().ok()?;
    cookie_value(header, COOKIE_ACCESS_TOKEN)
}

impl AuthUser {
    /// Hierarchy check: the caller's level must reach `required`.
    pub fn require_rol(&self, required: Rol) -> Result<(), ApiError> {
        if self.0.rol.has_permission(required) {
            Ok(())
        } else {
            Err(ApiError::forbidden("No tiene permisos para esta operación"))
        }
    }
}

/// The tenant a request operates on.
pub struct TenantContext {
    pub tenant_id: String,
    pub conjunto_id: Uuid,
}

/// Resolve the tenant for a scoped route. Super admins may target any
/// tenant (via the `tenant` query parameter or their own claims); everyone
/// else is pinned to the conjunto in their claims by an explicit equality
/// check.
pub async fn resolve_tenant(
    state: &AppState,
    claims: &AccessClaims,
    tenant_override: Option<&str>,
) -> Result<TenantContext, ApiError> {
    if claims.rol == Rol::SuperAdmin {
        let tenant_id = tenant_override
            .map(str::to_string)
            .or_else(|| claims.tenant_id.clone())
            .ok_or_else(|| {
                ApiError::from(DomainError::InvalidInput("Debe especificar el tenant".into()))
            })?;
        let conjunto = state
            .conjunto_repo()
            .find_by_tenant_id(&tenant_id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;
        return Ok(TenantContext { tenant_id, conjunto_id: conjunto.id });
    }

    let tenant_id = claims
        .tenant_id
        .clone()
        .ok_or_else(|| ApiError::forbidden("Usuario sin conjunto asignado"))?;
    if let Some(pedido) = tenant_override {
        if pedido != tenant_id {
            return Err(ApiError::forbidden("No puede acceder a otro conjunto"));
        }
    }
    let conjunto_id = claims
        .conjunto_id
        .ok_or_else(|| ApiError::forbidden("Usuario sin conjunto asignado"))?;
    Ok(TenantContext { tenant_id, conjunto_id })
}
