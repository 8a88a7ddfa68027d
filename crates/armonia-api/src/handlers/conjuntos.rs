// ============================================================================
// Armonia API - Conjunto Handlers
// File: crates/armonia-api/src/handlers/conjuntos.rs
// ============================================================================
//! Tenant administration: onboarding, activation toggling and the
//! irreversible partition drop. Super-admin only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use armonia_core::domain::Conjunto;
use armonia_core::services::NuevoConjunto;
use armonia_security::Rol;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetActivoRequest {
    pub activo: bool,
}

/// GET /api/v1/conjuntos — provisioned tenant ids
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<String>>>> {
    auth.require_rol(Rol::SuperAdmin)?;
    Ok(Json(ApiResponse::success(state.tenants.list_tenants().await?)))
}

/// POST /api/v1/conjuntos — onboard a tenant and provision its partition
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NuevoConjunto>,
) -> ApiResult<Response> {
    auth.require_rol(Rol::SuperAdmin)?;
    let creado = state.conjunto_service().onboard(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(creado))).into_response())
}

/// PUT /api/v1/conjuntos/{tenant_id}/activo
pub async fn set_activo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<String>,
    Json(payload): Json<SetActivoRequest>,
) -> ApiResult<Json<ApiResponse<Conjunto>>> {
    auth.require_rol(Rol::SuperAdmin)?;
    let conjunto = state.conjunto_service().set_activo(&tenant_id, payload.activo).await?;
    Ok(Json(ApiResponse::success(conjunto)))
}

/// DELETE /api/v1/conjuntos/{tenant_id} — drop the tenant's partition
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require_rol(Rol::SuperAdmin)?;
    state.conjunto_service().drop_tenant(&tenant_id).await?;
    Ok(Json(ApiResponse::success(())))
}
