// ============================================================================
// Armonia API - Asamblea Handlers
// File: crates/armonia-api/src/handlers/asambleas.rs
// ============================================================================
//! Assembly endpoints: scheduling, lifecycle transitions, attendance
//! updates and guarded deletion.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use armonia_core::domain::{
    ActualizarAsamblea, Asamblea, AsambleaEstado, NuevaAsamblea, TipoAsamblea,
};
use armonia_core::repositories::AsambleaFilter;
use armonia_core::services::{AsambleaDetalle, AsambleaResumen};
use armonia_security::Rol;
use armonia_shared::types::Pagination;

use crate::error::ApiResult;
use crate::middleware::{resolve_tenant, AuthUser};
use crate::response::{ApiResponse, PaginationMeta};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AsambleaListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub estado: Option<AsambleaEstado>,
    pub tipo: Option<TipoAsamblea>,
    pub search: Option<String>,
    pub fecha_desde: Option<DateTime<Utc>>,
    pub fecha_hasta: Option<DateTime<Utc>>,
    pub tenant: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TenantQuery {
    pub tenant: Option<String>,
}

#[derive(Serialize)]
pub struct AsambleaListData {
    pub items: Vec<Asamblea>,
    pub pagination: PaginationMeta,
    pub stats: AsambleaResumen,
}

/// GET /api/v1/asambleas
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(q): Query<AsambleaListQuery>,
) -> ApiResult<Json<ApiResponse<AsambleaListData>>> {
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.asamblea_service(&ctx.tenant_id).await?;

    let pagination = Pagination {
        page: q.page.unwrap_or(1),
        limit: q.limit.unwrap_or(Pagination::default().limit),
    };
    let filter = AsambleaFilter {
        estado: q.estado,
        tipo: q.tipo,
        search: q.search,
        fecha_desde: q.fecha_desde,
        fecha_hasta: q.fecha_hasta,
    };

    let (page, stats) = svc.listar(&filter, pagination).await?;
    Ok(Json(ApiResponse::success(AsambleaListData {
        pagination: PaginationMeta::from_page(&page),
        items: page.data,
        stats,
    })))
}

/// POST /api/v1/asambleas
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(q): Query<TenantQuery>,
    Json(payload): Json<NuevaAsamblea>,
) -> ApiResult<Response> {
    auth.require_rol(Rol::AdminConjunto)?;
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.asamblea_service(&ctx.tenant_id).await?;

    let creada = svc.crear(auth.0.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(creada))).into_response())
}

/// GET /api/v1/asambleas/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<TenantQuery>,
) -> ApiResult<Json<ApiResponse<AsambleaDetalle>>> {
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.asamblea_service(&ctx.tenant_id).await?;
    Ok(Json(ApiResponse::success(svc.obtener(&id, &ctx.conjunto_id).await?)))
}

/// PUT /api/v1/asambleas/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<TenantQuery>,
    Json(payload): Json<ActualizarAsamblea>,
) -> ApiResult<Json<ApiResponse<Asamblea>>> {
    auth.require_rol(Rol::AdminConjunto)?;
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.asamblea_service(&ctx.tenant_id).await?;
    Ok(Json(ApiResponse::success(
        svc.actualizar(&id, &ctx.conjunto_id, payload).await?,
    )))
}

/// DELETE /api/v1/asambleas/{id}
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<TenantQuery>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require_rol(Rol::AdminConjunto)?;
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.asamblea_service(&ctx.tenant_id).await?;
    svc.eliminar(&id).await?;
    Ok(Json(ApiResponse::success(())))
}
