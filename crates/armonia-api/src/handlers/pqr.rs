// ============================================================================
// Armonia API - PQR Handlers
// File: crates/armonia-api/src/handlers/pqr.rs
// ============================================================================
//! Ticket endpoints: listing with filters, creation, partial updates,
//! guarded deletion and the metrics report.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use armonia_core::domain::{
    ActualizarPqr, NuevoPqr, Pqr, PqrCategoria, PqrEstado, PqrPrioridad, PqrTipo,
};
use armonia_core::repositories::PqrFilter;
use armonia_core::services::{PeriodoMetricas, PqrMetricas, PqrResumen};
use armonia_security::rbac::has_capability;
use armonia_security::Rol;
use armonia_shared::types::Pagination;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{resolve_tenant, AuthUser};
use crate::response::{ApiResponse, PaginationMeta};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PqrListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub estado: Option<PqrEstado>,
    pub categoria: Option<PqrCategoria>,
    pub tipo: Option<PqrTipo>,
    pub prioridad: Option<PqrPrioridad>,
    pub solicitante_id: Option<Uuid>,
    pub responsable_id: Option<String>,
    pub search: Option<String>,
    pub fecha_desde: Option<DateTime<Utc>>,
    pub fecha_hasta: Option<DateTime<Utc>>,
    /// Super-admin override; everyone else is pinned to their own tenant.
    pub tenant: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TenantQuery {
    pub tenant: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub periodo: Option<String>,
    pub tenant: Option<String>,
}

#[derive(Serialize)]
pub struct PqrListData {
    pub items: Vec<Pqr>,
    pub pagination: PaginationMeta,
    pub stats: PqrResumen,
}

/// GET /api/v1/pqr
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(q): Query<PqrListQuery>,
) -> ApiResult<Json<ApiResponse<PqrListData>>> {
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.pqr_service(&ctx.tenant_id).await?;

    let pagination = Pagination {
        page: q.page.unwrap_or(1),
        limit: q.limit.unwrap_or(Pagination::default().limit),
    };
    let filter = PqrFilter {
        estado: q.estado,
        categoria: q.categoria,
        tipo: q.tipo,
        prioridad: q.prioridad,
        solicitante_id: q.solicitante_id,
        responsable_id: q.responsable_id,
        search: q.search,
        fecha_desde: q.fecha_desde,
        fecha_hasta: q.fecha_hasta,
    };

    let (page, stats) = svc.listar(&filter, pagination).await?;
    Ok(Json(ApiResponse::success(PqrListData {
        pagination: PaginationMeta::from_page(&page),
        items: page.data,
        stats,
    })))
}

/// POST /api/v1/pqr
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(q): Query<TenantQuery>,
    Json(payload): Json<NuevoPqr>,
) -> ApiResult<Response> {
    if !has_capability(auth.0.rol, "pqr", "create") {
        return Err(ApiError::forbidden("No tiene permisos para crear PQRs"));
    }
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.pqr_service(&ctx.tenant_id).await?;

    let creado = svc.crear(auth.0.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(creado))).into_response())
}

/// GET /api/v1/pqr/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<TenantQuery>,
) -> ApiResult<Json<ApiResponse<Pqr>>> {
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.pqr_service(&ctx.tenant_id).await?;
    Ok(Json(ApiResponse::success(svc.obtener(&id).await?)))
}

/// PUT /api/v1/pqr/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<TenantQuery>,
    Json(payload): Json<ActualizarPqr>,
) -> ApiResult<Json<ApiResponse<Pqr>>> {
    if !puede_actualizar(auth.0.rol) {
        return Err(ApiError::forbidden("No tiene permisos para actualizar PQRs"));
    }
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.pqr_service(&ctx.tenant_id).await?;
    Ok(Json(ApiResponse::success(svc.actualizar(&id, payload).await?)))
}

/// DELETE /api/v1/pqr/{id}
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<TenantQuery>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require_rol(Rol::AdminConjunto)?;
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.pqr_service(&ctx.tenant_id).await?;
    svc.eliminar(&id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// GET /api/v1/pqr/metrics
pub async fn metrics(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(q): Query<MetricsQuery>,
) -> ApiResult<Json<ApiResponse<PqrMetricas>>> {
    auth.require_rol(Rol::AdminConjunto)?;
    let ctx = resolve_tenant(&state, &auth.0, q.tenant.as_deref()).await?;
    let svc = state.pqr_service(&ctx.tenant_id).await?;

    let periodo = q
        .periodo
        .as_deref()
        .and_then(PeriodoMetricas::from_str)
        .unwrap_or(PeriodoMetricas::Mes);
    Ok(Json(ApiResponse::success(svc.metricas(periodo).await?)))
}

fn puede_actualizar(rol: Rol) -> bool {
    has_capability(rol, "pqr", "update:assigned") || has_capability(rol, "pqr", "update:maintenance")
}
