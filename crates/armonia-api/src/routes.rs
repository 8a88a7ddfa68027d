//! Route table

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{asambleas, auth, conjuntos, health, pqr};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
        .route("/api/v1/auth/verify-email", post(auth::verify_email))
        // PQR workflow
        .route("/api/v1/pqr", get(pqr::list).post(pqr::create))
        .route("/api/v1/pqr/metrics", get(pqr::metrics))
        .route("/api/v1/pqr/{id}", get(pqr::get_by_id).put(pqr::update).delete(pqr::remove))
        // Asambleas
        .route("/api/v1/asambleas", get(asambleas::list).post(asambleas::create))
        .route(
            "/api/v1/asambleas/{id}",
            get(asambleas::get_by_id).put(asambleas::update).delete(asambleas::remove),
        )
        // Tenant administration
        .route("/api/v1/conjuntos", get(conjuntos::list).post(conjuntos::create))
        .route("/api/v1/conjuntos/{tenant_id}/activo", put(conjuntos::set_activo))
        .route("/api/v1/conjuntos/{tenant_id}", delete(conjuntos::remove))
        .with_state(state)
}
