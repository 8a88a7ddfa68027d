// ============================================================================
// Armonia Infrastructure - PostgreSQL Conjunto Repository
// File: crates/armonia-infrastructure/src/database/postgres/conjunto_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use armonia_core::domain::{Conjunto, PlanTipo};
use armonia_core::error::DomainError;
use armonia_core::repositories::ConjuntoRepository;

pub struct PgConjuntoRepository {
    pool: PgPool,
}

impl PgConjuntoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, tenant_id, nombre, direccion, plan, activo, fecha_creacion";

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct ConjuntoRow {
    id: Uuid,
    tenant_id: String,
    nombre: String,
    direccion: Option<String>,
    plan: String,
    activo: bool,
    fecha_creacion: DateTime<Utc>,
}

impl From<ConjuntoRow> for Conjunto {
    fn from(row: ConjuntoRow) -> Self {
        Conjunto {
            id: row.id,
            tenant_id: row.tenant_id,
            nombre: row.nombre,
            direccion: row.direccion,
            plan: PlanTipo::from_str(&row.plan).unwrap_or_default(),
            activo: row.activo,
            fecha_creacion: row.fecha_creacion,
        }
    }
}

#[async_trait]
impl ConjuntoRepository for PgConjuntoRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Conjunto>, DomainError> {
        let row: Option<ConjuntoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM conjuntos WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding conjunto by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        Ok(row.map(|r| r.into()))
    }

    async fn find_by_tenant_id(&self, tenant_id: &str) -> Result<Option<Conjunto>, DomainError> {
        let row: Option<ConjuntoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM conjuntos WHERE tenant_id = $1",
            COLUMNS
        ))
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding conjunto by tenant id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        Ok(row.map(|r| r.into()))
    }

    async fn find_latest(&self) -> Result<Option<Conjunto>, DomainError> {
        let row: Option<ConjuntoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM conjuntos ORDER BY fecha_creacion DESC LIMIT 1",
            COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding latest conjunto: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, conjunto: &Conjunto) -> Result<Conjunto, DomainError> {
        info!("Creating conjunto: {}", conjunto.tenant_id);

        let row: ConjuntoRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO conjuntos (id, tenant_id, nombre, direccion, plan, activo, fecha_creacion)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(conjunto.id)
        .bind(&conjunto.tenant_id)
        .bind(&conjunto.nombre)
        .bind(&conjunto.direccion)
        .bind(conjunto.plan.as_str())
        .bind(conjunto.activo)
        .bind(conjunto.fecha_creacion)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating conjunto: {}", e);
            let msg = e.to_string();
            if msg.contains("unique") || msg.contains("duplicate") {
                DomainError::BusinessRule(format!(
                    "El tenant {} ya existe",
                    conjunto.tenant_id
                ))
            } else {
                DomainError::DatabaseError(msg)
            }
        })?;

        Ok(row.into())
    }

    async fn update(&self, conjunto: &Conjunto) -> Result<Conjunto, DomainError> {
        let row: ConjuntoRow = sqlx::query_as(&format!(
            r#"
            UPDATE conjuntos
            SET nombre = $2, direccion = $3, plan = $4, activo = $5
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(conjunto.id)
        .bind(&conjunto.nombre)
        .bind(&conjunto.direccion)
        .bind(conjunto.plan.as_str())
        .bind(conjunto.activo)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error updating conjunto: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }
}
