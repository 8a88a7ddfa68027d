// ============================================================================
// Armonia Infrastructure - PostgreSQL PQR Repository
// File: crates/armonia-infrastructure/src/database/postgres/pqr_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{error, info};
use uuid::Uuid;

use armonia_core::domain::{Pqr, PqrCategoria, PqrEstado, PqrPrioridad, PqrTipo};
use armonia_core::error::DomainError;
use armonia_core::repositories::{PqrFilter, PqrRepository};
use armonia_shared::types::Pagination;

pub struct PgPqrRepository {
    pool: PgPool,
}

impl PgPqrRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, numero, tipo, categoria, asunto, descripcion, estado, prioridad, \
                       anonimo, solicitante_id, responsable_id, propiedad_id, adjuntos, \
                       respuesta, observaciones, calificacion, comentario_calificacion, \
                       fecha_creacion, fecha_respuesta, fecha_cierre";

#[derive(Debug, FromRow)]
struct PqrRow {
    id: Uuid,
    numero: String,
    tipo: String,
    categoria: String,
    asunto: String,
    descripcion: String,
    estado: String,
    prioridad: String,
    anonimo: bool,
    solicitante_id: Uuid,
    responsable_id: Option<String>,
    propiedad_id: Option<String>,
    adjuntos: Json<Vec<String>>,
    respuesta: Option<String>,
    observaciones: Option<String>,
    calificacion: Option<i32>,
    comentario_calificacion: Option<String>,
    fecha_creacion: DateTime<Utc>,
    fecha_respuesta: Option<DateTime<Utc>>,
    fecha_cierre: Option<DateTime<Utc>>,
}

impl TryFrom<PqrRow> for Pqr {
    type Error = DomainError;

    fn try_from(row: PqrRow) -> Result<Self, Self::Error> {
        let desconocido = |campo: &str, valor: &str| {
            error!("Unknown {} in pqrs row: {}", campo, valor);
            DomainError::InternalError(format!("Valor desconocido de {}: {}", campo, valor))
        };
        Ok(Pqr {
            id: row.id,
            numero: row.numero,
            tipo: PqrTipo::from_str(&row.tipo).ok_or_else(|| desconocido("tipo", &row.tipo))?,
            categoria: PqrCategoria::from_str(&row.categoria)
                .ok_or_else(|| desconocido("categoria", &row.categoria))?,
            asunto: row.asunto,
            descripcion: row.descripcion,
            estado: PqrEstado::from_str(&row.estado)
                .ok_or_else(|| desconocido("estado", &row.estado))?,
            prioridad: PqrPrioridad::from_str(&row.prioridad)
                .ok_or_else(|| desconocido("prioridad", &row.prioridad))?,
            anonimo: row.anonimo,
            solicitante_id: row.solicitante_id,
            responsable_id: row.responsable_id,
            propiedad_id: row.propiedad_id,
            adjuntos: row.adjuntos.0,
            respuesta: row.respuesta,
            observaciones: row.observaciones,
            calificacion: row.calificacion,
            comentario_calificacion: row.comentario_calificacion,
            fecha_creacion: row.fecha_creacion,
            fecha_respuesta: row.fecha_respuesta,
            fecha_cierre: row.fecha_cierre,
        })
    }
}

/// AND-composed filter clauses, shared by the page and count queries.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &PqrFilter) {
    if let Some(estado) = filter.estado {
        qb.push(" AND estado = ").push_bind(estado.as_str());
    }
    if let Some(categoria) = filter.categoria {
        qb.push(" AND categoria = ").push_bind(categoria.as_str());
    }
    if let Some(tipo) = filter.tipo {
        qb.push(" AND tipo = ").push_bind(tipo.as_str());
    }
    if let Some(prioridad) = filter.prioridad {
        qb.push(" AND prioridad = ").push_bind(prioridad.as_str());
    }
    if let Some(solicitante_id) = filter.solicitante_id {
        qb.push(" AND solicitante_id = ").push_bind(solicitante_id);
    }
    if let Some(responsable_id) = &filter.responsable_id {
        qb.push(" AND responsable_id = ").push_bind(responsable_id.clone());
    }
    if let Some(search) = &filter.search {
        let patron = format!("%{}%", search);
        qb.push(" AND (asunto ILIKE ")
            .push_bind(patron.clone())
            .push(" OR descripcion ILIKE ")
            .push_bind(patron.clone())
            .push(" OR numero ILIKE ")
            .push_bind(patron)
            .push(")");
    }
    if let Some(desde) = filter.fecha_desde {
        qb.push(" AND fecha_creacion >= ").push_bind(desde);
    }
    if let Some(hasta) = filter.fecha_hasta {
        qb.push(" AND fecha_creacion <= ").push_bind(hasta);
    }
}

#[async_trait]
impl PqrRepository for PgPqrRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Pqr>, DomainError> {
        let row: Option<PqrRow> = sqlx::query_as(&format!(
            "SELECT {} FROM pqrs WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding pqr by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        row.map(Pqr::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &PqrFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Pqr>, u64), DomainError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM pqrs WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error counting pqrs: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM pqrs WHERE 1=1",
            COLUMNS
        ));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY fecha_creacion DESC LIMIT ")
            .push_bind(pagination.limit as i64)
            .push(" OFFSET ")
            .push_bind(pagination.offset() as i64);

        let rows: Vec<PqrRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error listing pqrs: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        let pqrs = rows
            .into_iter()
            .map(Pqr::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((pqrs, total as u64))
    }

    async fn list_all(&self) -> Result<Vec<Pqr>, DomainError> {
        let rows: Vec<PqrRow> = sqlx::query_as(&format!(
            "SELECT {} FROM pqrs ORDER BY fecha_creacion DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing all pqrs: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        rows.into_iter().map(Pqr::try_from).collect()
    }

    async fn count_all(&self) -> Result<u64, DomainError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pqrs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error counting pqrs: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;
        Ok(count.0 as u64)
    }

    async fn create(&self, pqr: &Pqr) -> Result<Pqr, DomainError> {
        info!("Creating pqr {}", pqr.numero);

        let row: PqrRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO pqrs (
                id, numero, tipo, categoria, asunto, descripcion, estado, prioridad,
                anonimo, solicitante_id, responsable_id, propiedad_id, adjuntos,
                respuesta, observaciones, calificacion, comentario_calificacion,
                fecha_creacion, fecha_respuesta, fecha_cierre
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(pqr.id)
        .bind(&pqr.numero)
        .bind(pqr.tipo.as_str())
        .bind(pqr.categoria.as_str())
        .bind(&pqr.asunto)
        .bind(&pqr.descripcion)
        .bind(pqr.estado.as_str())
        .bind(pqr.prioridad.as_str())
        .bind(pqr.anonimo)
        .bind(pqr.solicitante_id)
        .bind(&pqr.responsable_id)
        .bind(&pqr.propiedad_id)
        .bind(Json(&pqr.adjuntos))
        .bind(&pqr.respuesta)
        .bind(&pqr.observaciones)
        .bind(pqr.calificacion)
        .bind(&pqr.comentario_calificacion)
        .bind(pqr.fecha_creacion)
        .bind(pqr.fecha_respuesta)
        .bind(pqr.fecha_cierre)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating pqr: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    async fn update(&self, pqr: &Pqr) -> Result<Pqr, DomainError> {
        let row: PqrRow = sqlx::query_as(&format!(
            r#"
            UPDATE pqrs
            SET estado = $2, prioridad = $3, responsable_id = $4, respuesta = $5,
                observaciones = $6, calificacion = $7, comentario_calificacion = $8,
                fecha_respuesta = $9, fecha_cierre = $10
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(pqr.id)
        .bind(pqr.estado.as_str())
        .bind(pqr.prioridad.as_str())
        .bind(&pqr.responsable_id)
        .bind(&pqr.respuesta)
        .bind(&pqr.observaciones)
        .bind(pqr.calificacion)
        .bind(&pqr.comentario_calificacion)
        .bind(pqr.fecha_respuesta)
        .bind(pqr.fecha_cierre)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error updating pqr: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM pqrs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error deleting pqr: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;
        Ok(())
    }
}
