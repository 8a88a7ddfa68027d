// ============================================================================
// Armonia Infrastructure - PostgreSQL Asamblea Repository
// File: crates/armonia-infrastructure/src/database/postgres/asamblea_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{error, info};
use uuid::Uuid;

use armonia_core::domain::{
    Asamblea, AsambleaEstado, Asistentes, PuntoOrdenDelDia, TipoAsamblea,
};
use armonia_core::error::DomainError;
use armonia_core::repositories::{AsambleaFilter, AsambleaRepository};
use armonia_shared::types::Pagination;

pub struct PgAsambleaRepository {
    pool: PgPool,
}

impl PgAsambleaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, titulo, descripcion, tipo, fecha_hora, lugar, duracion_estimada, \
                       quorum_minimo, estado, orden_del_dia, convocatoria_dias, \
                       documentos_adjuntos, acta_resumen, observaciones, asistentes, \
                       quorum_alcanzado, creador_id, fecha_creacion, fecha_convocatoria, \
                       fecha_inicio, fecha_fin";

#[derive(Debug, FromRow)]
struct AsambleaRow {
    id: Uuid,
    titulo: String,
    descripcion: String,
    tipo: String,
    fecha_hora: DateTime<Utc>,
    lugar: String,
    duracion_estimada: i32,
    quorum_minimo: i32,
    estado: String,
    orden_del_dia: Json<Vec<PuntoOrdenDelDia>>,
    convocatoria_dias: i32,
    documentos_adjuntos: Json<Vec<String>>,
    acta_resumen: Option<String>,
    observaciones: Option<String>,
    asistentes: Json<Asistentes>,
    quorum_alcanzado: bool,
    creador_id: Uuid,
    fecha_creacion: DateTime<Utc>,
    fecha_convocatoria: Option<DateTime<Utc>>,
    fecha_inicio: Option<DateTime<Utc>>,
    fecha_fin: Option<DateTime<Utc>>,
}

impl TryFrom<AsambleaRow> for Asamblea {
    type Error = DomainError;

    fn try_from(row: AsambleaRow) -> Result<Self, Self::Error> {
        let desconocido = |campo: &str, valor: &str| {
            error!("Unknown {} in asambleas row: {}", campo, valor);
            DomainError::InternalError(format!("Valor desconocido de {}: {}", campo, valor))
        };
        Ok(Asamblea {
            id: row.id,
            titulo: row.titulo,
            descripcion: row.descripcion,
            tipo: TipoAsamblea::from_str(&row.tipo)
                .ok_or_else(|| desconocido("tipo", &row.tipo))?,
            fecha_hora: row.fecha_hora,
            lugar: row.lugar,
            duracion_estimada: row.duracion_estimada,
            quorum_minimo: row.quorum_minimo,
            estado: AsambleaEstado::from_str(&row.estado)
                .ok_or_else(|| desconocido("estado", &row.estado))?,
            orden_del_dia: row.orden_del_dia.0,
            convocatoria_dias: row.convocatoria_dias,
            documentos_adjuntos: row.documentos_adjuntos.0,
            acta_resumen: row.acta_resumen,
            observaciones: row.observaciones,
            asistentes: row.asistentes.0,
            quorum_alcanzado: row.quorum_alcanzado,
            creador_id: row.creador_id,
            fecha_creacion: row.fecha_creacion,
            fecha_convocatoria: row.fecha_convocatoria,
            fecha_inicio: row.fecha_inicio,
            fecha_fin: row.fecha_fin,
        })
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &AsambleaFilter) {
    if let Some(estado) = filter.estado {
        qb.push(" AND estado = ").push_bind(estado.as_str());
    }
    if let Some(tipo) = filter.tipo {
        qb.push(" AND tipo = ").push_bind(tipo.as_str());
    }
    if let Some(search) = &filter.search {
        let patron = format!("%{}%", search);
        qb.push(" AND (titulo ILIKE ")
            .push_bind(patron.clone())
            .push(" OR descripcion ILIKE ")
            .push_bind(patron)
            .push(")");
    }
    if let Some(desde) = filter.fecha_desde {
        qb.push(" AND fecha_hora >= ").push_bind(desde);
    }
    if let Some(hasta) = filter.fecha_hasta {
        qb.push(" AND fecha_hora <= ").push_bind(hasta);
    }
}

#[async_trait]
impl AsambleaRepository for PgAsambleaRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Asamblea>, DomainError> {
        let row: Option<AsambleaRow> = sqlx::query_as(&format!(
            "SELECT {} FROM asambleas WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding asamblea by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        row.map(Asamblea::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &AsambleaFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Asamblea>, u64), DomainError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM asambleas WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error counting asambleas: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM asambleas WHERE 1=1",
            COLUMNS
        ));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY fecha_hora DESC LIMIT ")
            .push_bind(pagination.limit as i64)
            .push(" OFFSET ")
            .push_bind(pagination.offset() as i64);

        let rows: Vec<AsambleaRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error listing asambleas: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        let asambleas = rows
            .into_iter()
            .map(Asamblea::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((asambleas, total as u64))
    }

    async fn list_all(&self) -> Result<Vec<Asamblea>, DomainError> {
        let rows: Vec<AsambleaRow> = sqlx::query_as(&format!(
            "SELECT {} FROM asambleas ORDER BY fecha_hora DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing all asambleas: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        rows.into_iter().map(Asamblea::try_from).collect()
    }

    async fn create(&self, asamblea: &Asamblea) -> Result<Asamblea, DomainError> {
        info!("Creating asamblea {}", asamblea.id);

        let row: AsambleaRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO asambleas (
                id, titulo, descripcion, tipo, fecha_hora, lugar, duracion_estimada,
                quorum_minimo, estado, orden_del_dia, convocatoria_dias,
                documentos_adjuntos, acta_resumen, observaciones, asistentes,
                quorum_alcanzado, creador_id, fecha_creacion, fecha_convocatoria,
                fecha_inicio, fecha_fin
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(asamblea.id)
        .bind(&asamblea.titulo)
        .bind(&asamblea.descripcion)
        .bind(asamblea.tipo.as_str())
        .bind(asamblea.fecha_hora)
        .bind(&asamblea.lugar)
        .bind(asamblea.duracion_estimada)
        .bind(asamblea.quorum_minimo)
        .bind(asamblea.estado.as_str())
        .bind(Json(&asamblea.orden_del_dia))
        .bind(asamblea.convocatoria_dias)
        .bind(Json(&asamblea.documentos_adjuntos))
        .bind(&asamblea.acta_resumen)
        .bind(&asamblea.observaciones)
        .bind(Json(&asamblea.asistentes))
        .bind(asamblea.quorum_alcanzado)
        .bind(asamblea.creador_id)
        .bind(asamblea.fecha_creacion)
        .bind(asamblea.fecha_convocatoria)
        .bind(asamblea.fecha_inicio)
        .bind(asamblea.fecha_fin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating asamblea: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    async fn update(&self, asamblea: &Asamblea) -> Result<Asamblea, DomainError> {
        let row: AsambleaRow = sqlx::query_as(&format!(
            r#"
            UPDATE asambleas
            SET titulo = $2, descripcion = $3, fecha_hora = $4, lugar = $5,
                duracion_estimada = $6, quorum_minimo = $7, estado = $8,
                orden_del_dia = $9, acta_resumen = $10, observaciones = $11,
                asistentes = $12, quorum_alcanzado = $13, fecha_convocatoria = $14,
                fecha_inicio = $15, fecha_fin = $16
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(asamblea.id)
        .bind(&asamblea.titulo)
        .bind(&asamblea.descripcion)
        .bind(asamblea.fecha_hora)
        .bind(&asamblea.lugar)
        .bind(asamblea.duracion_estimada)
        .bind(asamblea.quorum_minimo)
        .bind(asamblea.estado.as_str())
        .bind(Json(&asamblea.orden_del_dia))
        .bind(&asamblea.acta_resumen)
        .bind(&asamblea.observaciones)
        .bind(Json(&asamblea.asistentes))
        .bind(asamblea.quorum_alcanzado)
        .bind(asamblea.fecha_convocatoria)
        .bind(asamblea.fecha_inicio)
        .bind(asamblea.fecha_fin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error updating asamblea: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM asambleas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error deleting asamblea: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;
        Ok(())
    }
}
