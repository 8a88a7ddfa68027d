// ============================================================================
// Armonia Core - PQR Workflow Service
// File: crates/armonia-core/src/services/pqr_service.rs
// ============================================================================
//! Ticket lifecycle: creation with automatic triage, partial updates with
//! timestamp side effects, guarded deletion, filtered listing and SLA
//! metrics.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use armonia_shared::types::{Page, Pagination};

use crate::domain::pqr::{
    formato_numero, prioridad_automatica, responsable_automatico, ActualizarPqr, NuevoPqr, Pqr,
    PqrCategoria, PqrEstado, PqrPrioridad, PqrTipo,
};
use crate::error::DomainError;
use crate::repositories::{PqrFilter, PqrRepository};

pub struct PqrService<R: PqrRepository> {
    repo: Arc<R>,
    /// Strict linear transitions (spec'd as an explicit switch; the
    /// permissive behavior is the historical default).
    transiciones_estrictas: bool,
}

/// Status/category counts over the whole ticket set, returned next to every
/// listing.
#[derive(Debug, Clone, Serialize)]
pub struct PqrResumen {
    pub total: u64,
    pub recibidos: u64,
    pub en_proceso: u64,
    pub resueltos: u64,
    pub cerrados: u64,
    pub por_categoria: BTreeMap<String, u64>,
}

/// Trailing window for the metrics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodoMetricas {
    Semana,
    Mes,
    Trimestre,
    #[serde(alias = "año")]
    Anio,
}

impl PeriodoMetricas {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "semana" => Some(PeriodoMetricas::Semana),
            "mes" => Some(PeriodoMetricas::Mes),
            "trimestre" => Some(PeriodoMetricas::Trimestre),
            "año" | "anio" => Some(PeriodoMetricas::Anio),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodoMetricas::Semana => "semana",
            PeriodoMetricas::Mes => "mes",
            PeriodoMetricas::Trimestre => "trimestre",
            PeriodoMetricas::Anio => "año",
        }
    }

    fn inicio(&self, ahora: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            PeriodoMetricas::Semana => ahora - Duration::days(7),
            PeriodoMetricas::Mes => ahora - Duration::days(30),
            PeriodoMetricas::Trimestre => ahora - Duration::days(90),
            PeriodoMetricas::Anio => ahora - Duration::days(365),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricasResumen {
    pub total_pqrs: u64,
    pub total_periodo: u64,
    pub tiempo_respuesta_promedio_horas: i64,
    pub satisfaccion_promedio: f64,
    pub tasa_resolucion: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricasDistribucion {
    pub estados: BTreeMap<String, u64>,
    pub tipos: BTreeMap<String, u64>,
    pub categorias: BTreeMap<String, u64>,
    pub prioridades: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TendenciaMensual {
    pub mes: String,
    pub cantidad: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoriaConteo {
    pub categoria: String,
    pub cantidad: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PqrReciente {
    pub id: Uuid,
    pub numero: String,
    pub tipo: PqrTipo,
    pub categoria: PqrCategoria,
    pub asunto: String,
    pub estado: PqrEstado,
    pub prioridad: PqrPrioridad,
    pub fecha_creacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EficienciaResponsable {
    pub responsable_id: String,
    pub total_atendidos: u64,
    pub tiempo_respuesta_promedio_horas: i64,
    pub satisfaccion_promedio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PqrMetricas {
    pub periodo: String,
    pub resumen: MetricasResumen,
    pub distribucion: MetricasDistribucion,
    pub tendencia: Vec<TendenciaMensual>,
    pub top_categorias: Vec<CategoriaConteo>,
    pub recientes: Vec<PqrReciente>,
    pub responsables: Vec<EficienciaResponsable>,
}

impl<R: PqrRepository> PqrService<R> {
    pub fn new(repo: Arc<R>, transiciones_estrictas: bool) -> Self {
        Self { repo, transiciones_estrictas }
    }

    /// Create a ticket: validate, number it, triage priority and default
    /// assignee, persist in RECIBIDO.
    pub async fn crear(&self, solicitante_id: Uuid, nuevo: NuevoPqr) -> Result<Pqr, DomainError> {
        nuevo.validate()?;

        let total = self.repo.count_all().await?;
        let ahora = Utc::now();

        let pqr = Pqr {
            id: Uuid::new_v4(),
            numero: formato_numero(ahora.year(), total + 1),
            tipo: nuevo.tipo,
            categoria: nuevo.categoria,
            asunto: nuevo.asunto.trim().to_string(),
            descripcion: nuevo.descripcion.trim().to_string(),
            estado: PqrEstado::Recibido,
            prioridad: prioridad_automatica(nuevo.tipo, nuevo.categoria),
            anonimo: nuevo.anonimo,
            solicitante_id,
            responsable_id: responsable_automatico(nuevo.categoria).map(String::from),
            propiedad_id: nuevo.propiedad_id,
            adjuntos: nuevo.adjuntos.unwrap_or_default(),
            respuesta: None,
            observaciones: None,
            calificacion: None,
            comentario_calificacion: None,
            fecha_creacion: ahora,
            fecha_respuesta: None,
            fecha_cierre: None,
        };

        let created = self.repo.create(&pqr).await?;
        info!("PQR {} creado con prioridad {}", created.numero, created.prioridad.as_str());
        Ok(created)
    }

    pub async fn obtener(&self, id: &Uuid) -> Result<Pqr, DomainError> {
        self.repo.find_by_id(id).await?.ok_or(DomainError::PqrNotFound)
    }

    /// Apply a partial update.
    ///
    /// Entering RESUELTO with a non-empty respuesta stamps `fecha_respuesta`
    /// the first time only; entering CERRADO stamps `fecha_cierre` the first
    /// time only. Both stamps are idempotent on repeat updates.
    pub async fn actualizar(&self, id: &Uuid, cambios: ActualizarPqr) -> Result<Pqr, DomainError> {
        cambios.validate()?;

        let actual = self.repo.find_by_id(id).await?.ok_or(DomainError::PqrNotFound)?;
        let mut pqr = actual.clone();

        if let Some(nuevo_estado) = cambios.estado {
            if self.transiciones_estrictas && !actual.estado.transicion_valida(nuevo_estado) {
                return Err(DomainError::BusinessRule(format!(
                    "Transición de estado no permitida: {} a {}",
                    actual.estado.as_str(),
                    nuevo_estado.as_str()
                )));
            }
            pqr.estado = nuevo_estado;

            let ahora = Utc::now();
            let respuesta_presente = cambios
                .respuesta
                .as_deref()
                .map(|r| !r.trim().is_empty())
                .unwrap_or(false);
            if nuevo_estado == PqrEstado::Resuelto
                && respuesta_presente
                && actual.fecha_respuesta.is_none()
            {
                pqr.fecha_respuesta = Some(ahora);
            }
            if nuevo_estado == PqrEstado::Cerrado && actual.fecha_cierre.is_none() {
                pqr.fecha_cierre = Some(ahora);
            }
        }

        if let Some(prioridad) = cambios.prioridad {
            pqr.prioridad = prioridad;
        }
        if let Some(responsable) = cambios.responsable_id {
            pqr.responsable_id = Some(responsable);
        }
        if let Some(observaciones) = cambios.observaciones {
            pqr.observaciones = Some(observaciones);
        }
        if let Some(respuesta) = cambios.respuesta {
            pqr.respuesta = Some(respuesta);
        }
        if let Some(calificacion) = cambios.calificacion {
            pqr.calificacion = Some(calificacion);
        }
        if let Some(comentario) = cambios.comentario_calificacion {
            pqr.comentario_calificacion = Some(comentario);
        }

        self.repo.update(&pqr).await
    }

    /// Tickets are removable only before any work has started on them.
    pub async fn eliminar(&self, id: &Uuid) -> Result<(), DomainError> {
        let pqr = self.repo.find_by_id(id).await?.ok_or(DomainError::PqrNotFound)?;
        if pqr.estado != PqrEstado::Recibido {
            return Err(DomainError::BusinessRule(
                "Solo se pueden eliminar PQRs en estado RECIBIDO".into(),
            ));
        }
        self.repo.delete(id).await?;
        info!("PQR {} eliminado", pqr.numero);
        Ok(())
    }

    /// Filtered page (newest first) plus the global status summary.
    pub async fn listar(
        &self,
        filter: &PqrFilter,
        pagination: Pagination,
    ) -> Result<(Page<Pqr>, PqrResumen), DomainError> {
        let pagination = pagination.clamped();
        let (items, total) = self.repo.list(filter, pagination).await?;
        let resumen = self.resumen().await?;
        Ok((Page::new(items, pagination, total), resumen))
    }

    async fn resumen(&self) -> Result<PqrResumen, DomainError> {
        let todos = self.repo.list_all().await?;
        let mut por_categoria: BTreeMap<String, u64> = BTreeMap::new();
        for categoria in PqrCategoria::ALL {
            por_categoria.insert(categoria.as_str().to_string(), 0);
        }
        for pqr in &todos {
            *por_categoria.entry(pqr.categoria.as_str().to_string()).or_insert(0) += 1;
        }
        let contar = |estado: PqrEstado| todos.iter().filter(|p| p.estado == estado).count() as u64;
        Ok(PqrResumen {
            total: todos.len() as u64,
            recibidos: contar(PqrEstado::Recibido),
            en_proceso: contar(PqrEstado::EnProceso),
            resueltos: contar(PqrEstado::Resuelto),
            cerrados: contar(PqrEstado::Cerrado),
            por_categoria,
        })
    }

    /// Aggregate metrics over a trailing window plus the 6-month creation
    /// trend and per-assignee efficiency.
    pub async fn metricas(&self, periodo: PeriodoMetricas) -> Result<PqrMetricas, DomainError> {
        let todos = self.repo.list_all().await?;
        let ahora = Utc::now();
        let inicio = periodo.inicio(ahora);

        let total = todos.len() as u64;
        let total_periodo =
            todos.iter().filter(|p| p.fecha_creacion >= inicio && p.fecha_creacion <= ahora).count()
                as u64;

        let mut estados = BTreeMap::new();
        for estado in PqrEstado::ALL {
            let n = todos.iter().filter(|p| p.estado == estado).count() as u64;
            estados.insert(estado.as_str().to_string(), n);
        }
        let mut tipos = BTreeMap::new();
        for tipo in [PqrTipo::Peticion, PqrTipo::Queja, PqrTipo::Reclamo, PqrTipo::Sugerencia] {
            let n = todos.iter().filter(|p| p.tipo == tipo).count() as u64;
            tipos.insert(tipo.as_str().to_string(), n);
        }
        let mut categorias = BTreeMap::new();
        for categoria in PqrCategoria::ALL {
            let n = todos.iter().filter(|p| p.categoria == categoria).count() as u64;
            categorias.insert(categoria.as_str().to_string(), n);
        }
        let mut prioridades = BTreeMap::new();
        for prioridad in PqrPrioridad::ALL {
            let n = todos.iter().filter(|p| p.prioridad == prioridad).count() as u64;
            prioridades.insert(prioridad.as_str().to_string(), n);
        }

        let resueltos = *estados.get(PqrEstado::Resuelto.as_str()).unwrap_or(&0);
        let cerrados = *estados.get(PqrEstado::Cerrado.as_str()).unwrap_or(&0);
        let tasa_resolucion = if total > 0 {
            ((resueltos + cerrados) as f64 / total as f64 * 100.0).round() as i64
        } else {
            0
        };

        let resumen = MetricasResumen {
            total_pqrs: total,
            total_periodo,
            tiempo_respuesta_promedio_horas: promedio_horas_respuesta(&todos),
            satisfaccion_promedio: promedio_satisfaccion(&todos),
            tasa_resolucion,
        };

        let tendencia = tendencia_mensual(&todos, ahora);

        let mut top_categorias: Vec<CategoriaConteo> = categorias
            .iter()
            .map(|(categoria, cantidad)| CategoriaConteo {
                categoria: categoria.clone(),
                cantidad: *cantidad,
            })
            .collect();
        top_categorias.sort_by(|a, b| b.cantidad.cmp(&a.cantidad).then(a.categoria.cmp(&b.categoria)));
        top_categorias.truncate(5);

        let mut recientes: Vec<&Pqr> = todos.iter().collect();
        recientes.sort_by(|a, b| b.fecha_creacion.cmp(&a.fecha_creacion));
        let recientes = recientes
            .into_iter()
            .take(5)
            .map(|p| PqrReciente {
                id: p.id,
                numero: p.numero.clone(),
                tipo: p.tipo,
                categoria: p.categoria,
                asunto: p.asunto.clone(),
                estado: p.estado,
                prioridad: p.prioridad,
                fecha_creacion: p.fecha_creacion,
            })
            .collect();

        Ok(PqrMetricas {
            periodo: periodo.as_str().to_string(),
            resumen,
            distribucion: MetricasDistribucion { estados, tipos, categorias, prioridades },
            tendencia,
            top_categorias,
            recientes,
            responsables: eficiencia_responsables(&todos),
        })
    }
}

fn promedio_horas_respuesta(pqrs: &[Pqr]) -> i64 {
    let horas: Vec<f64> = pqrs
        .iter()
        .filter_map(|p| {
            let respuesta = p.fecha_respuesta?;
            Some((respuesta - p.fecha_creacion).num_seconds() as f64 / 3600.0)
        })
        .collect();
    if horas.is_empty() {
        return 0;
    }
    (horas.iter().sum::<f64>() / horas.len() as f64).round() as i64
}

fn promedio_satisfaccion(pqrs: &[Pqr]) -> f64 {
    let calificados: Vec<i32> = pqrs.iter().filter_map(|p| p.calificacion).collect();
    if calificados.is_empty() {
        return 0.0;
    }
    let promedio = calificados.iter().sum::<i32>() as f64 / calificados.len() as f64;
    (promedio * 10.0).round() / 10.0
}

/// Creation counts for the last six calendar months, oldest first.
fn tendencia_mensual(pqrs: &[Pqr], ahora: DateTime<Utc>) -> Vec<TendenciaMensual> {
    let indice_actual = ahora.year() * 12 + ahora.month() as i32 - 1;
    (0..6)
        .rev()
        .map(|atras| {
            let indice = indice_actual - atras;
            let (year, month) = (indice.div_euclid(12), indice.rem_euclid(12) as u32 + 1);
            let cantidad = pqrs
                .iter()
                .filter(|p| p.fecha_creacion.year() == year && p.fecha_creacion.month() == month)
                .count() as u64;
            TendenciaMensual { mes: format!("{:04}-{:02}", year, month), cantidad }
        })
        .collect()
}

fn eficiencia_responsables(pqrs: &[Pqr]) -> Vec<EficienciaResponsable> {
    struct Acumulado {
        atendidos: u64,
        horas: f64,
        satisfaccion: i64,
        calificados: u64,
    }

    let mut por_responsable: BTreeMap<String, Acumulado> = BTreeMap::new();
    for pqr in pqrs {
        let (Some(responsable), Some(fecha_respuesta)) = (&pqr.responsable_id, pqr.fecha_respuesta)
        else {
            continue;
        };
        let acc = por_responsable.entry(responsable.clone()).or_insert(Acumulado {
            atendidos: 0,
            horas: 0.0,
            satisfaccion: 0,
            calificados: 0,
        });
        acc.atendidos += 1;
        acc.horas += (fecha_respuesta - pqr.fecha_creacion).num_seconds() as f64 / 3600.0;
        if let Some(calificacion) = pqr.calificacion {
            acc.satisfaccion += calificacion as i64;
            acc.calificados += 1;
        }
    }

    por_responsable
        .into_iter()
        .map(|(responsable_id, acc)| EficienciaResponsable {
            responsable_id,
            total_atendidos: acc.atendidos,
            tiempo_respuesta_promedio_horas: (acc.horas / acc.atendidos as f64).round() as i64,
            satisfaccion_promedio: if acc.calificados > 0 {
                (acc.satisfaccion as f64 / acc.calificados as f64 * 10.0).round() / 10.0
            } else {
                0.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::pqr_repository::MockPqrRepository;

    fn nuevo(tipo: PqrTipo, categoria: PqrCategoria) -> NuevoPqr {
        NuevoPqr {
            tipo,
            categoria,
            asunto: "Ruido excesivo".into(),
            descripcion: "Los vecinos hacen mucho ruido después de las 10pm".into(),
            anonimo: false,
            adjuntos: None,
            propiedad_id: None,
        }
    }

    fn pqr_base(estado: PqrEstado) -> Pqr {
        Pqr {
            id: Uuid::new_v4(),
            numero: "PQR-2024-001".into(),
            tipo: PqrTipo::Queja,
            categoria: PqrCategoria::Ruido,
            asunto: "Ruido excesivo".into(),
            descripcion: "Los vecinos hacen mucho ruido después de las 10pm".into(),
            estado,
            prioridad: PqrPrioridad::Media,
            anonimo: false,
            solicitante_id: Uuid::new_v4(),
            responsable_id: None,
            propiedad_id: None,
            adjuntos: vec![],
            respuesta: None,
            observaciones: None,
            calificacion: None,
            comentario_calificacion: None,
            fecha_creacion: Utc::now(),
            fecha_respuesta: None,
            fecha_cierre: None,
        }
    }

    fn servicio(repo: MockPqrRepository) -> PqrService<MockPqrRepository> {
        PqrService::new(Arc::new(repo), false)
    }

    #[tokio::test]
    async fn crear_applies_triage_and_numbering() {
        let mut repo = MockPqrRepository::new();
        repo.expect_count_all().returning(|| Ok(2));
        repo.expect_create().returning(|p| Ok(p.clone()));

        let svc = servicio(repo);
        let creado = svc
            .crear(Uuid::new_v4(), nuevo(PqrTipo::Reclamo, PqrCategoria::Mantenimiento))
            .await
            .unwrap();

        assert_eq!(creado.estado, PqrEstado::Recibido);
        assert_eq!(creado.prioridad, PqrPrioridad::Urgente);
        assert_eq!(creado.responsable_id.as_deref(), Some("admin-maintenance"));
        assert_eq!(creado.numero, formato_numero(Utc::now().year(), 3));
    }

    #[tokio::test]
    async fn crear_queja_ruido_has_media_priority_and_no_assignee() {
        let mut repo = MockPqrRepository::new();
        repo.expect_count_all().returning(|| Ok(0));
        repo.expect_create().returning(|p| Ok(p.clone()));

        let svc = servicio(repo);
        let creado = svc
            .crear(Uuid::new_v4(), nuevo(PqrTipo::Queja, PqrCategoria::Ruido))
            .await
            .unwrap();

        assert_eq!(creado.estado, PqrEstado::Recibido);
        assert_eq!(creado.prioridad, PqrPrioridad::Media);
        assert_eq!(creado.responsable_id, None);
    }

    #[tokio::test]
    async fn crear_rejects_short_asunto_before_touching_the_repo() {
        // No expectations set: any repository call would panic the test.
        let svc = servicio(MockPqrRepository::new());
        let mut invalido = nuevo(PqrTipo::Queja, PqrCategoria::Ruido);
        invalido.asunto = "Ayá".into();

        let result = svc.crear(Uuid::new_v4(), invalido).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn resolver_con_respuesta_stamps_fecha_respuesta_once() {
        let pqr = pqr_base(PqrEstado::EnProceso);
        let id = pqr.id;

        let mut repo = MockPqrRepository::new();
        {
            let pqr = pqr.clone();
            repo.expect_find_by_id().returning(move |_| Ok(Some(pqr.clone())));
        }
        repo.expect_update().returning(|p| Ok(p.clone()));

        let svc = servicio(repo);
        let cambios = ActualizarPqr {
            estado: Some(PqrEstado::Resuelto),
            respuesta: Some("Resuelto".into()),
            ..Default::default()
        };
        let actualizado = svc.actualizar(&id, cambios).await.unwrap();
        assert!(actualizado.fecha_respuesta.is_some());
        assert_eq!(actualizado.respuesta.as_deref(), Some("Resuelto"));

        // Second identical update against the already-stamped ticket.
        let marca_original = actualizado.fecha_respuesta;
        let mut repo = MockPqrRepository::new();
        {
            let ya_resuelto = actualizado.clone();
            repo.expect_find_by_id().returning(move |_| Ok(Some(ya_resuelto.clone())));
        }
        repo.expect_update().returning(|p| Ok(p.clone()));

        let svc = servicio(repo);
        let cambios = ActualizarPqr {
            estado: Some(PqrEstado::Resuelto),
            respuesta: Some("Resuelto".into()),
            ..Default::default()
        };
        let repetido = svc.actualizar(&id, cambios).await.unwrap();
        assert_eq!(repetido.fecha_respuesta, marca_original);
    }

    #[tokio::test]
    async fn resolver_sin_respuesta_does_not_stamp() {
        let pqr = pqr_base(PqrEstado::EnProceso);
        let id = pqr.id;

        let mut repo = MockPqrRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(pqr.clone())));
        repo.expect_update().returning(|p| Ok(p.clone()));

        let svc = servicio(repo);
        let cambios =
            ActualizarPqr { estado: Some(PqrEstado::Resuelto), ..Default::default() };
        let actualizado = svc.actualizar(&id, cambios).await.unwrap();
        assert!(actualizado.fecha_respuesta.is_none());
    }

    #[tokio::test]
    async fn cerrar_stamps_fecha_cierre() {
        let pqr = pqr_base(PqrEstado::Resuelto);
        let id = pqr.id;

        let mut repo = MockPqrRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(pqr.clone())));
        repo.expect_update().returning(|p| Ok(p.clone()));

        let svc = servicio(repo);
        let cambios = ActualizarPqr { estado: Some(PqrEstado::Cerrado), ..Default::default() };
        let actualizado = svc.actualizar(&id, cambios).await.unwrap();
        assert!(actualizado.fecha_cierre.is_some());
    }

    #[tokio::test]
    async fn calificacion_out_of_range_is_rejected() {
        let svc = servicio(MockPqrRepository::new());
        let cambios = ActualizarPqr { calificacion: Some(6), ..Default::default() };
        let result = svc.actualizar(&Uuid::new_v4(), cambios).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn eliminar_only_in_recibido() {
        let pqr = pqr_base(PqrEstado::EnProceso);
        let id = pqr.id;

        // No expect_delete: reaching the delete would panic the test.
        let mut repo = MockPqrRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(pqr.clone())));

        let svc = servicio(repo);
        let result = svc.eliminar(&id).await;
        assert!(matches!(result, Err(DomainError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn eliminar_recibido_succeeds() {
        let pqr = pqr_base(PqrEstado::Recibido);
        let id = pqr.id;

        let mut repo = MockPqrRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(pqr.clone())));
        repo.expect_delete().returning(|_| Ok(()));

        let svc = servicio(repo);
        assert!(svc.eliminar(&id).await.is_ok());
    }

    #[tokio::test]
    async fn strict_mode_rejects_stage_skips() {
        let pqr = pqr_base(PqrEstado::Recibido);
        let id = pqr.id;

        let mut repo = MockPqrRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(pqr.clone())));

        let svc = PqrService::new(Arc::new(repo), true);
        let cambios = ActualizarPqr { estado: Some(PqrEstado::Cerrado), ..Default::default() };
        let result = svc.actualizar(&id, cambios).await;
        assert!(matches!(result, Err(DomainError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn metricas_compute_rates_and_averages() {
        let mut resuelto = pqr_base(PqrEstado::Resuelto);
        resuelto.fecha_creacion = Utc::now() - Duration::hours(10);
        resuelto.fecha_respuesta = Some(resuelto.fecha_creacion + Duration::hours(4));
        resuelto.calificacion = Some(5);
        resuelto.responsable_id = Some("admin-general".into());

        let mut cerrado = pqr_base(PqrEstado::Cerrado);
        cerrado.fecha_creacion = Utc::now() - Duration::hours(20);
        cerrado.fecha_respuesta = Some(cerrado.fecha_creacion + Duration::hours(8));
        cerrado.calificacion = Some(4);
        cerrado.responsable_id = Some("admin-general".into());

        let abierto = pqr_base(PqrEstado::Recibido);

        let todos = vec![resuelto, cerrado, abierto];
        let mut repo = MockPqrRepository::new();
        repo.expect_list_all().returning(move || Ok(todos.clone()));

        let svc = servicio(repo);
        let metricas = svc.metricas(PeriodoMetricas::Mes).await.unwrap();

        assert_eq!(metricas.resumen.total_pqrs, 3);
        // (1 resuelto + 1 cerrado) / 3 = 66.7% -> 67
        assert_eq!(metricas.resumen.tasa_resolucion, 67);
        // (4h + 8h) / 2
        assert_eq!(metricas.resumen.tiempo_respuesta_promedio_horas, 6);
        // (5 + 4) / 2 = 4.5
        assert_eq!(metricas.resumen.satisfaccion_promedio, 4.5);
        assert_eq!(metricas.tendencia.len(), 6);

        assert_eq!(metricas.responsables.len(), 1);
        let eficiencia = &metricas.responsables[0];
        assert_eq!(eficiencia.responsable_id, "admin-general");
        assert_eq!(eficiencia.total_atendidos, 2);
        assert_eq!(eficiencia.tiempo_respuesta_promedio_horas, 6);
        assert_eq!(eficiencia.satisfaccion_promedio, 4.5);
    }
}
