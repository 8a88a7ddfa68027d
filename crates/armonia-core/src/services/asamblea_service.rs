// ============================================================================
// Armonia Core - Asamblea Service
// File: crates/armonia-core/src/services/asamblea_service.rs
// ============================================================================
//! Assembly lifecycle: scheduling, the 15-minute start window, restricted
//! finish/cancel transitions, attendance updates with quorum recomputation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use armonia_shared::types::{Page, Pagination};

use crate::domain::asamblea::{
    quorum_alcanzado, ActualizarAsamblea, Asamblea, AsambleaEstado, Asistentes, NuevaAsamblea,
    TipoAsamblea,
};
use crate::error::DomainError;
use crate::repositories::{AsambleaFilter, AsambleaRepository, UsuarioRepository};

pub struct AsambleaService<A: AsambleaRepository, U: UsuarioRepository> {
    asamblea_repo: Arc<A>,
    usuario_repo: Arc<U>,
}

/// Assembly plus the fields derived at read time.
#[derive(Debug, Clone, Serialize)]
pub struct AsambleaDetalle {
    #[serde(flatten)]
    pub asamblea: Asamblea,
    pub total_propietarios: i64,
    pub puede_iniciar: bool,
    pub porcentaje_asistencia: i32,
}

/// Status/type counts over all assemblies, returned next to every listing.
#[derive(Debug, Clone, Serialize)]
pub struct AsambleaResumen {
    pub total: u64,
    pub programadas: u64,
    pub en_curso: u64,
    pub finalizadas: u64,
    pub canceladas: u64,
    pub por_tipo: BTreeMap<String, u64>,
}

impl<A: AsambleaRepository, U: UsuarioRepository> AsambleaService<A, U> {
    pub fn new(asamblea_repo: Arc<A>, usuario_repo: Arc<U>) -> Self {
        Self { asamblea_repo, usuario_repo }
    }

    /// Schedule a new assembly in PROGRAMADA. The call to assembly is
    /// stamped immediately when the date already falls inside the
    /// convocatoria window.
    pub async fn crear(
        &self,
        creador_id: Uuid,
        nueva: NuevaAsamblea,
    ) -> Result<Asamblea, DomainError> {
        nueva.validate()?;

        let ahora = Utc::now();
        if nueva.fecha_hora <= ahora {
            return Err(DomainError::InvalidInput("La fecha debe ser futura".into()));
        }

        let mut asamblea = Asamblea {
            id: Uuid::new_v4(),
            titulo: nueva.titulo.trim().to_string(),
            descripcion: nueva.descripcion.trim().to_string(),
            tipo: nueva.tipo,
            fecha_hora: nueva.fecha_hora,
            lugar: nueva.lugar.trim().to_string(),
            duracion_estimada: nueva.duracion_estimada,
            quorum_minimo: nueva.quorum_minimo,
            estado: AsambleaEstado::Programada,
            orden_del_dia: nueva.orden_del_dia,
            convocatoria_dias: nueva.convocatoria_dias,
            documentos_adjuntos: nueva.documentos_adjuntos.unwrap_or_default(),
            acta_resumen: None,
            observaciones: None,
            asistentes: Asistentes::default(),
            quorum_alcanzado: false,
            creador_id,
            fecha_creacion: ahora,
            fecha_convocatoria: None,
            fecha_inicio: None,
            fecha_fin: None,
        };

        if asamblea.debe_convocar(ahora) {
            asamblea.fecha_convocatoria = Some(ahora);
        }

        let creada = self.asamblea_repo.create(&asamblea).await?;
        info!("Asamblea \"{}\" programada para {}", creada.titulo, creada.fecha_hora);
        Ok(creada)
    }

    pub async fn obtener(
        &self,
        id: &Uuid,
        conjunto_id: &Uuid,
    ) -> Result<AsambleaDetalle, DomainError> {
        let asamblea = self
            .asamblea_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::AsambleaNotFound)?;
        let total = self.usuario_repo.count_propietarios(conjunto_id).await?;
        Ok(self.detalle(asamblea, total))
    }

    /// Apply a partial update under the lifecycle rules:
    /// a FINALIZADA assembly is immutable, EN_CURSO requires the start
    /// window, CANCELADA only applies to PROGRAMADA, and any attendance
    /// change recomputes the quorum flag.
    pub async fn actualizar(
        &self,
        id: &Uuid,
        conjunto_id: &Uuid,
        cambios: ActualizarAsamblea,
    ) -> Result<Asamblea, DomainError> {
        cambios.validate()?;

        let actual = self
            .asamblea_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::AsambleaNotFound)?;

        if actual.estado == AsambleaEstado::Finalizada
            && cambios.estado != Some(AsambleaEstado::Finalizada)
        {
            return Err(DomainError::BusinessRule(
                "No se puede modificar una asamblea finalizada".into(),
            ));
        }

        let mut asamblea = actual.clone();
        let ahora = Utc::now();

        if let Some(titulo) = cambios.titulo {
            asamblea.titulo = titulo.trim().to_string();
        }
        if let Some(descripcion) = cambios.descripcion {
            asamblea.descripcion = descripcion.trim().to_string();
        }
        if let Some(fecha_hora) = cambios.fecha_hora {
            asamblea.fecha_hora = fecha_hora;
        }
        if let Some(lugar) = cambios.lugar {
            asamblea.lugar = lugar.trim().to_string();
        }
        if let Some(duracion) = cambios.duracion_estimada {
            asamblea.duracion_estimada = duracion;
        }
        if let Some(quorum_minimo) = cambios.quorum_minimo {
            asamblea.quorum_minimo = quorum_minimo;
        }
        if let Some(orden) = cambios.orden_del_dia {
            asamblea.orden_del_dia = orden;
        }
        if let Some(acta) = cambios.acta_resumen {
            asamblea.acta_resumen = Some(acta);
        }
        if let Some(observaciones) = cambios.observaciones {
            asamblea.observaciones = Some(observaciones);
        }

        if let Some(nuevo_estado) = cambios.estado {
            match nuevo_estado {
                AsambleaEstado::EnCurso => {
                    if actual.estado == AsambleaEstado::Programada {
                        if !actual.puede_iniciar(ahora) {
                            return Err(DomainError::BusinessRule(
                                "No se puede iniciar la asamblea fuera del horario permitido"
                                    .into(),
                            ));
                        }
                        asamblea.fecha_inicio = Some(ahora);
                    }
                }
                AsambleaEstado::Finalizada => {
                    if actual.estado == AsambleaEstado::EnCurso {
                        asamblea.fecha_fin = Some(ahora);
                        let total =
                            self.usuario_repo.count_propietarios(conjunto_id).await?;
                        asamblea.quorum_alcanzado = quorum_alcanzado(
                            total,
                            asamblea.asistentes.presentes,
                            asamblea.asistentes.delegaciones,
                            asamblea.quorum_minimo,
                        );
                    }
                }
                AsambleaEstado::Cancelada => {
                    if actual.estado != AsambleaEstado::Programada {
                        return Err(DomainError::BusinessRule(
                            "Solo se pueden cancelar asambleas programadas".into(),
                        ));
                    }
                    if asamblea.observaciones.is_none() {
                        asamblea.observaciones = Some("Asamblea cancelada".into());
                    }
                }
                AsambleaEstado::Programada => {}
            }
            asamblea.estado = nuevo_estado;
        }

        if let Some(asistentes) = cambios.asistentes {
            asamblea.asistentes = asamblea.asistentes.merge(asistentes);
            let total = self.usuario_repo.count_propietarios(conjunto_id).await?;
            asamblea.quorum_alcanzado = quorum_alcanzado(
                total,
                asamblea.asistentes.presentes,
                asamblea.asistentes.delegaciones,
                asamblea.quorum_minimo,
            );
        }

        self.asamblea_repo.update(&asamblea).await
    }

    /// Only assemblies that never started can be removed.
    pub async fn eliminar(&self, id: &Uuid) -> Result<(), DomainError> {
        let asamblea = self
            .asamblea_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::AsambleaNotFound)?;
        if asamblea.estado != AsambleaEstado::Programada {
            return Err(DomainError::BusinessRule(
                "Solo se pueden eliminar asambleas en estado PROGRAMADA".into(),
            ));
        }
        self.asamblea_repo.delete(id).await?;
        info!("Asamblea \"{}\" eliminada", asamblea.titulo);
        Ok(())
    }

    pub async fn listar(
        &self,
        filter: &AsambleaFilter,
        pagination: Pagination,
    ) -> Result<(Page<Asamblea>, AsambleaResumen), DomainError> {
        let pagination = pagination.clamped();
        let (items, total) = self.asamblea_repo.list(filter, pagination).await?;
        let resumen = self.resumen().await?;
        Ok((Page::new(items, pagination, total), resumen))
    }

    async fn resumen(&self) -> Result<AsambleaResumen, DomainError> {
        let todas = self.asamblea_repo.list_all().await?;
        let contar =
            |estado: AsambleaEstado| todas.iter().filter(|a| a.estado == estado).count() as u64;
        let mut por_tipo = BTreeMap::new();
        for tipo in TipoAsamblea::ALL {
            let n = todas.iter().filter(|a| a.tipo == tipo).count() as u64;
            por_tipo.insert(tipo.as_str().to_string(), n);
        }
        Ok(AsambleaResumen {
            total: todas.len() as u64,
            programadas: contar(AsambleaEstado::Programada),
            en_curso: contar(AsambleaEstado::EnCurso),
            finalizadas: contar(AsambleaEstado::Finalizada),
            canceladas: contar(AsambleaEstado::Cancelada),
            por_tipo,
        })
    }

    fn detalle(&self, asamblea: Asamblea, total_propietarios: i64) -> AsambleaDetalle {
        let puede_iniciar = asamblea.puede_iniciar(Utc::now());
        let porcentaje = asamblea.porcentaje_asistencia(total_propietarios);
        AsambleaDetalle {
            asamblea,
            total_propietarios,
            puede_iniciar,
            porcentaje_asistencia: porcentaje,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::domain::asamblea::{AsistentesUpdate, PuntoOrdenDelDia};
    use crate::repositories::asamblea_repository::MockAsambleaRepository;
    use crate::repositories::usuario_repository::MockUsuarioRepository;

    fn nueva(fecha_hora: chrono::DateTime<Utc>) -> NuevaAsamblea {
        NuevaAsamblea {
            titulo: "Asamblea Ordinaria".into(),
            descripcion: "Revisión de estados financieros".into(),
            tipo: TipoAsamblea::Ordinaria,
            fecha_hora,
            lugar: "Salón Social".into(),
            duracion_estimada: 120,
            quorum_minimo: 51,
            orden_del_dia: vec![PuntoOrdenDelDia {
                titulo: "Verificación de quórum".into(),
                descripcion: None,
                tiempo_estimado: Some(10),
                responsable: None,
            }],
            convocatoria_dias: 8,
            documentos_adjuntos: None,
        }
    }

    fn programada(fecha_hora: chrono::DateTime<Utc>) -> Asamblea {
        Asamblea {
            id: Uuid::new_v4(),
            titulo: "Asamblea Ordinaria".into(),
            descripcion: "Revisión de estados financieros".into(),
            tipo: TipoAsamblea::Ordinaria,
            fecha_hora,
            lugar: "Salón Social".into(),
            duracion_estimada: 120,
            quorum_minimo: 51,
            estado: AsambleaEstado::Programada,
            orden_del_dia: vec![],
            convocatoria_dias: 8,
            documentos_adjuntos: vec![],
            acta_resumen: None,
            observaciones: None,
            asistentes: Asistentes::default(),
            quorum_alcanzado: false,
            creador_id: Uuid::new_v4(),
            fecha_creacion: Utc::now(),
            fecha_convocatoria: None,
            fecha_inicio: None,
            fecha_fin: None,
        }
    }

    fn servicio(
        asambleas: MockAsambleaRepository,
        usuarios: MockUsuarioRepository,
    ) -> AsambleaService<MockAsambleaRepository, MockUsuarioRepository> {
        AsambleaService::new(Arc::new(asambleas), Arc::new(usuarios))
    }

    #[tokio::test]
    async fn crear_rejects_past_dates() {
        let svc = servicio(MockAsambleaRepository::new(), MockUsuarioRepository::new());
        let result = svc
            .crear(Uuid::new_v4(), nueva(Utc::now() - Duration::hours(1)))
            .await;
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn crear_stamps_convocatoria_inside_window() {
        let mut repo = MockAsambleaRepository::new();
        repo.expect_create().returning(|a| Ok(a.clone()));

        let svc = servicio(repo, MockUsuarioRepository::new());
        // 5 days out, inside the 8-day convocatoria window.
        let creada = svc
            .crear(Uuid::new_v4(), nueva(Utc::now() + Duration::days(5)))
            .await
            .unwrap();
        assert_eq!(creada.estado, AsambleaEstado::Programada);
        assert!(creada.fecha_convocatoria.is_some());
    }

    #[tokio::test]
    async fn iniciar_outside_window_is_rejected() {
        let asamblea = programada(Utc::now() + Duration::hours(2));
        let id = asamblea.id;

        let mut repo = MockAsambleaRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(asamblea.clone())));

        let svc = servicio(repo, MockUsuarioRepository::new());
        let cambios =
            ActualizarAsamblea { estado: Some(AsambleaEstado::EnCurso), ..Default::default() };
        let result = svc.actualizar(&id, &Uuid::new_v4(), cambios).await;
        assert!(matches!(result, Err(DomainError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn iniciar_inside_window_stamps_fecha_inicio() {
        let asamblea = programada(Utc::now() + Duration::minutes(10));
        let id = asamblea.id;

        let mut repo = MockAsambleaRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(asamblea.clone())));
        repo.expect_update().returning(|a| Ok(a.clone()));

        let svc = servicio(repo, MockUsuarioRepository::new());
        let cambios =
            ActualizarAsamblea { estado: Some(AsambleaEstado::EnCurso), ..Default::default() };
        let actualizada = svc.actualizar(&id, &Uuid::new_v4(), cambios).await.unwrap();
        assert_eq!(actualizada.estado, AsambleaEstado::EnCurso);
        assert!(actualizada.fecha_inicio.is_some());
    }

    #[tokio::test]
    async fn attendance_update_recomputes_quorum() {
        let asamblea = programada(Utc::now() + Duration::days(1));
        let id = asamblea.id;

        let mut repo = MockAsambleaRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(asamblea.clone())));
        repo.expect_update().returning(|a| Ok(a.clone()));

        let mut usuarios = MockUsuarioRepository::new();
        usuarios.expect_count_propietarios().returning(|_| Ok(85));

        let svc = servicio(repo, usuarios);
        // 40 + 4 of 85 = 51.8% >= 51%
        let cambios = ActualizarAsamblea {
            asistentes: Some(AsistentesUpdate {
                presentes: Some(40),
                delegaciones: Some(4),
                ..Default::default()
            }),
            ..Default::default()
        };
        let actualizada = svc.actualizar(&id, &Uuid::new_v4(), cambios).await.unwrap();
        assert!(actualizada.quorum_alcanzado);
        assert_eq!(actualizada.asistentes.presentes, 40);
    }

    #[tokio::test]
    async fn finalizada_is_immutable() {
        let mut asamblea = programada(Utc::now() - Duration::days(1));
        asamblea.estado = AsambleaEstado::Finalizada;
        let id = asamblea.id;

        let mut repo = MockAsambleaRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(asamblea.clone())));

        let svc = servicio(repo, MockUsuarioRepository::new());
        let cambios =
            ActualizarAsamblea { titulo: Some("Nuevo título".into()), ..Default::default() };
        let result = svc.actualizar(&id, &Uuid::new_v4(), cambios).await;
        assert!(matches!(result, Err(DomainError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn cancelar_requires_programada() {
        let mut asamblea = programada(Utc::now() + Duration::days(1));
        asamblea.estado = AsambleaEstado::EnCurso;
        let id = asamblea.id;

        let mut repo = MockAsambleaRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(asamblea.clone())));

        let svc = servicio(repo, MockUsuarioRepository::new());
        let cambios =
            ActualizarAsamblea { estado: Some(AsambleaEstado::Cancelada), ..Default::default() };
        let result = svc.actualizar(&id, &Uuid::new_v4(), cambios).await;
        assert!(matches!(result, Err(DomainError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn eliminar_only_while_programada() {
        let mut asamblea = programada(Utc::now() + Duration::days(1));
        asamblea.estado = AsambleaEstado::Finalizada;
        let id = asamblea.id;

        let mut repo = MockAsambleaRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(asamblea.clone())));

        let svc = servicio(repo, MockUsuarioRepository::new());
        let result = svc.eliminar(&id).await;
        assert!(matches!(result, Err(DomainError::BusinessRule(_))));
    }
}
