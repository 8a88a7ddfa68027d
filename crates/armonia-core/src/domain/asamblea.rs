// ============================================================================
// Armonia Core - Asamblea Entity
// File: crates/armonia-core/src/domain/asamblea.rs
// Description: Owners' assembly with agenda, attendance and quorum tracking
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Window before the scheduled start in which an assembly may be opened.
const VENTANA_INICIO_MINUTOS: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoAsamblea {
    Ordinaria,
    Extraordinaria,
    Emergencia,
}

impl TipoAsamblea {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoAsamblea::Ordinaria => "ORDINARIA",
            TipoAsamblea::Extraordinaria => "EXTRAORDINARIA",
            TipoAsamblea::Emergencia => "EMERGENCIA",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ORDINARIA" => Some(TipoAsamblea::Ordinaria),
            "EXTRAORDINARIA" => Some(TipoAsamblea::Extraordinaria),
            "EMERGENCIA" => Some(TipoAsamblea::Emergencia),
            _ => None,
        }
    }

    pub const ALL: [TipoAsamblea; 3] = [
        TipoAsamblea::Ordinaria,
        TipoAsamblea::Extraordinaria,
        TipoAsamblea::Emergencia,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AsambleaEstado {
    Programada,
    EnCurso,
    Finalizada,
    Cancelada,
}

impl AsambleaEstado {
    pub fn as_str(&self) -> &'static str {
        match self {
            AsambleaEstado::Programada => "PROGRAMADA",
            AsambleaEstado::EnCurso => "EN_CURSO",
            AsambleaEstado::Finalizada => "FINALIZADA",
            AsambleaEstado::Cancelada => "CANCELADA",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PROGRAMADA" => Some(AsambleaEstado::Programada),
            "EN_CURSO" => Some(AsambleaEstado::EnCurso),
            "FINALIZADA" => Some(AsambleaEstado::Finalizada),
            "CANCELADA" => Some(AsambleaEstado::Cancelada),
            _ => None,
        }
    }

    pub const ALL: [AsambleaEstado; 4] = [
        AsambleaEstado::Programada,
        AsambleaEstado::EnCurso,
        AsambleaEstado::Finalizada,
        AsambleaEstado::Cancelada,
    ];
}

/// One agenda item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PuntoOrdenDelDia {
    #[validate(length(min = 3, message = "El título del punto debe tener al menos 3 caracteres"))]
    pub titulo: String,

    pub descripcion: Option<String>,

    #[validate(range(min = 5, max = 120, message = "El tiempo estimado debe estar entre 5 y 120 minutos"))]
    pub tiempo_estimado: Option<i32>,

    pub responsable: Option<String>,
}

/// Attendance counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Asistentes {
    pub confirmados: i32,
    pub presentes: i32,
    pub ausentes: i32,
    pub delegaciones: i32,
}

/// Partial attendance update; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AsistentesUpdate {
    pub confirmados: Option<i32>,
    pub presentes: Option<i32>,
    pub ausentes: Option<i32>,
    pub delegaciones: Option<i32>,
}

impl Asistentes {
    pub fn merge(&self, update: AsistentesUpdate) -> Asistentes {
        Asistentes {
            confirmados: update.confirmados.unwrap_or(self.confirmados),
            presentes: update.presentes.unwrap_or(self.presentes),
            ausentes: update.ausentes.unwrap_or(self.ausentes),
            delegaciones: update.delegaciones.unwrap_or(self.delegaciones),
        }
    }
}

/// Owners' assembly.
///
/// `quorum_alcanzado` is recomputed every time the attendance counters
/// change. A FINALIZADA assembly is immutable; deletion is allowed only
/// while PROGRAMADA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asamblea {
    pub id: Uuid,
    pub titulo: String,
    pub descripcion: String,
    pub tipo: TipoAsamblea,
    pub fecha_hora: DateTime<Utc>,
    pub lugar: String,
    pub duracion_estimada: i32,
    pub quorum_minimo: i32,
    pub estado: AsambleaEstado,
    pub orden_del_dia: Vec<PuntoOrdenDelDia>,
    pub convocatoria_dias: i32,
    pub documentos_adjuntos: Vec<String>,
    pub acta_resumen: Option<String>,
    pub observaciones: Option<String>,
    pub asistentes: Asistentes,
    pub quorum_alcanzado: bool,
    pub creador_id: Uuid,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_convocatoria: Option<DateTime<Utc>>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
}

impl Asamblea {
    /// An assembly can be opened only while PROGRAMADA and at most 15
    /// minutes before its scheduled start (any time after it, too).
    pub fn puede_iniciar(&self, ahora: DateTime<Utc>) -> bool {
        self.estado == AsambleaEstado::Programada
            && self.fecha_hora - ahora <= Duration::minutes(VENTANA_INICIO_MINUTOS)
    }

    /// The call to assembly goes out once the scheduled date is within the
    /// convocatoria window and no call has been sent yet.
    pub fn debe_convocar(&self, ahora: DateTime<Utc>) -> bool {
        if self.fecha_convocatoria.is_some() {
            return false;
        }
        self.fecha_hora - ahora <= Duration::days(self.convocatoria_dias as i64)
    }

    pub fn porcentaje_asistencia(&self, total_propietarios: i64) -> i32 {
        if total_propietarios <= 0 {
            return 0;
        }
        let votos = (self.asistentes.presentes + self.asistentes.delegaciones) as f64;
        ((votos / total_propietarios as f64) * 100.0).round() as i32
    }
}

/// Quorum: (present + delegated) votes as a percentage of all owners must
/// reach `quorum_minimo`.
pub fn quorum_alcanzado(
    total_propietarios: i64,
    presentes: i32,
    delegaciones: i32,
    quorum_minimo: i32,
) -> bool {
    if total_propietarios <= 0 {
        return false;
    }
    let votos = (presentes + delegaciones) as f64;
    let porcentaje = votos / total_propietarios as f64 * 100.0;
    porcentaje >= quorum_minimo as f64
}

/// Creation payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NuevaAsamblea {
    #[validate(length(min = 5, max = 200, message = "El título debe tener entre 5 y 200 caracteres"))]
    pub titulo: String,

    #[validate(length(min = 10, message = "La descripción debe tener al menos 10 caracteres"))]
    pub descripcion: String,

    pub tipo: TipoAsamblea,

    /// Must be in the future at creation time; checked by the service.
    pub fecha_hora: DateTime<Utc>,

    #[validate(length(min = 3, message = "El lugar debe tener al menos 3 caracteres"))]
    pub lugar: String,

    #[validate(range(min = 30, max = 480, message = "La duración debe estar entre 30 y 480 minutos"))]
    pub duracion_estimada: i32,

    #[validate(range(min = 1, max = 100, message = "El quórum mínimo debe estar entre 1 y 100"))]
    pub quorum_minimo: i32,

    #[validate(length(min = 1, message = "Debe haber al menos un punto en el orden del día"), nested)]
    pub orden_del_dia: Vec<PuntoOrdenDelDia>,

    #[serde(default = "default_convocatoria_dias")]
    #[validate(range(min = 1, max = 30, message = "La convocatoria debe ser de 1 a 30 días"))]
    pub convocatoria_dias: i32,

    pub documentos_adjuntos: Option<Vec<String>>,
}

fn default_convocatoria_dias() -> i32 {
    8
}

/// Partial update payload.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ActualizarAsamblea {
    #[validate(length(min = 5, max = 200))]
    pub titulo: Option<String>,

    #[validate(length(min = 10))]
    pub descripcion: Option<String>,

    pub fecha_hora: Option<DateTime<Utc>>,

    #[validate(length(min = 3))]
    pub lugar: Option<String>,

    #[validate(range(min = 30, max = 480))]
    pub duracion_estimada: Option<i32>,

    #[validate(range(min = 1, max = 100))]
    pub quorum_minimo: Option<i32>,

    pub estado: Option<AsambleaEstado>,

    #[validate(nested)]
    pub orden_del_dia: Option<Vec<PuntoOrdenDelDia>>,

    pub acta_resumen: Option<String>,
    pub observaciones: Option<String>,
    pub asistentes: Option<AsistentesUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asamblea(estado: AsambleaEstado, fecha_hora: DateTime<Utc>) -> Asamblea {
        Asamblea {
            id: Uuid::new_v4(),
            titulo: "Asamblea Ordinaria".into(),
            descripcion: "Revisión de estados financieros".into(),
            tipo: TipoAsamblea::Ordinaria,
            fecha_hora,
            lugar: "Salón Social".into(),
            duracion_estimada: 120,
            quorum_minimo: 51,
            estado,
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

    #[test]
    fn quorum_reached_at_threshold() {
        // 43 of 85 owners is 50.6%, 44 is 51.8%
        assert!(!quorum_alcanzado(85, 40, 3, 51));
        assert!(quorum_alcanzado(85, 40, 4, 51));
    }

    #[test]
    fn quorum_with_no_owners_is_never_reached() {
        assert!(!quorum_alcanzado(0, 10, 5, 51));
    }

    #[test]
    fn start_window_is_fifteen_minutes() {
        let ahora = Utc::now();
        let a = asamblea(AsambleaEstado::Programada, ahora + Duration::minutes(10));
        assert!(a.puede_iniciar(ahora));

        let b = asamblea(AsambleaEstado::Programada, ahora + Duration::minutes(60));
        assert!(!b.puede_iniciar(ahora));

        // Past the scheduled time still allows opening.
        let c = asamblea(AsambleaEstado::Programada, ahora - Duration::minutes(5));
        assert!(c.puede_iniciar(ahora));
    }

    #[test]
    fn only_scheduled_assemblies_can_start() {
        let ahora = Utc::now();
        let a = asamblea(AsambleaEstado::Finalizada, ahora + Duration::minutes(5));
        assert!(!a.puede_iniciar(ahora));
    }

    #[test]
    fn convocatoria_fires_inside_window_once() {
        let ahora = Utc::now();
        let mut a = asamblea(AsambleaEstado::Programada, ahora + Duration::days(5));
        assert!(a.debe_convocar(ahora));

        a.fecha_convocatoria = Some(ahora);
        assert!(!a.debe_convocar(ahora));

        let b = asamblea(AsambleaEstado::Programada, ahora + Duration::days(20));
        assert!(!b.debe_convocar(ahora));
    }

    #[test]
    fn attendance_merge_keeps_missing_fields() {
        let base = Asistentes { confirmados: 45, presentes: 0, ausentes: 0, delegaciones: 3 };
        let merged = base.merge(AsistentesUpdate { presentes: Some(40), ..Default::default() });
        assert_eq!(merged.confirmados, 45);
        assert_eq!(merged.presentes, 40);
        assert_eq!(merged.delegaciones, 3);
    }
}
