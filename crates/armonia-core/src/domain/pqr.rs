// ============================================================================
// Armonia Core - PQR Entity
// File: crates/armonia-core/src/domain/pqr.rs
// Description: Ticket entity (petición/queja/reclamo) with automatic triage
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PqrTipo {
    Peticion,
    Queja,
    Reclamo,
    Sugerencia,
}

impl PqrTipo {
    pub fn as_str(&self) -> &'static str {
        match self {
            PqrTipo::Peticion => "PETICION",
            PqrTipo::Queja => "QUEJA",
            PqrTipo::Reclamo => "RECLAMO",
            PqrTipo::Sugerencia => "SUGERENCIA",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PETICION" => Some(PqrTipo::Peticion),
            "QUEJA" => Some(PqrTipo::Queja),
            "RECLAMO" => Some(PqrTipo::Reclamo),
            "SUGERENCIA" => Some(PqrTipo::Sugerencia),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PqrCategoria {
    Mantenimiento,
    Seguridad,
    Ruido,
    Aseo,
    Administracion,
    AreasComunes,
    ServiciosPublicos,
    Vecinos,
    Otro,
}

impl PqrCategoria {
    pub fn as_str(&self) -> &'static str {
        match self {
            PqrCategoria::Mantenimiento => "MANTENIMIENTO",
            PqrCategoria::Seguridad => "SEGURIDAD",
            PqrCategoria::Ruido => "RUIDO",
            PqrCategoria::Aseo => "ASEO",
            PqrCategoria::Administracion => "ADMINISTRACION",
            PqrCategoria::AreasComunes => "AREAS_COMUNES",
            PqrCategoria::ServiciosPublicos => "SERVICIOS_PUBLICOS",
            PqrCategoria::Vecinos => "VECINOS",
            PqrCategoria::Otro => "OTRO",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "MANTENIMIENTO" => Some(PqrCategoria::Mantenimiento),
            "SEGURIDAD" => Some(PqrCategoria::Seguridad),
            "RUIDO" => Some(PqrCategoria::Ruido),
            "ASEO" => Some(PqrCategoria::Aseo),
            "ADMINISTRACION" => Some(PqrCategoria::Administracion),
            "AREAS_COMUNES" => Some(PqrCategoria::AreasComunes),
            "SERVICIOS_PUBLICOS" => Some(PqrCategoria::ServiciosPublicos),
            "VECINOS" => Some(PqrCategoria::Vecinos),
            "OTRO" => Some(PqrCategoria::Otro),
            _ => None,
        }
    }

    pub const ALL: [PqrCategoria; 9] = [
        PqrCategoria::Mantenimiento,
        PqrCategoria::Seguridad,
        PqrCategoria::Ruido,
        PqrCategoria::Aseo,
        PqrCategoria::Administracion,
        PqrCategoria::AreasComunes,
        PqrCategoria::ServiciosPublicos,
        PqrCategoria::Vecinos,
        PqrCategoria::Otro,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PqrEstado {
    Recibido,
    EnProceso,
    Resuelto,
    Cerrado,
}

impl PqrEstado {
    pub fn as_str(&self) -> &'static str {
        match self {
            PqrEstado::Recibido => "RECIBIDO",
            PqrEstado::EnProceso => "EN_PROCESO",
            PqrEstado::Resuelto => "RESUELTO",
            PqrEstado::Cerrado => "CERRADO",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "RECIBIDO" => Some(PqrEstado::Recibido),
            "EN_PROCESO" => Some(PqrEstado::EnProceso),
            "RESUELTO" => Some(PqrEstado::Resuelto),
            "CERRADO" => Some(PqrEstado::Cerrado),
            _ => None,
        }
    }

    pub const ALL: [PqrEstado; 4] = [
        PqrEstado::Recibido,
        PqrEstado::EnProceso,
        PqrEstado::Resuelto,
        PqrEstado::Cerrado,
    ];

    /// Position in the linear lifecycle.
    pub fn orden(&self) -> u8 {
        match self {
            PqrEstado::Recibido => 0,
            PqrEstado::EnProceso => 1,
            PqrEstado::Resuelto => 2,
            PqrEstado::Cerrado => 3,
        }
    }

    /// Strict linear mode: stay in place or advance exactly one stage.
    pub fn transicion_valida(&self, destino: PqrEstado) -> bool {
        destino.orden() == self.orden() || destino.orden() == self.orden() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PqrPrioridad {
    Baja,
    Media,
    Alta,
    Urgente,
}

impl PqrPrioridad {
    pub fn as_str(&self) -> &'static str {
        match self {
            PqrPrioridad::Baja => "BAJA",
            PqrPrioridad::Media => "MEDIA",
            PqrPrioridad::Alta => "ALTA",
            PqrPrioridad::Urgente => "URGENTE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BAJA" => Some(PqrPrioridad::Baja),
            "MEDIA" => Some(PqrPrioridad::Media),
            "ALTA" => Some(PqrPrioridad::Alta),
            "URGENTE" => Some(PqrPrioridad::Urgente),
            _ => None,
        }
    }

    pub const ALL: [PqrPrioridad; 4] = [
        PqrPrioridad::Baja,
        PqrPrioridad::Media,
        PqrPrioridad::Alta,
        PqrPrioridad::Urgente,
    ];
}

/// PQR ticket.
///
/// `fecha_respuesta` is stamped once on the first transition to RESUELTO
/// carrying a non-empty respuesta; `fecha_cierre` once on reaching CERRADO.
/// A ticket is deletable only while RECIBIDO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pqr {
    pub id: Uuid,
    pub numero: String,
    pub tipo: PqrTipo,
    pub categoria: PqrCategoria,
    pub asunto: String,
    pub descripcion: String,
    pub estado: PqrEstado,
    pub prioridad: PqrPrioridad,
    pub anonimo: bool,
    pub solicitante_id: Uuid,
    /// Responsible-party slot ("admin-maintenance") or an explicit user ref.
    pub responsable_id: Option<String>,
    pub propiedad_id: Option<String>,
    pub adjuntos: Vec<String>,
    pub respuesta: Option<String>,
    pub observaciones: Option<String>,
    pub calificacion: Option<i32>,
    pub comentario_calificacion: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_respuesta: Option<DateTime<Utc>>,
    pub fecha_cierre: Option<DateTime<Utc>>,
}

/// Creation payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NuevoPqr {
    pub tipo: PqrTipo,
    pub categoria: PqrCategoria,

    #[validate(length(min = 5, max = 200, message = "El asunto debe tener entre 5 y 200 caracteres"))]
    pub asunto: String,

    #[validate(length(min = 10, message = "La descripción debe tener al menos 10 caracteres"))]
    pub descripcion: String,

    #[serde(default)]
    pub anonimo: bool,

    pub adjuntos: Option<Vec<String>>,
    pub propiedad_id: Option<String>,
}

/// Partial update payload.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ActualizarPqr {
    pub estado: Option<PqrEstado>,
    pub prioridad: Option<PqrPrioridad>,
    pub responsable_id: Option<String>,
    pub observaciones: Option<String>,
    pub respuesta: Option<String>,

    #[validate(range(min = 1, max = 5, message = "La calificación debe estar entre 1 y 5"))]
    pub calificacion: Option<i32>,

    pub comentario_calificacion: Option<String>,
}

/// Priority rule table, first match wins.
pub fn prioridad_automatica(tipo: PqrTipo, categoria: PqrCategoria) -> PqrPrioridad {
    if tipo == PqrTipo::Reclamo && categoria == PqrCategoria::Mantenimiento {
        return PqrPrioridad::Urgente;
    }
    if matches!(categoria, PqrCategoria::Seguridad | PqrCategoria::ServiciosPublicos) {
        return PqrPrioridad::Alta;
    }
    if tipo == PqrTipo::Queja {
        return PqrPrioridad::Media;
    }
    PqrPrioridad::Baja
}

/// Default responsible-party slot per category. RUIDO, VECINOS and OTRO have
/// no default assignee.
pub fn responsable_automatico(categoria: PqrCategoria) -> Option<&'static str> {
    match categoria {
        PqrCategoria::Mantenimiento => Some("admin-maintenance"),
        PqrCategoria::Seguridad => Some("admin-security"),
        PqrCategoria::Aseo => Some("admin-cleaning"),
        PqrCategoria::Administracion => Some("admin-general"),
        PqrCategoria::AreasComunes => Some("admin-maintenance"),
        PqrCategoria::ServiciosPublicos => Some("admin-services"),
        PqrCategoria::Ruido | PqrCategoria::Vecinos | PqrCategoria::Otro => None,
    }
}

/// Human-readable ticket number: `PQR-{year}-{seq}` zero-padded to 3 digits.
pub fn formato_numero(year: i32, secuencia: u64) -> String {
    format!("PQR-{}-{:03}", year, secuencia)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reclamo_mantenimiento_is_urgente() {
        assert_eq!(
            prioridad_automatica(PqrTipo::Reclamo, PqrCategoria::Mantenimiento),
            PqrPrioridad::Urgente
        );
    }

    #[test]
    fn seguridad_and_servicios_publicos_are_alta() {
        for tipo in [PqrTipo::Peticion, PqrTipo::Queja, PqrTipo::Sugerencia] {
            assert_eq!(prioridad_automatica(tipo, PqrCategoria::Seguridad), PqrPrioridad::Alta);
            assert_eq!(
                prioridad_automatica(tipo, PqrCategoria::ServiciosPublicos),
                PqrPrioridad::Alta
            );
        }
    }

    #[test]
    fn queja_defaults_to_media() {
        assert_eq!(prioridad_automatica(PqrTipo::Queja, PqrCategoria::Ruido), PqrPrioridad::Media);
        assert_eq!(prioridad_automatica(PqrTipo::Queja, PqrCategoria::Otro), PqrPrioridad::Media);
    }

    #[test]
    fn everything_else_is_baja() {
        assert_eq!(
            prioridad_automatica(PqrTipo::Peticion, PqrCategoria::AreasComunes),
            PqrPrioridad::Baja
        );
        assert_eq!(
            prioridad_automatica(PqrTipo::Sugerencia, PqrCategoria::Vecinos),
            PqrPrioridad::Baja
        );
    }

    #[test]
    fn responsable_table() {
        assert_eq!(
            responsable_automatico(PqrCategoria::Mantenimiento),
            Some("admin-maintenance")
        );
        assert_eq!(
            responsable_automatico(PqrCategoria::AreasComunes),
            Some("admin-maintenance")
        );
        assert_eq!(responsable_automatico(PqrCategoria::Ruido), None);
        assert_eq!(responsable_automatico(PqrCategoria::Vecinos), None);
        assert_eq!(responsable_automatico(PqrCategoria::Otro), None);
    }

    #[test]
    fn numero_is_zero_padded() {
        assert_eq!(formato_numero(2024, 7), "PQR-2024-007");
        assert_eq!(formato_numero(2024, 1234), "PQR-2024-1234");
    }

    #[test]
    fn strict_transitions_move_forward_one_stage() {
        assert!(PqrEstado::Recibido.transicion_valida(PqrEstado::EnProceso));
        assert!(PqrEstado::EnProceso.transicion_valida(PqrEstado::EnProceso));
        assert!(!PqrEstado::Recibido.transicion_valida(PqrEstado::Cerrado));
        assert!(!PqrEstado::Resuelto.transicion_valida(PqrEstado::Recibido));
    }
}
