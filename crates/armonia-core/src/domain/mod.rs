//! # Armonia Core - Domain Module
//!
//! Domain entities for the Armonía application.

pub mod asamblea;
pub mod conjunto;
pub mod pqr;
pub mod usuario;

// Re-export all entities and enums
pub use asamblea::{
    ActualizarAsamblea, Asamblea, AsambleaEstado, Asistentes, AsistentesUpdate, NuevaAsamblea,
    PuntoOrdenDelDia, TipoAsamblea,
};
pub use conjunto::{Conjunto, PlanTipo};
pub use pqr::{
    ActualizarPqr, NuevoPqr, Pqr, PqrCategoria, PqrEstado, PqrPrioridad, PqrTipo,
};
pub use usuario::Usuario;
