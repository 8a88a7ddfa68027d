//! PQR repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use armonia_shared::types::Pagination;

use crate::domain::{Pqr, PqrCategoria, PqrEstado, PqrPrioridad, PqrTipo};
use crate::error::DomainError;

/// Filter axes for ticket listings. Every field is optional and they
/// compose with AND semantics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PqrFilter {
    pub estado: Option<PqrEstado>,
    pub categoria: Option<PqrCategoria>,
    pub tipo: Option<PqrTipo>,
    pub prioridad: Option<PqrPrioridad>,
    pub solicitante_id: Option<Uuid>,
    pub responsable_id: Option<String>,
    /// Case-insensitive search over asunto, descripcion and numero.
    pub search: Option<String>,
    pub fecha_desde: Option<DateTime<Utc>>,
    pub fecha_hasta: Option<DateTime<Utc>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PqrRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Pqr>, DomainError>;

    /// Filtered page sorted newest-first plus the total match count.
    async fn list(
        &self,
        filter: &PqrFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Pqr>, u64), DomainError>;

    /// Full ticket set for aggregate computations.
    async fn list_all(&self) -> Result<Vec<Pqr>, DomainError>;

    async fn count_all(&self) -> Result<u64, DomainError>;

    async fn create(&self, pqr: &Pqr) -> Result<Pqr, DomainError>;

    async fn update(&self, pqr: &Pqr) -> Result<Pqr, DomainError>;

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
