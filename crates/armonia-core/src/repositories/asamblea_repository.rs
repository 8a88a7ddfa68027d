//! Asamblea repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use armonia_shared::types::Pagination;

use crate::domain::{Asamblea, AsambleaEstado, TipoAsamblea};
use crate::error::DomainError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AsambleaFilter {
    pub estado: Option<AsambleaEstado>,
    pub tipo: Option<TipoAsamblea>,
    /// Case-insensitive search over titulo and descripcion.
    pub search: Option<String>,
    pub fecha_desde: Option<DateTime<Utc>>,
    pub fecha_hasta: Option<DateTime<Utc>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AsambleaRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Asamblea>, DomainError>;

    /// Filtered page sorted by scheduled date, newest first, plus the total
    /// match count.
    async fn list(
        &self,
        filter: &AsambleaFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Asamblea>, u64), DomainError>;

    async fn list_all(&self) -> Result<Vec<Asamblea>, DomainError>;

    async fn create(&self, asamblea: &Asamblea) -> Result<Asamblea, DomainError>;

    async fn update(&self, asamblea: &Asamblea) -> Result<Asamblea, DomainError>;

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
