//! Conjunto repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Conjunto;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConjuntoRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Conjunto>, DomainError>;
    async fn find_by_tenant_id(&self, tenant_id: &str) -> Result<Option<Conjunto>, DomainError>;
    /// Most recently created conjunto; source of the next tenant code.
    async fn find_latest(&self) -> Result<Option<Conjunto>, DomainError>;
    async fn create(&self, conjunto: &Conjunto) -> Result<Conjunto, DomainError>;
    async fn update(&self, conjunto: &Conjunto) -> Result<Conjunto, DomainError>;
}
