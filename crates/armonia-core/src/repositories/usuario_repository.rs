//! Usuario repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Usuario;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsuarioRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Usuario>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Usuario>, DomainError>;
    async fn create(&self, usuario: &Usuario) -> Result<Usuario, DomainError>;
    async fn update(&self, usuario: &Usuario) -> Result<Usuario, DomainError>;
    /// Owner-role head count for a conjunto; the quorum denominator.
    async fn count_propietarios(&self, conjunto_id: &Uuid) -> Result<i64, DomainError>;
}
