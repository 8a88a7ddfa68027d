//! Shared application state

use std::sync::Arc;

use armonia_core::repositories::PartitionManager;
use armonia_core::services::{
    AsambleaService, AuthService, ConjuntoService, MailSender, PqrService,
};
use armonia_infrastructure::database::postgres::{
    PgAsambleaRepository, PgConjuntoRepository, PgPqrRepository, PgUsuarioRepository,
};
use armonia_infrastructure::TenantRouter;
use armonia_security::JwtService;
use armonia_shared::config::AppConfig;

use crate::error::ApiResult;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub jwt: Arc<JwtService>,
    pub tenants: Arc<TenantRouter>,
    pub mailer: Arc<dyn MailSender>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        jwt: Arc<JwtService>,
        tenants: Arc<TenantRouter>,
        mailer: Arc<dyn MailSender>,
    ) -> Self {
        Self { config, jwt, tenants, mailer }
    }

    /// Repositories are cheap pool handles, so services are assembled per
    /// request instead of being cached on the state.
    pub fn auth_service(&self) -> AuthService<PgUsuarioRepository, PgConjuntoRepository> {
        let base = self.tenants.base_pool().clone();
        AuthService::new(
            Arc::new(PgUsuarioRepository::new(base.clone())),
            Arc::new(PgConjuntoRepository::new(base)),
            self.jwt.clone(),
            self.mailer.clone(),
        )
    }

    pub fn conjunto_service(&self) -> ConjuntoService<PgConjuntoRepository> {
        let base = self.tenants.base_pool().clone();
        ConjuntoService::new(
            Arc::new(PgConjuntoRepository::new(base)),
            self.tenants.clone() as Arc<dyn PartitionManager>,
        )
    }

    pub fn conjunto_repo(&self) -> PgConjuntoRepository {
        PgConjuntoRepository::new(self.tenants.base_pool().clone())
    }

    /// Ticket service bound to one tenant's partition.
    pub async fn pqr_service(&self, tenant_id: &str) -> ApiResult<PqrService<PgPqrRepository>> {
        let pool = self.tenants.pool(tenant_id).await?;
        Ok(PqrService::new(
            Arc::new(PgPqrRepository::new(pool)),
            self.config.pqr.transiciones_estrictas,
        ))
    }

    /// Assembly service bound to one tenant's partition; the owner count
    /// for quorum comes from the shared user table.
    pub async fn asamblea_service(
        &self,
        tenant_id: &str,
    ) -> ApiResult<AsambleaService<PgAsambleaRepository, PgUsuarioRepository>> {
        let pool = self.tenants.pool(tenant_id).await?;
        Ok(AsambleaService::new(
            Arc::new(PgAsambleaRepository::new(pool)),
            Arc::new(PgUsuarioRepository::new(self.tenants.base_pool().clone())),
        ))
    }
}
