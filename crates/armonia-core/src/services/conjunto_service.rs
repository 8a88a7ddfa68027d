// ============================================================================
// Armonia Core - Conjunto Service
// File: crates/armonia-core/src/services/conjunto_service.rs
// ============================================================================
//! Tenant onboarding and decommissioning: code assignment, partition
//! provisioning, activation toggling and the irreversible partition drop.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::domain::conjunto::{next_tenant_id, Conjunto, PlanTipo};
use crate::error::DomainError;
use crate::repositories::{ConjuntoRepository, PartitionManager};

pub struct ConjuntoService<C: ConjuntoRepository> {
    repo: Arc<C>,
    partitions: Arc<dyn PartitionManager>,
}

/// Onboarding payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NuevoConjunto {
    #[validate(length(min = 3, max = 100, message = "El nombre debe tener entre 3 y 100 caracteres"))]
    pub nombre: String,

    #[validate(length(max = 200, message = "La dirección es demasiado larga"))]
    pub direccion: Option<String>,

    #[serde(default)]
    pub plan: PlanTipo,
}

impl<C: ConjuntoRepository> ConjuntoService<C> {
    pub fn new(repo: Arc<C>, partitions: Arc<dyn PartitionManager>) -> Self {
        Self { repo, partitions }
    }

    /// Next free tenant code, derived from the most recently created
    /// conjunto. The first tenant ever is `cj0001`.
    pub async fn next_tenant_id(&self) -> Result<String, DomainError> {
        let latest = self.repo.find_latest().await?;
        next_tenant_id(latest.as_ref().map(|c| c.tenant_id.as_str()))
    }

    /// Onboard a tenant: assign the code, persist the registry row, then
    /// provision its partition.
    pub async fn onboard(&self, nuevo: NuevoConjunto) -> Result<Conjunto, DomainError> {
        nuevo.validate()?;

        let tenant_id = self.next_tenant_id().await?;
        let conjunto = Conjunto::new(tenant_id, nuevo.nombre, nuevo.direccion, nuevo.plan)?;

        let creado = self.repo.create(&conjunto).await?;
        self.partitions.provision(&creado.tenant_id).await?;

        info!("Conjunto {} creado ({})", creado.nombre, creado.tenant_id);
        Ok(creado)
    }

    pub async fn set_activo(&self, tenant_id: &str, activo: bool) -> Result<Conjunto, DomainError> {
        let conjunto = self
            .repo
            .find_by_tenant_id(tenant_id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;
        let mut actualizado = conjunto;
        actualizado.activo = activo;
        self.repo.update(&actualizado).await
    }

    /// Drop a tenant's partition and deactivate its registry row. The row
    /// itself is kept; the data is gone for good.
    pub async fn drop_tenant(&self, tenant_id: &str) -> Result<(), DomainError> {
        let conjunto = self
            .repo
            .find_by_tenant_id(tenant_id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;

        warn!("Dropping partition for tenant {} ({})", conjunto.tenant_id, conjunto.nombre);
        self.partitions.drop_partition(&conjunto.tenant_id).await?;

        let mut desactivado = conjunto;
        desactivado.activo = false;
        self.repo.update(&desactivado).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::conjunto_repository::MockConjuntoRepository;
    use crate::repositories::partition_manager::MockPartitionManager;

    fn conjunto(tenant_id: &str) -> Conjunto {
        Conjunto::new(tenant_id.into(), "Conjunto Armonía".into(), None, PlanTipo::Basico).unwrap()
    }

    #[tokio::test]
    async fn first_onboarding_gets_cj0001_and_provisions() {
        let mut repo = MockConjuntoRepository::new();
        repo.expect_find_latest().returning(|| Ok(None));
        repo.expect_create().returning(|c| Ok(c.clone()));

        let mut partitions = MockPartitionManager::new();
        partitions
            .expect_provision()
            .withf(|tenant_id| tenant_id == "cj0001")
            .returning(|_| Ok(()));

        let svc = ConjuntoService::new(Arc::new(repo), Arc::new(partitions));
        let creado = svc
            .onboard(NuevoConjunto {
                nombre: "Conjunto Armonía".into(),
                direccion: None,
                plan: PlanTipo::Basico,
            })
            .await
            .unwrap();
        assert_eq!(creado.tenant_id, "cj0001");
        assert!(creado.activo);
    }

    #[tokio::test]
    async fn subsequent_onboarding_increments_the_code() {
        let mut repo = MockConjuntoRepository::new();
        repo.expect_find_latest().returning(|| Ok(Some(conjunto("cj0007"))));
        repo.expect_create().returning(|c| Ok(c.clone()));

        let mut partitions = MockPartitionManager::new();
        partitions.expect_provision().returning(|_| Ok(()));

        let svc = ConjuntoService::new(Arc::new(repo), Arc::new(partitions));
        let creado = svc
            .onboard(NuevoConjunto {
                nombre: "Torres del Parque".into(),
                direccion: Some("Calle 26".into()),
                plan: PlanTipo::Premium,
            })
            .await
            .unwrap();
        assert_eq!(creado.tenant_id, "cj0008");
    }

    #[tokio::test]
    async fn drop_tenant_drops_partition_and_deactivates() {
        let mut repo = MockConjuntoRepository::new();
        repo.expect_find_by_tenant_id().returning(|_| Ok(Some(conjunto("cj0002"))));
        repo.expect_update()
            .withf(|c| !c.activo)
            .returning(|c| Ok(c.clone()));

        let mut partitions = MockPartitionManager::new();
        partitions
            .expect_drop_partition()
            .withf(|tenant_id| tenant_id == "cj0002")
            .returning(|_| Ok(()));

        let svc = ConjuntoService::new(Arc::new(repo), Arc::new(partitions));
        assert!(svc.drop_tenant("cj0002").await.is_ok());
    }

    #[tokio::test]
    async fn drop_unknown_tenant_is_not_found() {
        let mut repo = MockConjuntoRepository::new();
        repo.expect_find_by_tenant_id().returning(|_| Ok(None));

        let svc =
            ConjuntoService::new(Arc::new(repo), Arc::new(MockPartitionManager::new()));
        let result = svc.drop_tenant("cj9999").await;
        assert!(matches!(result, Err(DomainError::TenantNotFound)));
    }
}
