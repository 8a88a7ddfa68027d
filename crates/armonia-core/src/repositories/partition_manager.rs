//! Partition lifecycle port

use async_trait::async_trait;

use crate::error::DomainError;

/// Administrative operations on a tenant's logical partition. Implemented by
/// the infrastructure layer's tenant router; kept as a port so onboarding
/// stays testable without a database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PartitionManager: Send + Sync {
    /// Create the partition if it does not exist and run the tenant
    /// migration set against it.
    async fn provision(&self, tenant_id: &str) -> Result<(), DomainError>;

    /// Close the cached handle and drop the partition. Irreversible.
    async fn drop_partition(&self, tenant_id: &str) -> Result<(), DomainError>;
}
