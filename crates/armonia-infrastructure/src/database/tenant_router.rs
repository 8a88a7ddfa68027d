// ============================================================================
// Armonia Infrastructure - Tenant Router
// File: crates/armonia-infrastructure/src/database/tenant_router.rs
// ============================================================================
//! Schema-per-tenant routing: one cached `PgPool` per tenant partition with
//! an explicit open/provision/drop/close lifecycle.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use armonia_core::domain::conjunto::{is_valid_tenant_id, schema_name};
use armonia_core::error::DomainError;
use armonia_core::repositories::PartitionManager;
use armonia_shared::constants::TENANT_SCHEMA_PREFIX;

use super::connection;
use super::TENANT_MIGRATOR;

/// Registry owning every per-tenant pool. The tenant id is validated before
/// any partition access; malformed ids never reach the database.
pub struct TenantRouter {
    base_pool: PgPool,
    database_url: String,
    tenant_max_connections: u32,
    pools: RwLock<HashMap<String, PgPool>>,
}

impl TenantRouter {
    pub fn new(base_pool: PgPool, database_url: String, tenant_max_connections: u32) -> Self {
        Self {
            base_pool,
            database_url,
            tenant_max_connections,
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// Pool for the shared (public) schema.
    pub fn base_pool(&self) -> &PgPool {
        &self.base_pool
    }

    /// Partition-scoped pool for a tenant, created and cached on first use.
    /// Repeated lookups return the identical cached pool.
    pub async fn pool(&self, tenant_id: &str) -> Result<PgPool, DomainError> {
        if !is_valid_tenant_id(tenant_id) {
            return Err(DomainError::InvalidTenantId(tenant_id.to_string()));
        }
        let schema = schema_name(tenant_id);

        if let Some(pool) = self.pools.read().await.get(&schema) {
            return Ok(pool.clone());
        }

        let pool = connection::create_schema_pool(
            &self.database_url,
            &schema,
            self.tenant_max_connections,
        )
        .await
        .map_err(|e| {
            error!("Failed to open pool for {}: {}", schema, e);
            DomainError::DatabaseError(e.to_string())
        })?;

        // Two concurrent first lookups may both construct a pool; keep the
        // one already registered and close the straggler.
        let mut pools = self.pools.write().await;
        if let Some(existing) = pools.get(&schema) {
            let existing = existing.clone();
            drop(pools);
            pool.close().await;
            return Ok(existing);
        }
        pools.insert(schema.clone(), pool.clone());
        info!("Opened tenant pool for {}", schema);
        Ok(pool)
    }

    pub async fn schema_exists(&self, tenant_id: &str) -> Result<bool, DomainError> {
        if !is_valid_tenant_id(tenant_id) {
            return Err(DomainError::InvalidTenantId(tenant_id.to_string()));
        }
        let schema = schema_name(tenant_id);
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT schema_name
                FROM information_schema.schemata
                WHERE schema_name = $1
            )
            "#,
        )
        .bind(&schema)
        .fetch_one(&self.base_pool)
        .await
        .map_err(|e| {
            error!("Failed to check schema {}: {}", schema, e);
            DomainError::DatabaseError(e.to_string())
        })?;
        Ok(exists.0)
    }

    /// Tenant ids of every provisioned partition, sorted.
    pub async fn list_tenants(&self) -> Result<Vec<String>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT schema_name
            FROM information_schema.schemata
            WHERE schema_name LIKE $1
            ORDER BY schema_name
            "#,
        )
        .bind(format!("{}%", TENANT_SCHEMA_PREFIX))
        .fetch_all(&self.base_pool)
        .await
        .map_err(|e| {
            error!("Failed to list tenant schemas: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        Ok(rows
            .into_iter()
            .filter_map(|(name,)| name.strip_prefix(TENANT_SCHEMA_PREFIX).map(String::from))
            .collect())
    }

    /// Close every cached pool. Invoked on shutdown signals.
    pub async fn close_all(&self) {
        let mut pools = self.pools.write().await;
        for (schema, pool) in pools.drain() {
            pool.close().await;
            info!("Closed tenant pool for {}", schema);
        }
    }

    async fn evict(&self, schema: &str) {
        let removed = self.pools.write().await.remove(schema);
        if let Some(pool) = removed {
            pool.close().await;
            info!("Closed tenant pool for {}", schema);
        }
    }
}

#[async_trait]
impl PartitionManager for TenantRouter {
    /// Create the partition if missing and bring it to the same migration
    /// level as the default partition.
    async fn provision(&self, tenant_id: &str) -> Result<(), DomainError> {
        if !is_valid_tenant_id(tenant_id) {
            return Err(DomainError::InvalidTenantId(tenant_id.to_string()));
        }
        let schema = schema_name(tenant_id);

        sqlx::query(&format!(r#"CREATE SCHEMA IF NOT EXISTS "{}""#, schema))
            .execute(&self.base_pool)
            .await
            .map_err(|e| {
                error!("Failed to create schema {}: {}", schema, e);
                DomainError::DatabaseError(e.to_string())
            })?;

        let pool = self.pool(tenant_id).await?;
        TENANT_MIGRATOR.run(&pool).await.map_err(|e| {
            error!("Failed to migrate schema {}: {}", schema, e);
            DomainError::DatabaseError(e.to_string())
        })?;

        info!("Partition {} provisioned", schema);
        Ok(())
    }

    /// Close and evict the cached pool, then drop the partition with
    /// everything in it.
    async fn drop_partition(&self, tenant_id: &str) -> Result<(), DomainError> {
        if !is_valid_tenant_id(tenant_id) {
            return Err(DomainError::InvalidTenantId(tenant_id.to_string()));
        }
        let schema = schema_name(tenant_id);

        self.evict(&schema).await;

        warn!("Dropping partition {}", schema);
        sqlx::query(&format!(r#"DROP SCHEMA IF EXISTS "{}" CASCADE"#, schema))
            .execute(&self.base_pool)
            .await
            .map_err(|e| {
                error!("Failed to drop schema {}: {}", schema, e);
                DomainError::DatabaseError(e.to_string())
            })?;
        Ok(())
    }
}
