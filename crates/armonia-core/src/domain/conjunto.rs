// ============================================================================
// Armonia Core - Conjunto Entity
// File: crates/armonia-core/src/domain/conjunto.rs
// Description: Tenant entity (one residential complex per logical partition)
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use armonia_shared::constants::TENANT_SCHEMA_PREFIX;

use crate::error::DomainError;

/// Subscription plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanTipo {
    Basico,
    Estandar,
    Premium,
}

impl PlanTipo {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTipo::Basico => "BASICO",
            PlanTipo::Estandar => "ESTANDAR",
            PlanTipo::Premium => "PREMIUM",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BASICO" => Some(PlanTipo::Basico),
            "ESTANDAR" => Some(PlanTipo::Estandar),
            "PREMIUM" => Some(PlanTipo::Premium),
            _ => None,
        }
    }
}

impl Default for PlanTipo {
    fn default() -> Self {
        PlanTipo::Basico
    }
}

/// Conjunto residencial: one tenant, one logical partition. Created once at
/// onboarding; only `activo` is ever toggled afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Conjunto {
    pub id: Uuid,

    /// Short tenant code, two lowercase letters + four digits (`cj0001`).
    pub tenant_id: String,

    #[validate(length(min = 3, max = 100, message = "El nombre debe tener entre 3 y 100 caracteres"))]
    pub nombre: String,

    #[validate(length(max = 200, message = "La dirección es demasiado larga"))]
    pub direccion: Option<String>,

    pub plan: PlanTipo,
    pub activo: bool,
    pub fecha_creacion: DateTime<Utc>,
}

impl Conjunto {
    pub fn new(
        tenant_id: String,
        nombre: String,
        direccion: Option<String>,
        plan: PlanTipo,
    ) -> Result<Self, DomainError> {
        if !is_valid_tenant_id(&tenant_id) {
            return Err(DomainError::InvalidTenantId(tenant_id));
        }
        let conjunto = Self {
            id: Uuid::new_v4(),
            tenant_id,
            nombre: nombre.trim().to_string(),
            direccion: direccion.map(|d| d.trim().to_string()),
            plan,
            activo: true,
            fecha_creacion: Utc::now(),
        };
        conjunto.validate()?;
        Ok(conjunto)
    }

    pub fn schema_name(&self) -> String {
        schema_name(&self.tenant_id)
    }
}

/// Tenant code pattern: exactly two lowercase ASCII letters followed by
/// exactly four digits.
pub fn is_valid_tenant_id(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() == 6
        && bytes[..2].iter().all(|b| b.is_ascii_lowercase())
        && bytes[2..].iter().all(|b| b.is_ascii_digit())
}

/// Logical partition name for a tenant code.
pub fn schema_name(tenant_id: &str) -> String {
    format!("{}{}", TENANT_SCHEMA_PREFIX, tenant_id)
}

/// Next tenant code: numeric suffix of the most recently created tenant + 1.
/// The very first tenant is `cj0001`.
pub fn next_tenant_id(latest: Option<&str>) -> Result<String, DomainError> {
    let latest = match latest {
        None => return Ok("cj0001".to_string()),
        Some(t) => t,
    };
    if !is_valid_tenant_id(latest) {
        return Err(DomainError::InvalidTenantId(latest.to_string()));
    }
    let prefix = &latest[..2];
    let numero: u32 = latest[2..]
        .parse()
        .map_err(|_| DomainError::InvalidTenantId(latest.to_string()))?;
    Ok(format!("{}{:04}", prefix, numero + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_tenant_ids() {
        assert!(is_valid_tenant_id("cj0001"));
        assert!(is_valid_tenant_id("ab9999"));
    }

    #[test]
    fn invalid_tenant_ids() {
        assert!(!is_valid_tenant_id("CJ0001"));
        assert!(!is_valid_tenant_id("cj001"));
        assert!(!is_valid_tenant_id("cj00011"));
        assert!(!is_valid_tenant_id("c10001"));
        assert!(!is_valid_tenant_id("cj00a1"));
        assert!(!is_valid_tenant_id(""));
    }

    #[test]
    fn schema_name_is_prefixed() {
        assert_eq!(schema_name("cj0001"), "tenant_cj0001");
    }

    #[test]
    fn first_tenant_id() {
        assert_eq!(next_tenant_id(None).unwrap(), "cj0001");
    }

    #[test]
    fn next_tenant_id_increments_suffix() {
        assert_eq!(next_tenant_id(Some("cj0041")).unwrap(), "cj0042");
        assert_eq!(next_tenant_id(Some("cj0999")).unwrap(), "cj1000");
    }

    #[test]
    fn next_tenant_id_rejects_malformed() {
        assert!(next_tenant_id(Some("conjunto-1")).is_err());
    }
}
