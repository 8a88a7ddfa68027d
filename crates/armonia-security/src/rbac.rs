// ============================================================================
// Armonia Security - Role-Based Access Control
// File: crates/armonia-security/src/rbac.rs
// ============================================================================
//! Role hierarchy, tenant scoping and per-role capability sets.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User roles, ranked. `SUPER_ADMIN` is the only tenant-unscoped role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rol {
    SuperAdmin,
    AdminConjunto,
    Propietario,
    Residente,
    Recepcion,
    Vigilancia,
    Mantenimiento,
}

impl Rol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rol::SuperAdmin => "SUPER_ADMIN",
            Rol::AdminConjunto => "ADMIN_CONJUNTO",
            Rol::Propietario => "PROPIETARIO",
            Rol::Residente => "RESIDENTE",
            Rol::Recepcion => "RECEPCION",
            Rol::Vigilancia => "VIGILANCIA",
            Rol::Mantenimiento => "MANTENIMIENTO",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SUPER_ADMIN" => Some(Rol::SuperAdmin),
            "ADMIN_CONJUNTO" => Some(Rol::AdminConjunto),
            "PROPIETARIO" => Some(Rol::Propietario),
            "RESIDENTE" => Some(Rol::Residente),
            "RECEPCION" => Some(Rol::Recepcion),
            "VIGILANCIA" => Some(Rol::Vigilancia),
            "MANTENIMIENTO" => Some(Rol::Mantenimiento),
            _ => None,
        }
    }

    /// Rank in the hierarchy. A role satisfies any requirement at or below
    /// its own level.
    pub fn level(&self) -> u8 {
        match self {
            Rol::SuperAdmin => 100,
            Rol::AdminConjunto => 80,
            Rol::Propietario => 60,
            Rol::Residente => 40,
            Rol::Recepcion => 30,
            Rol::Vigilancia => 20,
            Rol::Mantenimiento => 10,
        }
    }

    pub fn has_permission(&self, required: Rol) -> bool {
        self.level() >= required.level()
    }

    /// Tenant scoping: super admins reach any conjunto, everyone else only
    /// their own. An explicit equality check, not a hierarchy inference.
    pub fn can_access_conjunto(&self, own_conjunto: Option<&Uuid>, conjunto_id: &Uuid) -> bool {
        if *self == Rol::SuperAdmin {
            return true;
        }
        own_conjunto == Some(conjunto_id)
    }
}

/// Action half of a capability. `All` is the `*` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    All,
    Named(&'static str),
}

/// A (resource, action) pair a role is allowed to exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub resource: &'static str,
    pub action: Action,
}

const fn all(resource: &'static str) -> Capability {
    Capability { resource, action: Action::All }
}

const fn named(resource: &'static str, action: &'static str) -> Capability {
    Capability { resource, action: Action::Named(action) }
}

const SUPER_ADMIN_CAPS: &[Capability] =
    &[all("conjuntos"), all("usuarios"), all("sistema"), all("reportes")];

const ADMIN_CONJUNTO_CAPS: &[Capability] = &[
    all("propiedades"),
    all("residentes"),
    all("asambleas"),
    all("finanzas"),
    all("pqr"),
    all("servicios"),
    named("reportes", "conjunto"),
];

const PROPIETARIO_CAPS: &[Capability] = &[
    named("propiedades", "read"),
    named("propiedades", "update:own"),
    named("finanzas", "read:own"),
    named("asambleas", "participate"),
    named("servicios", "reserve"),
    named("pqr", "create"),
    named("pqr", "read:own"),
];

const RESIDENTE_CAPS: &[Capability] = &[
    named("propiedades", "read:own"),
    named("servicios", "reserve"),
    named("pqr", "create"),
    named("pqr", "read:own"),
    named("asambleas", "view"),
];

const RECEPCION_CAPS: &[Capability] = &[
    all("visitantes"),
    all("correspondencia"),
    named("pqr", "read"),
    named("pqr", "update:assigned"),
];

const VIGILANCIA_CAPS: &[Capability] =
    &[all("visitantes"), all("incidentes"), all("minutas"), named("pqr", "read")];

const MANTENIMIENTO_CAPS: &[Capability] = &[
    named("pqr", "read:maintenance"),
    named("pqr", "update:maintenance"),
    named("servicios", "read"),
];

pub fn role_capabilities(rol: Rol) -> &'static [Capability] {
    match rol {
        Rol::SuperAdmin => SUPER_ADMIN_CAPS,
        Rol::AdminConjunto => ADMIN_CONJUNTO_CAPS,
        Rol::Propietario => PROPIETARIO_CAPS,
        Rol::Residente => RESIDENTE_CAPS,
        Rol::Recepcion => RECEPCION_CAPS,
        Rol::Vigilancia => VIGILANCIA_CAPS,
        Rol::Mantenimiento => MANTENIMIENTO_CAPS,
    }
}

/// Membership check: exact (resource, action) first, then the resource's
/// wildcard form.
pub fn has_capability(rol: Rol, resource: &str, action: &str) -> bool {
    let caps = role_capabilities(rol);
    if caps
        .iter()
        .any(|c| c.resource == resource && matches!(c.action, Action::Named(a) if a == action))
    {
        return true;
    }
    caps.iter().any(|c| c.resource == resource && c.action == Action::All)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Rol; 7] = [
        Rol::SuperAdmin,
        Rol::AdminConjunto,
        Rol::Propietario,
        Rol::Residente,
        Rol::Recepcion,
        Rol::Vigilancia,
        Rol::Mantenimiento,
    ];

    #[test]
    fn has_permission_is_reflexive() {
        for rol in ALL_ROLES {
            assert!(rol.has_permission(rol));
        }
    }

    #[test]
    fn has_permission_is_monotonic() {
        for user in ALL_ROLES {
            for required in ALL_ROLES {
                if user.level() >= required.level() {
                    assert!(user.has_permission(required));
                } else {
                    assert!(!user.has_permission(required));
                }
            }
        }
    }

    #[test]
    fn super_admin_reaches_any_conjunto() {
        let conjunto = Uuid::new_v4();
        assert!(Rol::SuperAdmin.can_access_conjunto(None, &conjunto));
    }

    #[test]
    fn other_roles_only_reach_their_own_conjunto() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(Rol::Residente.can_access_conjunto(Some(&own), &own));
        assert!(!Rol::Residente.can_access_conjunto(Some(&own), &other));
        assert!(!Rol::AdminConjunto.can_access_conjunto(None, &other));
    }

    #[test]
    fn wildcard_matches_any_action() {
        assert!(has_capability(Rol::AdminConjunto, "pqr", "create"));
        assert!(has_capability(Rol::AdminConjunto, "pqr", "delete"));
    }

    #[test]
    fn exact_match_without_wildcard() {
        assert!(has_capability(Rol::Residente, "pqr", "create"));
        assert!(!has_capability(Rol::Residente, "pqr", "delete"));
        assert!(!has_capability(Rol::Mantenimiento, "asambleas", "view"));
    }

    #[test]
    fn role_round_trip() {
        for rol in ALL_ROLES {
            assert_eq!(Rol::from_str(rol.as_str()), Some(rol));
        }
        assert_eq!(Rol::from_str("INVITADO"), None);
    }
}
