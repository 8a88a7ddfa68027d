//! # Armonia Security
//!
//! JWT handling, password hashing and role-based access control.

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::{AccessClaims, AuthTokens, JwtError, JwtService, RefreshClaims, TokenSubject};
pub use password::{PasswordError, PasswordService};
pub use rbac::{Action, Capability, Rol};
