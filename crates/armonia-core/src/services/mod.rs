//! Domain services (business logic)

pub mod asamblea_service;
pub mod auth_service;
pub mod conjunto_service;
pub mod mailer;
pub mod pqr_service;

pub use asamblea_service::{AsambleaDetalle, AsambleaResumen, AsambleaService};
pub use auth_service::{AuthService, LoginResult, RegisterResult, RegistroUsuario, UserInfo};
pub use conjunto_service::{ConjuntoService, NuevoConjunto};
pub use mailer::{LogMailer, MailSender};
pub use pqr_service::{PeriodoMetricas, PqrMetricas, PqrResumen, PqrService};
