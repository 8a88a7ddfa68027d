//! PostgreSQL repository implementations

pub mod asamblea_repo_impl;
pub mod conjunto_repo_impl;
pub mod pqr_repo_impl;
pub mod usuario_repo_impl;

pub use asamblea_repo_impl::PgAsambleaRepository;
pub use conjunto_repo_impl::PgConjuntoRepository;
pub use pqr_repo_impl::PgPqrRepository;
pub use usuario_repo_impl::PgUsuarioRepository;
