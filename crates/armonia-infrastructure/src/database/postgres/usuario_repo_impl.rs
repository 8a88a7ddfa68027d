// ============================================================================
// Armonia Infrastructure - PostgreSQL Usuario Repository
// File: crates/armonia-infrastructure/src/database/postgres/usuario_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use armonia_core::domain::Usuario;
use armonia_core::error::DomainError;
use armonia_core::repositories::UsuarioRepository;
use armonia_security::Rol;

pub struct PgUsuarioRepository {
    pool: PgPool,
}

impl PgUsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, email, password_hash, nombre_completo, telefono, rol, conjunto_id, \
                       activo, email_verificado, ultimo_login, token_recuperacion, \
                       token_expiracion, fecha_creacion";

#[derive(Debug, FromRow)]
struct UsuarioRow {
    id: Uuid,
    email: String,
    password_hash: String,
    nombre_completo: String,
    telefono: Option<String>,
    rol: String,
    conjunto_id: Option<Uuid>,
    activo: bool,
    email_verificado: bool,
    ultimo_login: Option<DateTime<Utc>>,
    token_recuperacion: Option<String>,
    token_expiracion: Option<DateTime<Utc>>,
    fecha_creacion: DateTime<Utc>,
}

impl TryFrom<UsuarioRow> for Usuario {
    type Error = DomainError;

    fn try_from(row: UsuarioRow) -> Result<Self, Self::Error> {
        let rol = Rol::from_str(&row.rol).ok_or_else(|| {
            error!("Unknown role in usuarios row {}: {}", row.id, row.rol);
            DomainError::InternalError(format!("Rol desconocido: {}", row.rol))
        })?;
        Ok(Usuario {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            nombre_completo: row.nombre_completo,
            telefono: row.telefono,
            rol,
            conjunto_id: row.conjunto_id,
            activo: row.activo,
            email_verificado: row.email_verificado,
            ultimo_login: row.ultimo_login,
            token_recuperacion: row.token_recuperacion,
            token_expiracion: row.token_expiracion,
            fecha_creacion: row.fecha_creacion,
        })
    }
}

#[async_trait]
impl UsuarioRepository for PgUsuarioRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Usuario>, DomainError> {
        let row: Option<UsuarioRow> = sqlx::query_as(&format!(
            "SELECT {} FROM usuarios WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding usuario by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        row.map(Usuario::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Usuario>, DomainError> {
        let row: Option<UsuarioRow> = sqlx::query_as(&format!(
            "SELECT {} FROM usuarios WHERE LOWER(email) = LOWER($1)",
            COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding usuario by email: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        row.map(Usuario::try_from).transpose()
    }

    async fn create(&self, usuario: &Usuario) -> Result<Usuario, DomainError> {
        info!("Creating usuario {}", usuario.id);

        let row: UsuarioRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO usuarios (
                id, email, password_hash, nombre_completo, telefono, rol, conjunto_id,
                activo, email_verificado, ultimo_login, token_recuperacion,
                token_expiracion, fecha_creacion
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(usuario.id)
        .bind(&usuario.email)
        .bind(&usuario.password_hash)
        .bind(&usuario.nombre_completo)
        .bind(&usuario.telefono)
        .bind(usuario.rol.as_str())
        .bind(usuario.conjunto_id)
        .bind(usuario.activo)
        .bind(usuario.email_verificado)
        .bind(usuario.ultimo_login)
        .bind(&usuario.token_recuperacion)
        .bind(usuario.token_expiracion)
        .bind(usuario.fecha_creacion)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating usuario: {}", e);
            let msg = e.to_string();
            if msg.contains("unique") || msg.contains("duplicate") {
                DomainError::EmailAlreadyExists(usuario.email.clone())
            } else {
                DomainError::DatabaseError(msg)
            }
        })?;

        row.try_into()
    }

    async fn update(&self, usuario: &Usuario) -> Result<Usuario, DomainError> {
        let row: UsuarioRow = sqlx::query_as(&format!(
            r#"
            UPDATE usuarios
            SET email = $2, password_hash = $3, nombre_completo = $4, telefono = $5,
                rol = $6, conjunto_id = $7, activo = $8, email_verificado = $9,
                ultimo_login = $10, token_recuperacion = $11, token_expiracion = $12
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(usuario.id)
        .bind(&usuario.email)
        .bind(&usuario.password_hash)
        .bind(&usuario.nombre_completo)
        .bind(&usuario.telefono)
        .bind(usuario.rol.as_str())
        .bind(usuario.conjunto_id)
        .bind(usuario.activo)
        .bind(usuario.email_verificado)
        .bind(usuario.ultimo_login)
        .bind(&usuario.token_recuperacion)
        .bind(usuario.token_expiracion)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error updating usuario: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    async fn count_propietarios(&self, conjunto_id: &Uuid) -> Result<i64, DomainError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM usuarios WHERE conjunto_id = $1 AND rol = $2 AND activo",
        )
        .bind(conjunto_id)
        .bind(Rol::Propietario.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error counting propietarios: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;
        Ok(count.0)
    }
}
