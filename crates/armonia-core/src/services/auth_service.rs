// ============================================================================
// Armonia Core - Authentication Service
// File: crates/armonia-core/src/services/auth_service.rs
// ============================================================================
//! Authentication service: login, register, token refresh and the
//! password-reset / email-verification flows.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use armonia_security::jwt::{AuthTokens, JwtService, TokenSubject};
use armonia_security::{PasswordService, Rol};

use crate::domain::usuario::validar_password;
use crate::domain::{Conjunto, Usuario};
use crate::error::DomainError;
use crate::repositories::{ConjuntoRepository, UsuarioRepository};
use crate::services::mailer::MailSender;

pub struct AuthService<U: UsuarioRepository, C: ConjuntoRepository> {
    usuario_repo: Arc<U>,
    conjunto_repo: Arc<C>,
    jwt: Arc<JwtService>,
    mailer: Arc<dyn MailSender>,
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistroUsuario {
    #[validate(email(message = "Formato de email inválido"))]
    pub email: String,

    #[validate(length(min = 2, max = 100, message = "El nombre debe tener entre 2 y 100 caracteres"))]
    pub nombre_completo: String,

    pub telefono: Option<String>,
    pub password: String,
    pub rol: Option<Rol>,
    pub conjunto_id: Option<Uuid>,
}

/// Result of a successful login or refresh
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user: UserInfo,
    pub tokens: AuthTokens,
}

/// Result of a successful registration
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResult {
    pub user: UserInfo,
    pub requires_email_verification: bool,
}

/// User info returned in auth responses
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub rol: Rol,
    pub conjunto_id: Option<Uuid>,
    pub tenant_id: Option<String>,
    pub nombre_completo: String,
    pub activo: bool,
    pub email_verificado: bool,
}

impl UserInfo {
    fn from_usuario(usuario: &Usuario, conjunto: Option<&Conjunto>) -> Self {
        Self {
            id: usuario.id,
            email: usuario.email.clone(),
            rol: usuario.rol,
            conjunto_id: usuario.conjunto_id,
            tenant_id: conjunto.map(|c| c.tenant_id.clone()),
            nombre_completo: usuario.nombre_completo.clone(),
            activo: usuario.activo,
            email_verificado: usuario.email_verificado,
        }
    }
}

impl<U: UsuarioRepository, C: ConjuntoRepository> AuthService<U, C> {
    pub fn new(
        usuario_repo: Arc<U>,
        conjunto_repo: Arc<C>,
        jwt: Arc<JwtService>,
        mailer: Arc<dyn MailSender>,
    ) -> Self {
        Self { usuario_repo, conjunto_repo, jwt, mailer }
    }

    /// Login with email and password. Unknown email and bad password both
    /// come back as `InvalidCredentials` so accounts cannot be enumerated.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, DomainError> {
        let email = email.trim().to_lowercase();
        info!("Login attempt for: {}", armonia_shared::utils::mask_email(&email));

        // 1. Find user by email
        let user = self.usuario_repo.find_by_email(&email).await?.ok_or_else(|| {
            warn!("Login failed: email not found");
            DomainError::InvalidCredentials
        })?;

        // 2. Check if the account can login
        if !user.can_login() {
            warn!("Login failed: user not active: {}", user.id);
            return Err(DomainError::UserNotActive);
        }

        // 3. Check the conjunto is active (super admins are tenant-unscoped)
        let conjunto = self.conjunto_for(&user).await?;
        if let Some(c) = &conjunto {
            if user.rol != Rol::SuperAdmin && !c.activo {
                warn!("Login failed: conjunto not active: {}", c.tenant_id);
                return Err(DomainError::TenantNotActive);
            }
        }

        // 4. Verify password
        let password_valid = PasswordService::verify(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !password_valid {
            warn!("Login failed: invalid password for user {}", user.id);
            return Err(DomainError::InvalidCredentials);
        }

        // 5. Record last login; a failure here must not fail the login
        let mut updated = user.clone();
        updated.record_login();
        if let Err(e) = self.usuario_repo.update(&updated).await {
            error!("Failed to update last login: {}", e);
        }

        // 6. Issue the token pair
        let tokens = self.issue_tokens(&updated, conjunto.as_ref())?;

        info!("Login successful for user {}", updated.id);
        Ok(LoginResult { user: UserInfo::from_usuario(&updated, conjunto.as_ref()), tokens })
    }

    /// Register a new user. Defaults to the RESIDENTE role.
    pub async fn register(&self, registro: RegistroUsuario) -> Result<RegisterResult, DomainError> {
        registro.validate()?;
        validar_password(&registro.password)?;

        let email = registro.email.trim().to_lowercase();

        // Duplicate email check before hashing anything
        if self.usuario_repo.find_by_email(&email).await?.is_some() {
            warn!("Registration failed: email already exists");
            return Err(DomainError::EmailAlreadyExists(email));
        }

        let password_hash = PasswordService::hash(&registro.password)?;
        let usuario = Usuario::new(
            email,
            password_hash,
            registro.nombre_completo,
            registro.telefono,
            registro.rol.unwrap_or(Rol::Residente),
            registro.conjunto_id,
        )?;

        let created = self.usuario_repo.create(&usuario).await?;

        let token = self
            .jwt
            .generate_email_verification_token(&created.id, &created.email)?;
        self.mailer
            .send_email_verification(&created.email, &created.nombre_completo, &token)
            .await?;

        info!("Registration successful for user {}", created.id);
        Ok(RegisterResult {
            user: UserInfo::from_usuario(&created, None),
            requires_email_verification: true,
        })
    }

    /// Exchange a refresh token for a fresh token pair. The user and its
    /// conjunto are re-checked so revoked accounts drop out after at most
    /// one access-token lifetime.
    pub async fn refresh(&self, refresh_token: &str) -> Result<LoginResult, DomainError> {
        let claims = self
            .jwt
            .verify_refresh_token(refresh_token)
            .ok_or(DomainError::InvalidToken)?;

        let user = self
            .usuario_repo
            .find_by_id(&claims.user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        if !user.can_login() {
            return Err(DomainError::UserNotActive);
        }

        let conjunto = self.conjunto_for(&user).await?;
        if let Some(c) = &conjunto {
            if user.rol != Rol::SuperAdmin && !c.activo {
                return Err(DomainError::TenantNotActive);
            }
        }

        let tokens = self.issue_tokens(&user, conjunto.as_ref())?;
        Ok(LoginResult { user: UserInfo::from_usuario(&user, conjunto.as_ref()), tokens })
    }

    /// Always succeeds from the caller's point of view, whether or not the
    /// email exists: password-reset must not confirm account existence.
    pub async fn forgot_password(&self, email: &str) -> Result<(), DomainError> {
        let email = email.trim().to_lowercase();

        let user = match self.usuario_repo.find_by_email(&email).await? {
            Some(u) => u,
            None => {
                info!(
                    "Password reset requested for unknown email: {}",
                    armonia_shared::utils::mask_email(&email)
                );
                return Ok(());
            }
        };

        if !user.activo {
            info!("Password reset requested for inactive account: {}", user.id);
            return Ok(());
        }

        let token = self.jwt.generate_password_reset_token(&user.id, &user.email)?;

        let mut updated = user.clone();
        updated.token_recuperacion = Some(token.clone());
        updated.token_expiracion = Some(Utc::now() + Duration::hours(1));
        self.usuario_repo.update(&updated).await?;

        self.mailer
            .send_password_reset(&updated.email, &updated.nombre_completo, &token)
            .await?;
        Ok(())
    }

    /// Complete a password reset. The token must verify, match the stored
    /// one, and not be past its stored expiry.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), DomainError> {
        let claims = self
            .jwt
            .verify_password_reset_token(token)
            .ok_or(DomainError::InvalidToken)?;

        let user = self
            .usuario_repo
            .find_by_id(&claims.user_id)
            .await?
            .ok_or(DomainError::InvalidToken)?;

        let stored_valid = user.token_recuperacion.as_deref() == Some(token)
            && user.token_expiracion.map(|exp| exp > Utc::now()).unwrap_or(false);
        if !stored_valid {
            warn!("Password reset with stale or unknown token for user {}", user.id);
            return Err(DomainError::InvalidToken);
        }

        validar_password(password)?;

        let mut updated = user;
        updated.password_hash = PasswordService::hash(password)?;
        updated.token_recuperacion = None;
        updated.token_expiracion = None;
        self.usuario_repo.update(&updated).await?;

        info!("Password reset completed for user {}", updated.id);
        Ok(())
    }

    /// Mark the account's email as verified.
    pub async fn verify_email(&self, token: &str) -> Result<(), DomainError> {
        let claims = self
            .jwt
            .verify_email_verification_token(token)
            .ok_or(DomainError::InvalidToken)?;

        let user = self
            .usuario_repo
            .find_by_id(&claims.user_id)
            .await?
            .ok_or(DomainError::InvalidToken)?;

        let mut updated = user;
        updated.email_verificado = true;
        self.usuario_repo.update(&updated).await?;

        info!("Email verified for user {}", updated.id);
        Ok(())
    }

    async fn conjunto_for(&self, user: &Usuario) -> Result<Option<Conjunto>, DomainError> {
        match user.conjunto_id {
            Some(id) => self.conjunto_repo.find_by_id(&id).await,
            None => Ok(None),
        }
    }

    fn issue_tokens(
        &self,
        user: &Usuario,
        conjunto: Option<&Conjunto>,
    ) -> Result<AuthTokens, DomainError> {
        let subject = TokenSubject {
            user_id: user.id,
            email: user.email.clone(),
            rol: user.rol,
            conjunto_id: user.conjunto_id,
            tenant_id: conjunto.map(|c| c.tenant_id.clone()),
            nombre_completo: user.nombre_completo.clone(),
        };
        Ok(self.jwt.generate_auth_tokens(&subject)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armonia_shared::config::JwtSettings;

    use crate::repositories::conjunto_repository::MockConjuntoRepository;
    use crate::repositories::usuario_repository::MockUsuarioRepository;
    use crate::services::mailer::MockMailSender;

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new(&JwtSettings {
            secret: "test-secret".into(),
            refresh_secret: "test-refresh".into(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            reset_token_expiry: 3600,
            verification_token_expiry: 86400,
        }))
    }

    fn usuario_con_password(password: &str) -> Usuario {
        Usuario::new(
            "residente@armonia.co".into(),
            PasswordService::hash(password).unwrap(),
            "Carlos Pérez".into(),
            None,
            Rol::Residente,
            None,
        )
        .unwrap()
    }

    fn service(
        usuarios: MockUsuarioRepository,
        conjuntos: MockConjuntoRepository,
    ) -> AuthService<MockUsuarioRepository, MockConjuntoRepository> {
        let mut mailer = MockMailSender::new();
        mailer.expect_send_email_verification().returning(|_, _, _| Ok(()));
        mailer.expect_send_password_reset().returning(|_, _, _| Ok(()));
        AuthService::new(Arc::new(usuarios), Arc::new(conjuntos), jwt(), Arc::new(mailer))
    }

    #[tokio::test]
    async fn login_with_unknown_email_is_invalid_credentials() {
        let mut usuarios = MockUsuarioRepository::new();
        usuarios.expect_find_by_email().returning(|_| Ok(None));

        let svc = service(usuarios, MockConjuntoRepository::new());
        let result = svc.login("nadie@armonia.co", "Clave123!").await;
        assert!(matches!(result, Err(DomainError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_invalid_credentials() {
        let user = usuario_con_password("Correcta9!");
        let mut usuarios = MockUsuarioRepository::new();
        {
            let user = user.clone();
            usuarios.expect_find_by_email().returning(move |_| Ok(Some(user.clone())));
        }

        let svc = service(usuarios, MockConjuntoRepository::new());
        let result = svc.login("residente@armonia.co", "Incorrecta9!").await;
        assert!(matches!(result, Err(DomainError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn login_issues_verifiable_tokens() {
        let user = usuario_con_password("Correcta9!");
        let user_id = user.id;

        let mut usuarios = MockUsuarioRepository::new();
        {
            let user = user.clone();
            usuarios.expect_find_by_email().returning(move |_| Ok(Some(user.clone())));
        }
        usuarios.expect_update().returning(|u| Ok(u.clone()));

        let svc = service(usuarios, MockConjuntoRepository::new());
        let result = svc.login("residente@armonia.co", "Correcta9!").await.unwrap();
        assert_eq!(result.user.id, user_id);

        let claims = jwt().verify_access_token(&result.tokens.access_token).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.rol, Rol::Residente);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let existing = usuario_con_password("Correcta9!");
        let mut usuarios = MockUsuarioRepository::new();
        usuarios
            .expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));

        let svc = service(usuarios, MockConjuntoRepository::new());
        let result = svc
            .register(RegistroUsuario {
                email: "residente@armonia.co".into(),
                nombre_completo: "Carlos Pérez".into(),
                telefono: None,
                password: "Segura99!".into(),
                rol: None,
                conjunto_id: None,
            })
            .await;
        assert!(matches!(result, Err(DomainError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn forgot_password_is_success_shaped_for_unknown_email() {
        let mut usuarios = MockUsuarioRepository::new();
        usuarios.expect_find_by_email().returning(|_| Ok(None));

        let svc = service(usuarios, MockConjuntoRepository::new());
        assert!(svc.forgot_password("nadie@armonia.co").await.is_ok());
    }
}
