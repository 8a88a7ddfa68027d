// ============================================================================
// Armonia Security - JWT Tokens
// File: crates/armonia-security/src/jwt.rs
// ============================================================================
//! JWT token handling: access/refresh pairs plus single-purpose tokens
//! (password reset, email verification).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use armonia_shared::config::JwtSettings;
use armonia_shared::constants::{
    JWT_AUDIENCE_REFRESH, JWT_AUDIENCE_USERS, JWT_ISSUER, TOKEN_TYPE_EMAIL_VERIFICATION,
    TOKEN_TYPE_PASSWORD_RESET,
};

use crate::rbac::Rol;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
}

/// Identity embedded into an access token.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub email: String,
    pub rol: Rol,
    pub conjunto_id: Option<Uuid>,
    pub tenant_id: Option<String>,
    pub nombre_completo: String,
}

/// Access-token claims. Field names match the wire payload the frontends
/// already consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub email: String,
    pub rol: Rol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conjunto_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub nombre_completo: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Refresh-token claims carry only the user id, signed with a separate
/// secret and audience so an access token can never stand in for one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_id: Uuid,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Single-purpose token claims. The `tipo` discriminator prevents a
/// password-reset token from passing as an email-verification token even
/// though both carry a valid signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurposeClaims {
    pub user_id: Uuid,
    pub email: String,
    #[serde(rename = "type")]
    pub tipo: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    reset_token_expiry: i64,
    verification_token_expiry: i64,
}

impl JwtService {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            refresh_encoding_key: EncodingKey::from_secret(settings.refresh_secret.as_bytes()),
            refresh_decoding_key: DecodingKey::from_secret(settings.refresh_secret.as_bytes()),
            access_token_expiry: settings.access_token_expiry,
            refresh_token_expiry: settings.refresh_token_expiry,
            reset_token_expiry: settings.reset_token_expiry,
            verification_token_expiry: settings.verification_token_expiry,
        }
    }

    pub fn generate_access_token(&self, subject: &TokenSubject) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = AccessClaims {
            user_id: subject.user_id,
            email: subject.email.clone(),
            rol: subject.rol,
            conjunto_id: subject.conjunto_id,
            tenant_id: subject.tenant_id.clone(),
            nombre_completo: subject.nombre_completo.clone(),
            iss: JWT_ISSUER.to_string(),
            aud: JWT_AUDIENCE_USERS.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn generate_refresh_token(&self, user_id: &Uuid) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            user_id: *user_id,
            iss: JWT_ISSUER.to_string(),
            aud: JWT_AUDIENCE_REFRESH.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.refresh_token_expiry)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.refresh_encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    /// Access/refresh pair for a freshly authenticated user.
    pub fn generate_auth_tokens(&self, subject: &TokenSubject) -> Result<AuthTokens, JwtError> {
        let access_token = self.generate_access_token(subject)?;
        let refresh_token = self.generate_refresh_token(&subject.user_id)?;
        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.access_token_expiry,
        })
    }

    /// Signature, expiry and issuer/audience check. Any failure yields
    /// `None`; verification never surfaces an error to the caller.
    pub fn verify_access_token(&self, token: &str) -> Option<AccessClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_audience(&[JWT_AUDIENCE_USERS]);
        match decode::<AccessClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Access token rejected: {}", e);
                None
            }
        }
    }

    pub fn verify_refresh_token(&self, token: &str) -> Option<RefreshClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_audience(&[JWT_AUDIENCE_REFRESH]);
        match decode::<RefreshClaims>(token, &self.refresh_decoding_key, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Refresh token rejected: {}", e);
                None
            }
        }
    }

    pub fn generate_password_reset_token(
        &self,
        user_id: &Uuid,
        email: &str,
    ) -> Result<String, JwtError> {
        self.generate_purpose_token(user_id, email, TOKEN_TYPE_PASSWORD_RESET, self.reset_token_expiry)
    }

    pub fn verify_password_reset_token(&self, token: &str) -> Option<PurposeClaims> {
        self.verify_purpose_token(token, TOKEN_TYPE_PASSWORD_RESET)
    }

    pub fn generate_email_verification_token(
        &self,
        user_id: &Uuid,
        email: &str,
    ) -> Result<String, JwtError> {
        self.generate_purpose_token(
            user_id,
            email,
            TOKEN_TYPE_EMAIL_VERIFICATION,
            self.verification_token_expiry,
        )
    }

    pub fn verify_email_verification_token(&self, token: &str) -> Option<PurposeClaims> {
        self.verify_purpose_token(token, TOKEN_TYPE_EMAIL_VERIFICATION)
    }

    fn generate_purpose_token(
        &self,
        user_id: &Uuid,
        email: &str,
        tipo: &str,
        expiry: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = PurposeClaims {
            user_id: *user_id,
            email: email.to_string(),
            tipo: tipo.to_string(),
            iss: JWT_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    fn verify_purpose_token(&self, token: &str, expected: &str) -> Option<PurposeClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[JWT_ISSUER]);
        let claims = match decode::<PurposeClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!("Purpose token rejected: {}", e);
                return None;
            }
        };
        if claims.tipo != expected {
            debug!("Purpose token type mismatch: got {}, expected {}", claims.tipo, expected);
            return None;
        }
        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(&JwtSettings {
            secret: "test-secret".into(),
            refresh_secret: "test-refresh-secret".into(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            reset_token_expiry: 3600,
            verification_token_expiry: 86400,
        })
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: Uuid::new_v4(),
            email: "admin@armonia.co".into(),
            rol: Rol::AdminConjunto,
            conjunto_id: Some(Uuid::new_v4()),
            tenant_id: Some("cj0001".into()),
            nombre_completo: "Ana Torres".into(),
        }
    }

    #[test]
    fn access_token_round_trip() {
        let svc = service();
        let subject = subject();
        let tokens = svc.generate_auth_tokens(&subject).unwrap();
        assert_eq!(tokens.expires_in, 900);

        let claims = svc.verify_access_token(&tokens.access_token).unwrap();
        assert_eq!(claims.user_id, subject.user_id);
        assert_eq!(claims.email, subject.email);
        assert_eq!(claims.rol, subject.rol);
        assert_eq!(claims.tenant_id, subject.tenant_id);
    }

    #[test]
    fn refresh_token_round_trip() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let token = svc.generate_refresh_token(&user_id).unwrap();
        let claims = svc.verify_refresh_token(&token).unwrap();
        assert_eq!(claims.user_id, user_id);
    }

    #[test]
    fn access_token_does_not_verify_as_refresh() {
        let svc = service();
        let tokens = svc.generate_auth_tokens(&subject()).unwrap();
        assert!(svc.verify_refresh_token(&tokens.access_token).is_none());
        assert!(svc.verify_access_token(&tokens.refresh_token).is_none());
    }

    #[test]
    fn garbage_token_yields_none() {
        let svc = service();
        assert!(svc.verify_access_token("not-a-token").is_none());
    }

    #[test]
    fn purpose_token_type_confusion_rejected() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let reset = svc.generate_password_reset_token(&user_id, "a@b.co").unwrap();

        // Valid signature, wrong purpose.
        assert!(svc.verify_email_verification_token(&reset).is_none());
        let claims = svc.verify_password_reset_token(&reset).unwrap();
        assert_eq!(claims.user_id, user_id);
    }
}
