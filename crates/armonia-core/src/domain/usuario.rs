//! Usuario domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use armonia_security::Rol;

use crate::error::DomainError;

/// Platform user. Lives in the public schema; tenant scoping happens through
/// `conjunto_id` and the claims derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Usuario {
    pub id: Uuid,

    #[validate(email)]
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    #[validate(length(min = 2, max = 100, message = "El nombre debe tener entre 2 y 100 caracteres"))]
    pub nombre_completo: String,

    pub telefono: Option<String>,
    pub rol: Rol,
    pub conjunto_id: Option<Uuid>,

    pub activo: bool,
    pub email_verificado: bool,
    pub ultimo_login: Option<DateTime<Utc>>,

    // Password-reset bookkeeping
    #[serde(skip_serializing)]
    pub token_recuperacion: Option<String>,
    #[serde(skip_serializing)]
    pub token_expiracion: Option<DateTime<Utc>>,

    pub fecha_creacion: DateTime<Utc>,
}

impl Usuario {
    pub fn new(
        email: String,
        password_hash: String,
        nombre_completo: String,
        telefono: Option<String>,
        rol: Rol,
        conjunto_id: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        let usuario = Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            password_hash,
            nombre_completo: nombre_completo.trim().to_string(),
            telefono,
            rol,
            conjunto_id,
            activo: true,
            email_verificado: false,
            ultimo_login: None,
            token_recuperacion: None,
            token_expiracion: None,
            fecha_creacion: Utc::now(),
        };
        usuario.validate()?;
        Ok(usuario)
    }

    pub fn can_login(&self) -> bool {
        self.activo
    }

    pub fn record_login(&mut self) {
        self.ultimo_login = Some(Utc::now());
    }
}

/// Password policy: 8-100 chars with at least one lowercase, one uppercase,
/// one digit and one special character.
pub fn validar_password(password: &str) -> Result<(), DomainError> {
    if password.len() < 8 {
        return Err(DomainError::InvalidInput(
            "La contraseña debe tener al menos 8 caracteres".into(),
        ));
    }
    if password.len() > 100 {
        return Err(DomainError::InvalidInput("La contraseña es demasiado larga".into()));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(DomainError::InvalidInput(
            "La contraseña debe contener al menos una letra minúscula".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(DomainError::InvalidInput(
            "La contraseña debe contener al menos una letra mayúscula".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(DomainError::InvalidInput(
            "La contraseña debe contener al menos un número".into(),
        ));
    }
    if !password.chars().any(|c| "@$!%*?&".contains(c)) {
        return Err(DomainError::InvalidInput(
            "La contraseña debe contener al menos un carácter especial".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let u = Usuario::new(
            "  Admin@Armonia.CO ".into(),
            "hash".into(),
            "Ana Torres".into(),
            None,
            Rol::AdminConjunto,
            None,
        )
        .unwrap();
        assert_eq!(u.email, "admin@armonia.co");
        assert!(u.activo);
        assert!(!u.email_verificado);
    }

    #[test]
    fn password_policy() {
        assert!(validar_password("Segura9!").is_ok());
        assert!(validar_password("corta1!").is_err());
        assert!(validar_password("sinmayuscula9!").is_err());
        assert!(validar_password("SINMINUSCULA9!").is_err());
        assert!(validar_password("SinNumero!!").is_err());
        assert!(validar_password("SinEspecial99").is_err());
    }
}
