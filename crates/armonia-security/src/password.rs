//! Password hashing with bcrypt

use rand::Rng;
use thiserror::Error;

/// Fixed work factor. Raising it invalidates no stored hashes but slows
/// new logins, so it changes only deliberately.
const BCRYPT_COST: u32 = 12;

/// Unambiguous alphabet for temporary passwords (no 0/O, 1/l/I).
const TEMP_PASSWORD_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";
const TEMP_PASSWORD_LEN: usize = 8;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Hash error: {0}")]
    HashError(String),
}

pub struct PasswordService;

impl PasswordService {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        bcrypt::hash(password, BCRYPT_COST).map_err(|e| PasswordError::HashError(e.to_string()))
    }

    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        bcrypt::verify(password, hash).map_err(|e| PasswordError::HashError(e.to_string()))
    }

    pub fn generate_temporary_password() -> String {
        let mut rng = rand::rng();
        (0..TEMP_PASSWORD_LEN)
            .map(|_| {
                let idx = rng.random_range(0..TEMP_PASSWORD_CHARS.len());
                TEMP_PASSWORD_CHARS[idx] as char
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = PasswordService::hash("Contrasena9!").unwrap();
        assert!(PasswordService::verify("Contrasena9!", &hash).unwrap());
        assert!(!PasswordService::verify("otra-clave", &hash).unwrap());
    }

    #[test]
    fn temporary_password_uses_safe_alphabet() {
        let pw = PasswordService::generate_temporary_password();
        assert_eq!(pw.len(), TEMP_PASSWORD_LEN);
        assert!(pw.bytes().all(|b| TEMP_PASSWORD_CHARS.contains(&b)));
    }
}
