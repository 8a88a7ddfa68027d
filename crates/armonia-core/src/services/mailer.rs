//! Outbound mail port

use async_trait::async_trait;
use tracing::info;

use armonia_shared::utils::mask_email;

use crate::error::DomainError;

/// Notification sender. The production transport is not wired up yet, so the
/// default implementation logs the tokens instead of emailing them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_password_reset(
        &self,
        email: &str,
        nombre: &str,
        token: &str,
    ) -> Result<(), DomainError>;

    async fn send_email_verification(
        &self,
        email: &str,
        nombre: &str,
        token: &str,
    ) -> Result<(), DomainError>;
}

/// Logging stub standing in for a real mail transport.
pub struct LogMailer;

#[async_trait]
impl MailSender for LogMailer {
    async fn send_password_reset(
        &self,
        email: &str,
        _nombre: &str,
        token: &str,
    ) -> Result<(), DomainError> {
        info!(
            "Password reset token for {}: {}",
            mask_email(email),
            token
        );
        Ok(())
    }

    async fn send_email_verification(
        &self,
        email: &str,
        _nombre: &str,
        token: &str,
    ) -> Result<(), DomainError> {
        info!(
            "Email verification token for {}: {}",
            mask_email(email),
            token
        );
        Ok(())
    }
}
