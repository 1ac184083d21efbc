use async_trait::async_trait;

use crate::domain::mail::errors::MailError;
use crate::domain::mail::models::OutgoingEmail;
use crate::domain::mail::models::SendEmailCommand;
use crate::domain::user::models::UserId;

/// Port for outgoing mail operations.
#[async_trait]
pub trait MailServicePort: Send + Sync + 'static {
    /// Send a message through the shared relay on behalf of `sender`.
    ///
    /// # Errors
    /// * `NotConfigured` - Relay credentials are missing
    /// * `DeliveryFailed` - Relay rejected or could not be reached
    async fn send_email(&self, sender: &UserId, command: SendEmailCommand)
        -> Result<(), MailError>;
}

/// Delivery of a single message to the relay.
#[async_trait]
pub trait MailSender: Send + Sync + 'static {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}
