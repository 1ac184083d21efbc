use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::mail::errors::MailError;
use crate::domain::mail::models::SendEmailCommand;
use crate::domain::mail::ports::MailSender;
use crate::domain::mail::ports::MailServicePort;
use crate::domain::user::models::UserId;

/// Domain service implementation for outgoing mail.
pub struct MailService<MS>
where
    MS: MailSender,
{
    sender: Arc<MS>,
}

impl<MS> MailService<MS>
where
    MS: MailSender,
{
    pub fn new(sender: Arc<MS>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl<MS> MailServicePort for MailService<MS>
where
    MS: MailSender,
{
    async fn send_email(
        &self,
        sender: &UserId,
        command: SendEmailCommand,
    ) -> Result<(), MailError> {
        let email = command.email;

        match self.sender.send(&email).await {
            Ok(()) => {
                tracing::info!(
                    user_id = %sender,
                    recipient = %email.to,
                    "Email sent"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    user_id = %sender,
                    recipient = %email.to,
                    error = %e,
                    "Failed to send email"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::mail::models::OutgoingEmail;

    mock! {
        pub TestMailSender {}

        #[async_trait]
        impl MailSender for TestMailSender {
            async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
        }
    }

    #[tokio::test]
    async fn test_send_email_success() {
        let mut sender = MockTestMailSender::new();

        sender
            .expect_send()
            .withf(|email| {
                email.to.as_str() == "friend@example.com"
                    && email.subject == "Hello"
                    && email.body == "Hi there"
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = MailService::new(Arc::new(sender));
        let command =
            SendEmailCommand::new("friend@example.com", "Hello", "Hi there", None).unwrap();

        assert!(service.send_email(&UserId::new(), command).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_email_propagates_failure() {
        let mut sender = MockTestMailSender::new();

        sender
            .expect_send()
            .times(1)
            .returning(|_| Err(MailError::NotConfigured));

        let service = MailService::new(Arc::new(sender));
        let command =
            SendEmailCommand::new("friend@example.com", "Hello", "Hi there", None).unwrap();

        assert_eq!(
            service.send_email(&UserId::new(), command).await,
            Err(MailError::NotConfigured)
        );
    }
}
