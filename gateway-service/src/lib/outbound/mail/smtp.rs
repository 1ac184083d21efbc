use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::Address;
use lettre::Message;
use lettre::SmtpTransport;
use lettre::Transport;
use secrecy::ExposeSecret;

use crate::config::SmtpConfig;
use crate::domain::mail::errors::MailError;
use crate::domain::mail::models::OutgoingEmail;
use crate::domain::mail::ports::MailSender;

/// Mail sender backed by the shared SMTP relay.
///
/// Uses STARTTLS when `use_tls` is set and implicit TLS otherwise. Delivery
/// is blocking and runs on the blocking pool.
pub struct SmtpMailSender {
    config: SmtpConfig,
}

impl SmtpMailSender {
    pub fn new(config: SmtpConfig) -> Self {
        if !config.is_configured() {
            tracing::warn!("SMTP relay is not configured; sending email will fail");
        }
        Self { config }
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let from = Mailbox::new(
            Some(self.config.from_name.clone()),
            parse_address(self.config.sender_address())?,
        );

        let mut builder = Message::builder()
            .from(from)
            .to(Mailbox::new(None, parse_address(email.to.as_str())?))
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN);

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(Mailbox::new(None, parse_address(reply_to.as_str())?));
        }

        builder
            .body(email.body.clone())
            .map_err(|e| MailError::BuildFailed(e.to_string()))
    }

    fn transport(&self) -> Result<SmtpTransport, MailError> {
        let builder = if self.config.use_tls {
            SmtpTransport::starttls_relay(&self.config.host)
        } else {
            SmtpTransport::relay(&self.config.host)
        }
        .map_err(|e| MailError::DeliveryFailed(e.to_string()))?;

        Ok(builder
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.expose_secret().clone(),
            ))
            .build())
    }
}

fn parse_address(address: &str) -> Result<Address, MailError> {
    address
        .parse::<Address>()
        .map_err(|e| MailError::BuildFailed(format!("invalid address '{}': {}", address, e)))
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if !self.config.is_configured() {
            return Err(MailError::NotConfigured);
        }

        let message = self.build_message(email)?;
        let transport = self.transport()?;

        tracing::debug!(
            host = %self.config.host,
            port = self.config.port,
            starttls = self.config.use_tls,
            "Delivering message to SMTP relay"
        );

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| MailError::DeliveryFailed(format!("delivery task failed: {}", e)))?
            .map_err(|e| MailError::DeliveryFailed(e.to_string()))?;

        Ok(())
    }
}
