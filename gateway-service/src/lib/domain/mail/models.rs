use crate::domain::mail::errors::MailError;
use crate::domain::user::models::EmailAddress;

/// Message to hand to the relay.
///
/// Sender identity is fixed by the relay configuration; every account sends
/// through the same From address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
    pub reply_to: Option<EmailAddress>,
}

/// Command to send an e-mail on behalf of an authenticated account
#[derive(Debug, Clone)]
pub struct SendEmailCommand {
    pub email: OutgoingEmail,
}

impl SendEmailCommand {
    /// Validate raw request fields.
    ///
    /// Recipient, subject, and body are trimmed and must be non-empty. An
    /// empty reply-to is treated as absent.
    ///
    /// # Errors
    /// * `MissingField` - Recipient, subject, or body is blank
    /// * `InvalidAddress` - Recipient or reply-to is not a valid address
    pub fn new(
        to: &str,
        subject: &str,
        body: &str,
        reply_to: Option<&str>,
    ) -> Result<Self, MailError> {
        let to = required("Recipient", to)?;
        let subject = required("Subject", subject)?;
        let body = required("Body", body)?;

        let to = EmailAddress::new(to.to_string()).map_err(|e| MailError::InvalidAddress {
            field: "recipient",
            reason: e.to_string(),
        })?;

        let reply_to = match reply_to.map(str::trim).filter(|r| !r.is_empty()) {
            Some(address) => Some(EmailAddress::new(address.to_string()).map_err(|e| {
                MailError::InvalidAddress {
                    field: "reply-to",
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            email: OutgoingEmail {
                to,
                subject: subject.to_string(),
                body: body.to_string(),
                reply_to,
            },
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, MailError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MailError::MissingField(field));
    }
    Ok(value)
}
