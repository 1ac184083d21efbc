use thiserror::Error;

/// Error for outgoing mail operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid {field} address: {reason}")]
    InvalidAddress { field: &'static str, reason: String },

    #[error("SMTP credentials are not configured. Set SMTP__HOST, SMTP__USERNAME, and SMTP__PASSWORD.")]
    NotConfigured,

    #[error("Failed to build message: {0}")]
    BuildFailed(String),

    #[error("Failed to deliver message: {0}")]
    DeliveryFailed(String),
}
