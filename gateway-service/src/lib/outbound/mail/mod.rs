pub mod smtp;

pub use smtp::SmtpMailSender;
