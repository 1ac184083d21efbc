pub mod mail;
pub mod user;
