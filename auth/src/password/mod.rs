pub mod credential;
pub mod errors;
pub mod pbkdf2;

pub use credential::Credential;
pub use credential::Salt;
pub use errors::PasswordError;
pub use self::pbkdf2::CredentialHasher;
pub use self::pbkdf2::DEFAULT_ITERATIONS;
