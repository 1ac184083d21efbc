use std::env;

use auth::AuthConfig;
use auth::AuthConfigError;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthSettings,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    /// Token signing secret. Never logged.
    pub secret: Secret<String>,
    pub token_ttl_seconds: i64,
    pub password_iterations: u32,
}

/// Shared SMTP relay used for every outgoing message.
#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub use_tls: bool,
    pub from_email: Option<String>,
    pub from_name: String,
}

impl SmtpConfig {
    /// Relay host and login are all present.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty()
            && !self.username.is_empty()
            && !self.password.expose_secret().is_empty()
    }

    /// Sender address, falling back to the relay login.
    pub fn sender_address(&self) -> &str {
        match self.from_email.as_deref() {
            Some(address) if !address.is_empty() => address,
            _ => &self.username,
        }
    }
}

impl AuthSettings {
    /// Build the authentication configuration.
    ///
    /// # Errors
    /// * `EmptySecret` - No signing secret configured
    /// * `InvalidIterations` - Iteration count is zero
    /// * `InvalidTokenTtl` - Token lifetime is not positive
    pub fn to_auth_config(&self) -> Result<AuthConfig, AuthConfigError> {
        AuthConfig::from_secret(self.secret.expose_secret().as_bytes())?
            .with_password_iterations(self.password_iterations)?
            .with_token_ttl(Duration::seconds(self.token_ttl_seconds))
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__SECRET, SMTP__HOST, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    ///
    /// `auth.secret` has no default, so loading fails when it is not provided.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 8000)?
            .set_default("database.max_connections", 5)?
            .set_default("auth.token_ttl_seconds", auth::config::DEFAULT_TOKEN_TTL_SECONDS)?
            .set_default("auth.password_iterations", i64::from(auth::password::DEFAULT_ITERATIONS))?
            .set_default("smtp.host", "")?
            .set_default("smtp.port", 587)?
            .set_default("smtp.username", "")?
            .set_default("smtp.password", "")?
            .set_default("smtp.use_tls", true)?
            .set_default("smtp.from_name", "Mail Gateway")?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: AUTH__SECRET=... overrides auth.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
