use std::sync::Arc;

use auth::Authenticator;
use gateway_service::config::Config;
use gateway_service::domain::mail::service::MailService;
use gateway_service::domain::user::service::UserService;
use gateway_service::inbound::http::router::create_router;
use gateway_service::outbound::mail::SmtpMailSender;
use gateway_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "gateway-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    // Refuse to serve anything without a usable signing secret.
    let auth_config = config.auth.to_auth_config().map_err(|e| {
        tracing::error!(error = %e, "Invalid authentication configuration");
        e
    })?;

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_seconds = auth_config.token_ttl().num_seconds(),
        password_iterations = auth_config.password_iterations(),
        smtp_host = %config.smtp.host,
        smtp_port = config.smtp.port,
        smtp_configured = config.smtp.is_configured(),
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let authenticator = Arc::new(Authenticator::new(&auth_config));
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let mail_sender = Arc::new(SmtpMailSender::new(config.smtp.clone()));

    let user_service = Arc::new(UserService::new(
        user_repository,
        Arc::clone(&authenticator),
    ));
    let mail_service = Arc::new(MailService::new(mail_sender));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, mail_service, authenticator);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
