use actix_web::{web, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nb_api::{create_app, AppState};
use nb_shared::config::{AppConfig, LogFormat, LoggingConfig};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    tracing::info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting Noticeboard API"
    );

    if config.auth.is_using_default_secret() {
        if config.environment.is_production() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("JWT_SECRET not set, using the development default");
    }

    let state = web::Data::new(AppState::build(&config).await?);
    let simulated = state.simulated_channels();
    if !simulated.is_empty() {
        tracing::warn!(
            event = "dev_mode",
            channels = ?simulated,
            "Running with simulated delivery channels"
        );
    }

    let address = config.server.address();
    let workers = config.server.workers;
    tracing::info!(address = %address, "Server listening");

    let shutdown_state = state.clone();
    let app_config = config.clone();
    let mut server = HttpServer::new(move || create_app(state.clone(), &app_config));
    if workers > 0 {
        server = server.workers(workers);
    }

    server.bind(&address)?.run().await?;

    if let Some(database) = &shutdown_state.database {
        database.close().await;
    }
    tracing::info!("Server stopped");
    Ok(())
}
