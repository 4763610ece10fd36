//! Crop Advisory Platform - Backend Server
//!
//! Farmers submit a crop onboarding form; the server chains the Predict,
//! Forecast and Risk services and stores the result as a report.

use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crop_advisory_backend::{
    config::Config,
    create_app,
    repository::{PgReportRepository, PgUserRepository},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "advisory_server=debug,crop_advisory_backend=debug,tower_http=debug,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Crop Advisory Server");
    tracing::info!("Environment: {}", config.environment);

    let state = match config.database.url.clone() {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&url)
                .await?;

            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&db_pool).await?;
            tracing::info!("Migrations completed");

            AppState::new(
                config.clone(),
                Arc::new(PgReportRepository::new(db_pool.clone())),
                Arc::new(PgUserRepository::new(db_pool)),
            )
        }
        None => {
            tracing::warn!("No database URL configured, keeping users and reports in memory");
            AppState::in_memory(config.clone())
        }
    };

    tracing::info!(
        predict = %config.services.predict_url,
        forecast = %config.services.forecast_url,
        risk = %config.services.risk_url,
        timeout_ms = config.services.timeout_ms,
        "Inference services configured"
    );

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
