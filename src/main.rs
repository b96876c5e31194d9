use merchant_settlement::api::{create_router, AppState};
use merchant_settlement::channel::PluginRegistry;
use merchant_settlement::config::Settings;
use merchant_settlement::notify::HttpNotifier;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // Connect to PostgreSQL
    let pool = PgPoolOptions::new()
        .max_connections(settings.database.pool_size)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.database.url)
        .await?;
    info!("Database connection established");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations applied");

    // Channel plugins are registered here as integrations are added.
    let plugins = Arc::new(PluginRegistry::new());

    let notifier = Arc::new(HttpNotifier::new(Duration::from_secs(
        settings.notify.timeout_secs,
    )));

    let state = AppState::new(pool, plugins)
        .with_notifier(notifier, settings.notify.clone())
        .with_upstream_settings(settings.upstream.clone());

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", settings.application.port);
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
