use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_notifications::{BundledMessages, HttpMailClient, WelcomeDispatcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation so startup errors are reported in color
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = match &config.database {
        Some(db_config) => {
            let db = database::postgres::connect_from_config_with_retry(db_config.clone(), None)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
            database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name)
                .await
                .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
            Some(db)
        }
        None => {
            warn!("DATABASE_URL not set, users are kept in memory");
            None
        }
    };

    let notifier = WelcomeDispatcher::new(
        Arc::new(HttpMailClient::new(&config.notifications)?),
        Arc::new(BundledMessages::new()),
        config.notifications.email_from.clone(),
    );
    info!(
        mail_service = %config.notifications.service_url,
        "Welcome emails enabled"
    );

    let state = AppState { config, db };

    let api_routes = api::routes(&state, Some(notifier));
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // /health: liveness with app name/version, /ready: database ping
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    info!("Starting registry API with graceful shutdown (30s timeout)");

    let AppState { config, db } = state;
    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        if let Some(db) = db {
            info!("Shutting down: closing database connections");
            match db.close().await {
                Ok(()) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Registry API shutdown complete");
    Ok(())
}
