//! fleet-web — REST server for the fleet admin backend.
//!
//! Configuration is read from the environment (see `fleet_admin::config`).
//! Without FLEET_DATABASE_URL the server runs on an in-memory store.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use fleet_admin::database::{DatabaseConfig, DatabaseManager};
use fleet_admin::{AppConfig, FleetStore, MemoryStore};
use fleet_web::router::build_router;
use fleet_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fleet_web=debug,fleet_admin=debug".into()),
        )
        .init();

    let catalog = config
        .load_catalog()
        .context("failed to load stage catalog")?;
    tracing::info!(
        version = catalog.version(),
        first_outbound = catalog.first_outbound_tag(),
        "Stage catalog ready"
    );

    let store: Arc<dyn FleetStore> = match DatabaseConfig::from_app_config(&config) {
        Some(db_config) => {
            let db = DatabaseManager::new(db_config)
                .await
                .context("failed to connect to database")?;
            db.test_connection()
                .await
                .context("database did not answer a test query")?;
            if config.run_migrations {
                db.run_migrations()
                    .await
                    .context("failed to run migrations")?;
            }
            tracing::info!("Connected to database ({})", db.connection_stats());
            Arc::new(db.fleet_store())
        }
        None => {
            tracing::warn!("FLEET_DATABASE_URL not set; using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, catalog, config.expiry_warning_days);
    let app = build_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("fleet-web listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
