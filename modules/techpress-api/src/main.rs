use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use techpress_api::{build_router, AppState};
use techpress_common::Config;
use techpress_ingest::Ingestor;
use techpress_store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("techpress=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let store = PgStore::connect(&config.database_connect_url()?).await?;
    if config.run_migrations {
        info!("Running migrations");
        store.migrate().await?;
    }

    let ingestor = Ingestor::from_config(&config, Arc::new(store))?;
    let app = build_router(Arc::new(AppState::new(ingestor)));

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("Techpress API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
