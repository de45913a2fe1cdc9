use sea_orm::{ConnectOptions, Database};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cart_ledger::api::create_api_router;
use cart_ledger::config::Config;
use cart_ledger::entities::{seed_demo_data, setup_schema};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    if let Err(err) = run().await {
        error!(error = %err, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);
    let db = Database::connect(options).await?;
    setup_schema(&db).await?;
    if config.seed_demo_data {
        seed_demo_data(&db).await?;
    }

    let app = create_api_router(Arc::new(db), &config.secret);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!(address = %config.bind_address, "Listening");
    axum::serve(listener, app).await?;
    Ok(())
}
