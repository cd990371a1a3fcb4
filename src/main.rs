use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog_api::config::AppConfig;
use catalog_api::database::{DatabaseManager, MemoryProductStore, PgProductStore, ProductStore};
use catalog_api::{app, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Memory,
    Postgres,
}

#[derive(Parser)]
#[command(name = "catalog-api")]
#[command(about = "Per-user product catalog HTTP server")]
#[command(version)]
struct Args {
    #[arg(long, env = "PORT", default_value_t = 3000, help = "Port to listen on")]
    port: u16,

    #[arg(long, value_enum, default_value_t = StoreKind::Postgres, help = "Product store backend")]
    store: StoreKind,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env();
    info!("Starting Catalog API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set outside development");
    }

    let store: Arc<dyn ProductStore> = match args.store {
        StoreKind::Memory => {
            info!("Using in-memory product store");
            Arc::new(MemoryProductStore::new())
        }
        StoreKind::Postgres => {
            let db = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to the products database")?;
            if config.database.run_migrations {
                db.migrate().await.context("failed to migrate the products schema")?;
            }
            Arc::new(PgProductStore::new(db))
        }
    };

    let app = app(AppState::new(config, store));

    let bind_addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Catalog API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
