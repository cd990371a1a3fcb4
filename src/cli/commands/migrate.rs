use anyhow::Context;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::postgres::PRODUCTS_TABLE;
use crate::database::DatabaseManager;

#[derive(Debug, Serialize)]
struct MigrationReport {
    success: bool,
    table: &'static str,
}

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to DATABASE_URL")?;

    let result = db.migrate().await.context("failed to apply the products schema");
    db.close().await;
    result?;

    let report = MigrationReport { success: true, table: PRODUCTS_TABLE };
    output_format.emit(&report, |r| println!("✓ {} schema applied", r.table))
}
