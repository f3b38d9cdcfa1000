use clap::Subcommand;
use serde_json::json;

use crate::cli::output::output_success;
use crate::cli::OutputFormat;
use crate::database::{schema, DatabaseManager};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create tables, indexes and the audit trigger (idempotent)")]
    Init,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Init => {
            let pool = DatabaseManager::pool().await?;
            let applied = schema::apply(&pool).await?;
            DatabaseManager::close().await;

            output_success(
                output_format,
                &format!("Schema applied ({} statements)", applied),
                Some(json!({ "statements": applied })),
            )
        }
    }
}
