use clap::Subcommand;
use serde_json::Value;
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::output::{field, output_empty_collection, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuditCommands {
    #[command(about = "List audit entries, newest first")]
    List {
        #[arg(long)]
        entity_id: Option<Uuid>,
        #[arg(long, help = "task or work_report")]
        entity_type: Option<String>,
        #[arg(long)]
        performed_by: Option<Uuid>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub async fn handle(cmd: AuditCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuditCommands::List {
            entity_id,
            entity_type,
            performed_by,
            limit,
        } => {
            let mut query = Vec::new();
            if let Some(id) = entity_id {
                query.push(("entity_id", id.to_string()));
            }
            if let Some(kind) = entity_type {
                query.push(("entity_type", kind));
            }
            if let Some(by) = performed_by {
                query.push(("performed_by", by.to_string()));
            }
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }

            let entries = client.get("/api/audit", &query).await?;
            if entries.as_array().map_or(true, |e| e.is_empty()) {
                return output_empty_collection(output_format, "entries", "No audit entries found");
            }

            output_value(output_format, &entries, |entries| {
                entries
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(audit_line)
                    .collect()
            })
        }
    }
}

fn audit_line(entry: &Value) -> String {
    let notes = entry
        .get("notes")
        .and_then(Value::as_str)
        .map(|r| format!("  \"{}\"", r))
        .unwrap_or_default();
    format!(
        "{}  {:<16}  {}  by {}{}",
        field(entry, "performed_at"),
        field(entry, "action"),
        field(entry, "entity_id"),
        field(entry, "performed_by"),
        notes
    )
}
