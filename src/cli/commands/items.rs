use chrono::NaiveDate;
use clap::Subcommand;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::output::{field, item_line, output_empty_collection, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ItemsCommands {
    #[command(about = "List visible work items")]
    List {
        #[arg(long, help = "pending, team_lead_approved, team_lead_rejected, admin_approved, admin_rejected")]
        state: Option<String>,
        #[arg(long)]
        final_status: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        owner: Option<Uuid>,
        #[arg(long)]
        limit: Option<usize>,
    },

    #[command(about = "Show one work item")]
    Show { id: Uuid },

    #[command(about = "Submit a task or work report")]
    Submit {
        #[arg(long, default_value = "work_report")]
        kind: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        hours: Decimal,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        platform: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    #[command(about = "Record the team-lead decision")]
    Review {
        id: Uuid,
        #[arg(value_parser = ["approve", "reject", "approved", "rejected"])]
        decision: String,
        #[arg(long)]
        reason: Option<String>,
    },

    #[command(about = "Admin override of a team-lead decision")]
    Override {
        id: Uuid,
        #[arg(value_parser = ["approve", "reject", "approved", "rejected"])]
        decision: String,
        #[arg(long)]
        reason: Option<String>,
    },

    #[command(about = "Resubmit a rejected item")]
    Resubmit {
        id: Uuid,
        #[arg(long)]
        notes: Option<String>,
    },
}

pub async fn handle(cmd: ItemsCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ItemsCommands::List {
            state,
            final_status,
            kind,
            owner,
            limit,
        } => {
            let mut query = Vec::new();
            if let Some(state) = state {
                query.push(("state", state));
            }
            if let Some(status) = final_status {
                query.push(("final_status", status));
            }
            if let Some(kind) = kind {
                query.push(("kind", kind));
            }
            if let Some(owner) = owner {
                query.push(("owner_id", owner.to_string()));
            }
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }

            let items = client.get("/api/items", &query).await?;
            if items.as_array().map_or(true, |i| i.is_empty()) {
                return output_empty_collection(output_format, "items", "No work items found");
            }
            output_value(output_format, &items, |items| {
                items.as_array().into_iter().flatten().map(item_line).collect()
            })
        }
        ItemsCommands::Show { id } => {
            let item = client.get(&format!("/api/items/{}", id), &[]).await?;
            output_value(output_format, &item, item_details)
        }
        ItemsCommands::Submit {
            kind,
            title,
            hours,
            date,
            platform,
            description,
        } => {
            let body = json!({
                "kind": kind,
                "title": title,
                "hours": hours,
                "work_date": date,
                "platform": platform,
                "description": description
            });
            let item = client.post("/api/items", &body).await?;
            output_value(output_format, &item, |item| vec![format!("Submitted {}", item_line(item))])
        }
        ItemsCommands::Review { id, decision, reason } => {
            let body = json!({ "decision": decision, "reason": reason });
            let outcome = client.post(&format!("/api/items/{}/review", id), &body).await?;
            output_value(output_format, &outcome, outcome_lines)
        }
        ItemsCommands::Override { id, decision, reason } => {
            let body = json!({ "decision": decision, "reason": reason });
            let outcome = client.post(&format!("/api/items/{}/override", id), &body).await?;
            output_value(output_format, &outcome, outcome_lines)
        }
        ItemsCommands::Resubmit { id, notes } => {
            let body = json!({ "notes": notes });
            let outcome = client.post(&format!("/api/items/{}/resubmit", id), &body).await?;
            output_value(output_format, &outcome, outcome_lines)
        }
    }
}

fn item_details(item: &Value) -> Vec<String> {
    let mut lines = vec![item_line(item)];
    for key in [
        "owner_id",
        "team_lead_reviewed_by",
        "rejection_reason",
        "admin_override_by",
        "admin_override_reason",
    ] {
        let value = field(item, key);
        if value != "-" {
            lines.push(format!("  {:<22} {}", key, value));
        }
    }
    if let Some(cycle) = item.get("cycle") {
        lines.push(format!("  {:<22} {}", "cycle", cycle));
    }
    lines
}

fn outcome_lines(outcome: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(item) = outcome.get("item") {
        lines.push(item_line(item));
    }
    if let Some(audit) = outcome.get("audit") {
        lines.push(format!("  audit: {} by {}", field(audit, "action"), field(audit, "performed_by")));
    }
    for warning in outcome.get("warnings").and_then(Value::as_array).into_iter().flatten() {
        lines.push(format!("  warning: [{}] {}", field(warning, "observer"), field(warning, "message")));
    }
    lines
}
