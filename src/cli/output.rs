use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            match data {
                Some(Value::Object(fields)) => {
                    if let Some(object) = response.as_object_mut() {
                        object.extend(fields);
                    }
                }
                Some(other) => response["data"] = other,
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print `value` as JSON, or as text lines produced by `render`
pub fn output_value(
    output_format: OutputFormat,
    value: &Value,
    render: impl Fn(&Value) -> Vec<String>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => {
            for line in render(value) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("-")
}

/// One-line summary of a work item
pub fn item_line(item: &Value) -> String {
    let hours = item.get("hours").map(|h| h.to_string().trim_matches('"').to_string()).unwrap_or_default();
    format!(
        "{}  {:<11}  {:<18}  {:<8}  {:>5}h  {}  {}",
        field(item, "id"),
        field(item, "kind"),
        derived_state(item),
        field(item, "final_status"),
        hours,
        field(item, "work_date"),
        field(item, "title")
    )
}

fn derived_state(item: &Value) -> &'static str {
    match (
        item.get("admin_status").and_then(Value::as_str),
        item.get("team_lead_status").and_then(Value::as_str),
    ) {
        (Some("approved"), _) => "admin_approved",
        (Some("rejected"), _) => "admin_rejected",
        (_, Some("approved")) => "team_lead_approved",
        (_, Some("rejected")) => "team_lead_rejected",
        _ => "pending",
    }
}
