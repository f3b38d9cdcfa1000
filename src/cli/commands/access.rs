use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::access::{can_named, effective_capabilities, viewable_routes, Actor, Profile, Role};
use crate::cli::output::output_value;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AccessCommands {
    #[command(about = "List every role")]
    Roles,

    #[command(about = "Show the capabilities a role resolves to")]
    Capabilities {
        role: Role,
        #[arg(long)]
        investor: bool,
    },

    #[command(about = "Check a single capability by name, e.g. canApproveReports")]
    Check {
        role: String,
        capability: String,
        #[arg(long)]
        investor: bool,
    },

    #[command(about = "Show the routes a role may navigate to")]
    Routes {
        role: Role,
        #[arg(long)]
        investor: bool,
    },
}

fn sample_actor(role: Role, investor: bool) -> Actor {
    let actor = Actor::new(Uuid::nil(), role);
    if investor {
        actor.investor()
    } else {
        actor
    }
}

pub fn handle(cmd: AccessCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AccessCommands::Roles => {
            let roles: Vec<_> = Role::ALL
                .iter()
                .map(|role| json!({ "role": role.as_str(), "label": role.label() }))
                .collect();
            output_value(output_format, &json!(roles), |_| {
                Role::ALL
                    .iter()
                    .map(|role| format!("{:<18} {}", role.as_str(), role.label()))
                    .collect()
            })
        }
        AccessCommands::Capabilities { role, investor } => {
            let actor = sample_actor(role, investor);
            let names: Vec<&str> = effective_capabilities(&actor).iter().map(|cap| cap.as_str()).collect();
            output_value(
                output_format,
                &json!({ "role": role, "is_investor": investor, "capabilities": names }),
                |_| names.iter().map(|name| name.to_string()).collect(),
            )
        }
        AccessCommands::Check {
            role,
            capability,
            investor,
        } => {
            let profile = Profile {
                is_investor: investor,
                ..Profile::default()
            };
            let allowed = can_named(&role, &capability, &profile);
            output_value(
                output_format,
                &json!({ "role": role, "capability": capability, "allowed": allowed }),
                |_| vec![if allowed { "allowed" } else { "denied" }.to_string()],
            )
        }
        AccessCommands::Routes { role, investor } => {
            let actor = sample_actor(role, investor);
            let routes: Vec<&str> = viewable_routes(&actor).iter().map(|route| route.as_str()).collect();
            output_value(
                output_format,
                &json!({ "role": role, "is_investor": investor, "routes": routes }),
                |_| routes.iter().map(|route| route.to_string()).collect(),
            )
        }
    }
}
