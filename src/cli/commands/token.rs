use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::access::Role;
use crate::auth::{generate_jwt, Claims};
use crate::cli::output::output_success;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct TokenArgs {
    /// Role carried by the token (worker, team_lead, report_admin, ...)
    #[arg(long)]
    pub role: Role,

    /// Actor id; a random one is generated when omitted
    #[arg(long)]
    pub id: Option<Uuid>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, help = "Mark the actor as an investor")]
    pub investor: bool,

    #[arg(long, help = "Token lifetime in hours, defaults to the configured expiry")]
    pub expiry_hours: Option<i64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let id = args.id.unwrap_or_else(Uuid::new_v4);
    let claims = match args.expiry_hours {
        Some(hours) => Claims::with_expiry(id, args.role, args.investor, args.name, hours),
        None => Claims::new(id, args.role, args.investor, args.name),
    };
    let token = generate_jwt(&claims)?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Token issued",
            Some(json!({
                "token": token,
                "sub": claims.sub,
                "role": claims.role,
                "is_investor": claims.is_investor,
                "expires_at": claims.exp
            })),
        ),
        OutputFormat::Text => {
            // Bare token so it can be captured with $(workforce token ...)
            println!("{}", token);
            Ok(())
        }
    }
}
