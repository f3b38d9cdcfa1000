pub mod client;
pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "workforce")]
#[command(about = "Workforce CLI - review lifecycle, access checks and schema setup")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "WORKFORCE_API_URL",
        default_value = "http://localhost:9001",
        help = "Base URL of the Workforce API"
    )]
    pub api_url: String,

    #[arg(long, global = true, env = "WORKFORCE_TOKEN", hide_env_values = true, help = "Bearer token")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint a signed token for local use")]
    Token(commands::token::TokenArgs),

    #[command(about = "Inspect roles, capabilities and routes")]
    Access {
        #[command(subcommand)]
        cmd: commands::access::AccessCommands,
    },

    #[command(about = "Submit, list and review work items")]
    Items {
        #[command(subcommand)]
        cmd: commands::items::ItemsCommands,
    },

    #[command(about = "Read the audit log")]
    Audit {
        #[command(subcommand)]
        cmd: commands::audit::AuditCommands,
    },

    #[command(about = "Database management")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = || client::ApiClient::new(&cli.api_url, cli.token.clone());

    match cli.command {
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Access { cmd } => commands::access::handle(cmd, output_format),
        Commands::Items { cmd } => commands::items::handle(cmd, &client()?, output_format).await,
        Commands::Audit { cmd } => commands::audit::handle(cmd, &client()?, output_format).await,
        Commands::Db { cmd } => commands::db::handle(cmd, output_format).await,
    }
}
