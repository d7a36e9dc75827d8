pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "kolp")]
#[command(about = "kolp - Command-line interface for the KOL customer progress API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = config::SERVER_URL_ENV,
        default_value = config::DEFAULT_SERVER_URL,
        help = "Base URL of the progress API server"
    )]
    pub server: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Check the API server")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Customer directory operations")]
    Customer {
        #[command(subcommand)]
        cmd: commands::customer::CustomerCommands,
    },

    #[command(about = "Read and edit a customer's stage progress and achievements")]
    Progress {
        #[command(subcommand)]
        cmd: commands::progress::ProgressCommands,
    },

    #[command(about = "Summarize a case's round checklist (computed locally)")]
    Rounds(commands::rounds::RoundsArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

    let client = || client::ApiClient::new(&cli.server);

    match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, &client()?, output_format).await,
        Commands::Customer { cmd } => commands::customer::handle(cmd, &client()?, output_format).await,
        Commands::Progress { cmd } => commands::progress::handle(cmd, &client()?, output_format).await,
        Commands::Rounds(args) => commands::rounds::handle(args, output_format),
    }
}
