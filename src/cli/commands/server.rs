use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::ServerStatus;
use crate::cli::utils::{output_value, str_field};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Health check the server")]
    Ping,

    #[command(about = "Show server information from API root endpoint")]
    Info,
}

pub async fn handle(cmd: ServerCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Ping => {
            let status = client.ping().await;
            let label = match status {
                ServerStatus::Up => "up",
                ServerStatus::Degraded => "degraded",
                ServerStatus::Down => "down",
            };
            let value = json!({ "server": client.base_url().as_str(), "status": label });
            output_value(&output_format, &value, |_| {
                println!("{} is {}", client.base_url(), label);
            })?;
            if status == ServerStatus::Down {
                anyhow::bail!("server {} is not reachable", client.base_url());
            }
            Ok(())
        }
        ServerCommands::Info => {
            let info = client.get("/").await?;
            output_value(&output_format, &info, |info| {
                println!("{} {}", str_field(info, "name"), str_field(info, "version"));
            })
        }
    }
}
