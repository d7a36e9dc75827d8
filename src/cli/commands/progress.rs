use clap::Subcommand;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_value, print_progress};
use crate::cli::OutputFormat;
use crate::progress::{Achievement, StageKey};

#[derive(Subcommand)]
pub enum ProgressCommands {
    #[command(about = "Show stage progress and achievements")]
    Show {
        #[arg(help = "Customer id")]
        id: Uuid,
    },

    #[command(about = "Replace a stage's payload with a JSON object (null clears it)")]
    SetStage {
        #[arg(help = "Customer id")]
        id: Uuid,
        #[arg(help = "Stage key: inflow, contract, delivery, educationNotes, growth, expert")]
        stage: StageKey,
        #[arg(help = "Stage payload as JSON, e.g. '{\"completed\": true}'")]
        value: String,
    },

    #[command(about = "Revert a stage to not started")]
    ClearStage {
        #[arg(help = "Customer id")]
        id: Uuid,
        #[arg(help = "Stage key")]
        stage: StageKey,
    },

    #[command(about = "Set or clear a stage memo without touching its other fields")]
    Memo {
        #[arg(help = "Customer id")]
        id: Uuid,
        #[arg(help = "Stage key")]
        stage: StageKey,
        #[arg(help = "Memo text (omit to clear)")]
        text: Option<String>,
    },

    #[command(about = "Flip one achievement flag")]
    Toggle {
        #[arg(help = "Customer id")]
        id: Uuid,
        #[arg(help = "basicTraining, standardProtocol or expertCourse")]
        flag: Achievement,
    },

    #[command(about = "Check a star level (1-3) and every level below it, or uncheck it and every level above")]
    Level {
        #[arg(help = "Customer id")]
        id: Uuid,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
        level: u8,
        #[arg(long, help = "Uncheck instead of check")]
        uncheck: bool,
    },
}

pub async fn handle(cmd: ProgressCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let view = match cmd {
        ProgressCommands::Show { id } => client.get(&progress_path(id)).await?,
        ProgressCommands::SetStage { id, stage, value } => {
            let value: Value = serde_json::from_str(&value)
                .map_err(|e| anyhow::anyhow!("stage payload is not valid JSON: {}", e))?;
            client.put(&stage_path(id, stage), &json!({ "value": value })).await?
        }
        ProgressCommands::ClearStage { id, stage } => client.delete(&stage_path(id, stage)).await?,
        ProgressCommands::Memo { id, stage, text } => {
            let path = format!("{}/memo", stage_path(id, stage));
            client.patch(&path, &json!({ "memo": text })).await?
        }
        ProgressCommands::Toggle { id, flag } => {
            let path = format!("{}/achievements/{}/toggle", progress_path(id), flag.as_str());
            client.post(&path, None::<&()>).await?
        }
        ProgressCommands::Level { id, level, uncheck } => {
            let path = format!("{}/achievements", progress_path(id));
            client.put(&path, &json!({ "level": level, "checked": !uncheck })).await?
        }
    };

    output_value(&output_format, &view, print_progress)
}

fn progress_path(id: Uuid) -> String {
    format!("/api/customers/{}/progress", id)
}

fn stage_path(id: Uuid, stage: StageKey) -> String {
    format!("{}/stages/{}", progress_path(id), stage.as_str())
}
