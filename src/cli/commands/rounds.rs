use clap::Args;
use serde_json::json;

use crate::cli::utils::{dots, output_value};
use crate::cli::OutputFormat;
use crate::progress::{RoundProgress, DEFAULT_MAX_ROUNDS};

#[derive(Args)]
pub struct RoundsArgs {
    #[arg(
        value_delimiter = ',',
        help = "Round flags in order, e.g. 'y,y,n,y' (accepts y/n, 1/0, true/false)"
    )]
    pub flags: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS, help = "Number of rounds in the checklist")]
    pub max: usize,
}

pub fn handle(args: RoundsArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let flags = args
        .flags
        .iter()
        .map(|f| parse_flag(f))
        .collect::<anyhow::Result<Vec<bool>>>()?;
    let rounds = RoundProgress::from_flags(&flags, args.max);

    let value = json!({
        "completed": rounds.completed_count(),
        "maxRounds": rounds.max_rounds(),
        "dots": rounds.dots(),
        "nextRound": rounds.next_round(),
    });
    output_value(&output_format, &value, |_| {
        println!(
            "{} {}/{}",
            dots(rounds.dots().iter().copied()),
            rounds.completed_count(),
            rounds.max_rounds()
        );
    })
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "1" | "true" | "o" => Ok(true),
        "n" | "no" | "0" | "false" | "x" | "" => Ok(false),
        other => anyhow::bail!("invalid round flag '{}'", other),
    }
}
