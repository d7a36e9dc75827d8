use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::progress::calculator::STAGE_COUNT;
use crate::progress::StageKey;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print raw JSON, or hand the value to a text renderer
pub fn output_value<F>(output_format: &OutputFormat, value: &Value, render_text: F) -> anyhow::Result<()>
where
    F: FnOnce(&Value),
{
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => render_text(value),
    }
    Ok(())
}

/// Filled/empty dots, e.g. `●●●○○○○○○○`
pub fn dots(flags: impl IntoIterator<Item = bool>) -> String {
    flags.into_iter().map(|done| if done { '●' } else { '○' }).collect()
}

/// Three-star achievement display
pub fn stars(level: u64) -> String {
    (1..=3).map(|n| if n <= level { '★' } else { '☆' }).collect()
}

pub fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

/// One line per stage: key, state, memo
pub fn print_progress(view: &Value) {
    let summary = &view["summary"];
    let progress = &view["progress"];

    println!(
        "Stages: {}/{} complete ({:.0}%)   Achievements: {}",
        summary["completedStages"].as_u64().unwrap_or(0),
        STAGE_COUNT,
        summary["completionPercent"].as_f64().unwrap_or(0.0),
        stars(summary["achievementLevel"].as_u64().unwrap_or(0)),
    );

    let statuses = summary["stages"].as_array().cloned().unwrap_or_default();
    for key in StageKey::ALL {
        let status = statuses.iter().find(|s| s["key"] == key.as_str());
        let state = match status {
            Some(s) if s["completed"] == Value::Bool(true) => "done",
            Some(s) if s["started"] == Value::Bool(true) => "in progress",
            _ => "not started",
        };
        let memo = str_field(&progress["stageData"][key.as_str()], "memo");
        if memo.is_empty() {
            println!("  {:<15} {}", key.as_str(), state);
        } else {
            println!("  {:<15} {:<12} {}", key.as_str(), state, memo);
        }
    }

    if let Some(updated) = progress["updatedAt"].as_str() {
        println!("Updated: {}", updated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_dots_and_stars() {
        assert_eq!(dots([true, false, true]), "●○●");
        assert_eq!(stars(0), "☆☆☆");
        assert_eq!(stars(2), "★★☆");
        assert_eq!(stars(3), "★★★");
    }
}
