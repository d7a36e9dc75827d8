//! Pure mutations over a [`CustomerProgress`] aggregate.
//!
//! Every function takes the current aggregate by reference and returns a new
//! one; nothing here touches storage or `updated_at`. Stage writes replace
//! the whole payload, except memo edits, which only change the memo field of
//! the existing payload.

use serde_json::Value;
use tracing::debug;

use super::achievements::Achievement;
use super::error::ProgressError;
use super::model::CustomerProgress;
use super::stage::{StageKey, StagePayload};

/// Replace one stage's payload, or clear it when `new_value` is `None`/`null`
pub fn set_stage(
    progress: &CustomerProgress,
    stage_key: &str,
    new_value: Option<Value>,
) -> Result<CustomerProgress, ProgressError> {
    let key: StageKey = stage_key.parse()?;
    match new_value {
        None | Some(Value::Null) => Ok(clear_stage(progress, key)),
        Some(value) => Ok(set_stage_payload(progress, key.parse_payload(value)?)),
    }
}

pub fn set_stage_payload(progress: &CustomerProgress, payload: StagePayload) -> CustomerProgress {
    debug!(customer_id = %progress.customer_id, stage = %payload.key(), "replacing stage payload");
    let mut next = progress.clone();
    next.stage_data.insert(payload);
    next
}

pub fn clear_stage(progress: &CustomerProgress, key: StageKey) -> CustomerProgress {
    debug!(customer_id = %progress.customer_id, stage = %key, "clearing stage");
    let mut next = progress.clone();
    next.stage_data.remove(key);
    next
}

/// Update only the memo of a stage, keeping its other fields.
/// An unstarted stage gets an empty payload carrying just the memo.
pub fn set_stage_memo(
    progress: &CustomerProgress,
    stage_key: &str,
    memo: Option<String>,
) -> Result<CustomerProgress, ProgressError> {
    let key: StageKey = stage_key.parse()?;
    debug!(customer_id = %progress.customer_id, stage = %key, "merging stage memo");

    let mut payload = progress
        .stage(key)
        .cloned()
        .unwrap_or_else(|| key.empty_payload());
    payload.set_memo(memo);

    let mut next = progress.clone();
    next.stage_data.insert(payload);
    Ok(next)
}

pub fn toggle_achievement(progress: &CustomerProgress, flag: Achievement) -> CustomerProgress {
    let mut next = progress.clone();
    let current = next.achievements.get(flag);
    next.achievements.set(flag, !current);
    debug!(customer_id = %progress.customer_id, %flag, value = !current, "toggled achievement");
    next
}

pub fn toggle_achievement_named(
    progress: &CustomerProgress,
    flag_name: &str,
) -> Result<CustomerProgress, ProgressError> {
    let flag: Achievement = flag_name.parse()?;
    Ok(toggle_achievement(progress, flag))
}

/// Check or uncheck star `level` with the cascading checkbox rule
pub fn set_achievement_level(
    progress: &CustomerProgress,
    level: u8,
    checked: bool,
) -> Result<CustomerProgress, ProgressError> {
    let mut next = progress.clone();
    next.achievements = progress.achievements.check_level(level, checked)?;
    debug!(customer_id = %progress.customer_id, level, checked, "set achievement level");
    Ok(next)
}
