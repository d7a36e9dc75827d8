//! Read-only progress metrics for list and dashboard views.

use serde::Serialize;

use super::model::CustomerProgress;
use super::stage::{StageKey, StagePayload};

/// Number of rounds a clinical case tracks unless configured otherwise
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Number of stages in the customer lifecycle
pub const STAGE_COUNT: usize = StageKey::ALL.len();

/// Count of completed rounds among the first `DEFAULT_MAX_ROUNDS` entries
pub fn completed_round_count(rounds: &[bool]) -> usize {
    completed_round_count_upto(rounds, DEFAULT_MAX_ROUNDS)
}

pub fn completed_round_count_upto(rounds: &[bool], max_rounds: usize) -> usize {
    rounds.iter().take(max_rounds).filter(|done| **done).count()
}

/// Stages whose payload satisfies the stage's own completion predicate
pub fn stage_completion_level(progress: &CustomerProgress) -> usize {
    stage_completion_level_with(progress, |_, payload| payload.is_complete())
}

/// Same as [`stage_completion_level`] with a caller-supplied predicate per stage
pub fn stage_completion_level_with<F>(progress: &CustomerProgress, is_complete: F) -> usize
where
    F: Fn(StageKey, &StagePayload) -> bool,
{
    progress
        .stage_data
        .iter()
        .filter(|(key, payload)| is_complete(*key, *payload))
        .count()
}

pub fn achievement_count(progress: &CustomerProgress) -> usize {
    progress.achievements.count()
}

/// Star level shown next to the customer name (0..=3)
pub fn achievement_level(progress: &CustomerProgress) -> u8 {
    progress.achievements.level()
}

pub fn completion_percent(progress: &CustomerProgress) -> f64 {
    stage_completion_level(progress) as f64 / STAGE_COUNT as f64 * 100.0
}

/// View model handed to the presentation layer alongside the aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub completed_stages: usize,
    pub total_stages: usize,
    pub started_stages: usize,
    pub completion_percent: f64,
    pub achievement_count: usize,
    pub achievement_level: u8,
    pub stages: Vec<StageStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageStatus {
    pub key: StageKey,
    pub started: bool,
    pub completed: bool,
}

impl ProgressSummary {
    pub fn of(progress: &CustomerProgress) -> Self {
        let stages = StageKey::ALL
            .iter()
            .map(|key| {
                let payload = progress.stage(*key);
                StageStatus {
                    key: *key,
                    started: payload.is_some(),
                    completed: payload.is_some_and(StagePayload::is_complete),
                }
            })
            .collect();

        Self {
            completed_stages: stage_completion_level(progress),
            total_stages: STAGE_COUNT,
            started_stages: progress.stage_data.len(),
            completion_percent: completion_percent(progress),
            achievement_count: achievement_count(progress),
            achievement_level: achievement_level(progress),
            stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::mutator::set_stage;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn counts_true_rounds() {
        let rounds = [true, true, false, true, false, false, false, false, false, false];
        assert_eq!(completed_round_count(&rounds), 3);
        assert_eq!(completed_round_count(&[]), 0);
        assert_eq!(completed_round_count(&[true; 10]), 10);
    }

    #[test]
    fn rounds_past_max_are_ignored() {
        let mut rounds = vec![false; 10];
        rounds.extend([true, true]);
        assert_eq!(completed_round_count(&rounds), 0);
        assert_eq!(completed_round_count_upto(&rounds, 12), 2);
    }

    fn two_of_six() -> CustomerProgress {
        let mut p = CustomerProgress::new(Uuid::new_v4());
        for (key, value) in [
            ("inflow", json!({"memo": "no source yet"})),
            ("contract", json!({"type": "deposit"})),
            ("delivery", json!({"type": "ship"})),
            ("educationNotes", json!({"understanding": "상"})),
            ("growth", json!({"personalLevel": 0})),
            ("expert", json!({"completed": true})),
        ] {
            p = set_stage(&p, key, Some(value)).unwrap();
        }
        p
    }

    #[test]
    fn level_counts_only_complete_stages() {
        let p = two_of_six();
        assert_eq!(p.stage_data.len(), 6);
        assert_eq!(stage_completion_level(&p), 2);
    }

    #[test]
    fn level_ignores_insertion_order() {
        let forward = two_of_six();
        let mut reverse = CustomerProgress::new(forward.customer_id);
        let entries: Vec<_> = forward.stage_data.iter().map(|(k, v)| (k, v.to_value().unwrap())).collect();
        for (key, value) in entries.into_iter().rev() {
            reverse = set_stage(&reverse, key.as_str(), Some(value)).unwrap();
        }
        assert_eq!(stage_completion_level(&reverse), 2);
        assert_eq!(reverse, forward);
    }

    #[test]
    fn custom_predicate() {
        let p = two_of_six();
        // treat any started stage as complete
        assert_eq!(stage_completion_level_with(&p, |_, _| true), 6);
        let only_expert = stage_completion_level_with(&p, |key, payload| {
            key == StageKey::Expert && payload.is_complete()
        });
        assert_eq!(only_expert, 1);
    }

    #[test]
    fn achievement_metrics() {
        let mut p = CustomerProgress::new(Uuid::new_v4());
        assert_eq!(achievement_count(&p), 0);
        p.achievements.basic_training = true;
        p.achievements.expert_course = true;
        assert_eq!(achievement_count(&p), 2);
        assert_eq!(achievement_level(&p), 3);
    }

    #[test]
    fn summary_reflects_progress() {
        let p = two_of_six();
        let s = ProgressSummary::of(&p);
        assert_eq!(s.completed_stages, 2);
        assert_eq!(s.total_stages, 6);
        assert_eq!(s.started_stages, 6);
        assert!((s.completion_percent - 100.0 / 3.0).abs() < 1e-9);
        let expert = s.stages.iter().find(|st| st.key == StageKey::Expert).unwrap();
        assert!(expert.started && expert.completed);
    }

    #[test]
    fn empty_summary() {
        let s = ProgressSummary::of(&CustomerProgress::new(Uuid::nil()));
        assert_eq!(s.completed_stages, 0);
        assert_eq!(s.completion_percent, 0.0);
        assert!(s.stages.iter().all(|st| !st.started && !st.completed));
    }
}
