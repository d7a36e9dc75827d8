use serde::Serialize;

use super::calculator::{completed_round_count_upto, DEFAULT_MAX_ROUNDS};
use super::error::ProgressError;

/// Ordered round checklist for a clinical case. Round numbers are 1-based.
///
/// `rounds` always holds exactly `max_rounds` entries; the constructors are
/// the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundProgress {
    rounds: Vec<bool>,
    max_rounds: usize,
}

impl Default for RoundProgress {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROUNDS)
    }
}

impl RoundProgress {
    pub fn new(max_rounds: usize) -> Self {
        Self {
            rounds: vec![false; max_rounds],
            max_rounds,
        }
    }

    /// Build from a raw sequence; entries past `max_rounds` are dropped
    pub fn from_flags(flags: &[bool], max_rounds: usize) -> Self {
        let mut progress = Self::new(max_rounds);
        for (slot, done) in progress.rounds.iter_mut().zip(flags) {
            *slot = *done;
        }
        progress
    }

    /// Build from the round numbers that have recorded sessions (e.g. uploaded photos)
    pub fn from_round_numbers<I>(numbers: I, max_rounds: usize) -> Result<Self, ProgressError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut progress = Self::new(max_rounds);
        for round in numbers {
            progress.mark(round, true)?;
        }
        Ok(progress)
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    pub fn mark(&mut self, round: usize, done: bool) -> Result<(), ProgressError> {
        let max = self.max_rounds;
        let slot = round
            .checked_sub(1)
            .and_then(|i| self.rounds.get_mut(i))
            .ok_or(ProgressError::RoundOutOfRange { round, max })?;
        *slot = done;
        Ok(())
    }

    pub fn is_done(&self, round: usize) -> bool {
        round > 0 && self.rounds.get(round - 1).copied().unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        completed_round_count_upto(&self.rounds, self.max_rounds)
    }

    /// Dot states in display order, one per round
    pub fn dots(&self) -> &[bool] {
        &self.rounds
    }

    /// First round not yet done, if any
    pub fn next_round(&self) -> Option<usize> {
        self.rounds.iter().position(|done| !done).map(|i| i + 1)
    }
}
