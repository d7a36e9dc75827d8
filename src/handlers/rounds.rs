use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::middleware::{ApiResponse, ApiResult};
use crate::progress::{ProgressError, RoundProgress};
use crate::state::AppState;

/// Either the raw checklist or the round numbers that have recorded sessions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundsBody {
    #[serde(default)]
    pub rounds: Vec<bool>,
    #[serde(default)]
    pub completed_rounds: Option<Vec<usize>>,
}

impl RoundsBody {
    pub fn into_progress(self, max_rounds: usize) -> Result<RoundProgress, ProgressError> {
        match self.completed_rounds {
            Some(numbers) => RoundProgress::from_round_numbers(numbers, max_rounds),
            None => Ok(RoundProgress::from_flags(&self.rounds, max_rounds)),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundsSummary {
    pub completed: usize,
    pub max_rounds: usize,
    pub dots: Vec<bool>,
    pub next_round: Option<usize>,
}

impl RoundsSummary {
    pub fn of(rounds: &RoundProgress) -> Self {
        Self {
            completed: rounds.completed_count(),
            max_rounds: rounds.max_rounds(),
            dots: rounds.dots().to_vec(),
            next_round: rounds.next_round(),
        }
    }
}

/// POST /api/rounds/summary - Dot indicator data for a case's round checklist
pub async fn summary(State(state): State<AppState>, Json(body): Json<RoundsBody>) -> ApiResult<RoundsSummary> {
    let rounds = body.into_progress(state.config.progress.max_rounds)?;
    Ok(ApiResponse::success(RoundsSummary::of(&rounds)))
}
