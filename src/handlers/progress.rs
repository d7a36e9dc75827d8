use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult};
use crate::progress::{CustomerProgress, ProgressSummary};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProgressView {
    pub progress: CustomerProgress,
    pub summary: ProgressSummary,
}

impl From<CustomerProgress> for ProgressView {
    fn from(progress: CustomerProgress) -> Self {
        let summary = ProgressSummary::of(&progress);
        Self { progress, summary }
    }
}

/// Body of PUT .../stages/:stage. A missing or null value clears the stage.
#[derive(Debug, Deserialize)]
pub struct StageBody {
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct MemoBody {
    pub memo: Option<String>,
}

/// Body of PUT .../achievements: the star checkbox that was clicked and its new state
#[derive(Debug, Deserialize)]
pub struct LevelBody {
    pub level: u8,
    pub checked: bool,
}

/// GET /api/customers/:id/progress
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<ProgressView> {
    let progress = state.progress.get_progress(id).await?;
    Ok(ApiResponse::success(progress.into()))
}

/// PUT /api/customers/:id/progress/stages/:stage - Replace one stage's payload
pub async fn stage_put(
    State(state): State<AppState>,
    Path((id, stage)): Path<(Uuid, String)>,
    Json(body): Json<StageBody>,
) -> ApiResult<ProgressView> {
    let progress = state.progress.set_stage(id, &stage, body.value).await?;
    Ok(ApiResponse::success(progress.into()))
}

/// DELETE /api/customers/:id/progress/stages/:stage - Revert a stage to not started
pub async fn stage_delete(
    State(state): State<AppState>,
    Path((id, stage)): Path<(Uuid, String)>,
) -> ApiResult<ProgressView> {
    let progress = state.progress.set_stage(id, &stage, None).await?;
    Ok(ApiResponse::success(progress.into()))
}

/// PATCH /api/customers/:id/progress/stages/:stage/memo - Change only the memo
pub async fn memo_patch(
    State(state): State<AppState>,
    Path((id, stage)): Path<(Uuid, String)>,
    Json(body): Json<MemoBody>,
) -> ApiResult<ProgressView> {
    let progress = state.progress.set_stage_memo(id, &stage, body.memo).await?;
    Ok(ApiResponse::success(progress.into()))
}

/// POST /api/customers/:id/progress/achievements/:flag/toggle
pub async fn achievement_toggle(
    State(state): State<AppState>,
    Path((id, flag)): Path<(Uuid, String)>,
) -> ApiResult<ProgressView> {
    let progress = state.progress.toggle_achievement(id, &flag).await?;
    Ok(ApiResponse::success(progress.into()))
}

/// PUT /api/customers/:id/progress/achievements - Check or uncheck a star with cascade
pub async fn achievement_level(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<LevelBody>,
) -> ApiResult<ProgressView> {
    let progress = state.progress.set_achievement_level(id, body.level, body.checked).await?;
    Ok(ApiResponse::success(progress.into()))
}
