use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::database::models::customer::{CustomerFilter, CustomerStats, NewCustomer};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::CustomerOverview;
use crate::state::AppState;

/// POST /api/customers - Create a customer and its empty progress record
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewCustomer>,
) -> ApiResult<CustomerOverview> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let created = state.progress.create_customer(payload).await?;
    Ok(ApiResponse::created(created))
}

/// GET /api/customers/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<CustomerOverview> {
    Ok(ApiResponse::success(state.progress.get_customer(id).await?))
}

/// DELETE /api/customers/:id - Also removes the customer's progress
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    state.progress.delete_customer(id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /api/kols/:kol_id/customers?status=&region= - Newest first
pub async fn list(
    State(state): State<AppState>,
    Path(kol_id): Path<Uuid>,
    Query(filter): Query<CustomerFilter>,
) -> ApiResult<Vec<CustomerOverview>> {
    Ok(ApiResponse::success(state.progress.list_customers(kol_id, &filter).await?))
}

/// GET /api/kols/:kol_id/customers/stats
pub async fn stats(State(state): State<AppState>, Path(kol_id): Path<Uuid>) -> ApiResult<CustomerStats> {
    Ok(ApiResponse::success(state.progress.customer_stats(kol_id).await?))
}
