//! Harvest record API endpoints.

use axum::extract::State;

use super::extract::{Json, Path, Query};
use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateHarvestRecordRequest, HarvestRecord, HarvestRecordSearchParams,
    UpdateHarvestRecordRequest, Validate,
};
use crate::AppState;

/// GET /api/harvest-records - List harvest records, optionally filtered.
pub async fn list_harvest_records(
    State(state): State<AppState>,
    Query(params): Query<HarvestRecordSearchParams>,
) -> ApiResult<Vec<HarvestRecord>> {
    match state.repo.list_harvest_records(&params).await {
        Ok(records) => success(records),
        Err(e) => error(e),
    }
}

/// GET /api/harvest-records/:id - Get a single harvest record.
pub async fn get_harvest_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<HarvestRecord> {
    match state.repo.get_harvest_record(id).await {
        Ok(Some(record)) => success(record),
        Ok(None) => error(AppError::NotFound(format!(
            "Harvest record {} not found",
            id
        ))),
        Err(e) => error(e),
    }
}

/// POST /api/harvest-records - Record a harvest.
pub async fn create_harvest_record(
    State(state): State<AppState>,
    Json(request): Json<CreateHarvestRecordRequest>,
) -> ApiResult<HarvestRecord> {
    if let Err(e) = request.validate() {
        return error(e.into());
    }

    match state.repo.create_harvest_record(&request).await {
        Ok(record) => success(record),
        Err(e) => error(e),
    }
}

/// PUT /api/harvest-records/:id - Update a harvest record.
pub async fn update_harvest_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateHarvestRecordRequest>,
) -> ApiResult<HarvestRecord> {
    if let Err(e) = request.validate() {
        return error(e.into());
    }

    match state.repo.update_harvest_record(id, &request).await {
        Ok(record) => success(record),
        Err(e) => error(e),
    }
}

/// DELETE /api/harvest-records/:id - Delete a harvest record.
pub async fn delete_harvest_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    match state.repo.delete_harvest_record(id).await {
        Ok(()) => success(()),
        Err(e) => error(e),
    }
}
