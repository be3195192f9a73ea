//! Field API endpoints.

use axum::extract::State;

use super::extract::{Json, Path, Query};
use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateFieldRequest, Field, FieldSearchParams, UpdateFieldRequest, Validate};
use crate::AppState;

/// GET /api/fields - List fields, optionally filtered.
pub async fn list_fields(
    State(state): State<AppState>,
    Query(params): Query<FieldSearchParams>,
) -> ApiResult<Vec<Field>> {
    match state.repo.list_fields(&params).await {
        Ok(fields) => success(fields),
        Err(e) => error(e),
    }
}

/// GET /api/fields/:id - Get a single field.
pub async fn get_field(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Field> {
    match state.repo.get_field(id).await {
        Ok(Some(field)) => success(field),
        Ok(None) => error(AppError::NotFound(format!("Field {} not found", id))),
        Err(e) => error(e),
    }
}

/// POST /api/fields - Create a new field.
pub async fn create_field(
    State(state): State<AppState>,
    Json(request): Json<CreateFieldRequest>,
) -> ApiResult<Field> {
    if let Err(e) = request.validate() {
        return error(e.into());
    }

    match state.repo.create_field(&request).await {
        Ok(field) => {
            tracing::debug!("Created field {} ({})", field.id, field.name);
            success(field)
        }
        Err(e) => error(e),
    }
}

/// PUT /api/fields/:id - Update a field.
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateFieldRequest>,
) -> ApiResult<Field> {
    if let Err(e) = request.validate() {
        return error(e.into());
    }

    match state.repo.update_field(id, &request).await {
        Ok(field) => success(field),
        Err(e) => error(e),
    }
}

/// DELETE /api/fields/:id - Delete a field and everything recorded on it.
pub async fn delete_field(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    match state.repo.delete_field(id).await {
        Ok(()) => {
            tracing::debug!("Deleted field {}", id);
            success(())
        }
        Err(e) => error(e),
    }
}
