//! Weather observation API endpoints.

use axum::extract::State;

use super::extract::{Json, Path, Query};
use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateWeatherObservationRequest, UpdateWeatherObservationRequest, Validate,
    WeatherObservation, WeatherObservationSearchParams,
};
use crate::AppState;

/// GET /api/weather-observations - List observations, optionally filtered.
pub async fn list_weather_observations(
    State(state): State<AppState>,
    Query(params): Query<WeatherObservationSearchParams>,
) -> ApiResult<Vec<WeatherObservation>> {
    match state.repo.list_weather_observations(&params).await {
        Ok(observations) => success(observations),
        Err(e) => error(e),
    }
}

/// GET /api/weather-observations/:id - Get a single observation.
pub async fn get_weather_observation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<WeatherObservation> {
    match state.repo.get_weather_observation(id).await {
        Ok(Some(observation)) => success(observation),
        Ok(None) => error(AppError::NotFound(format!(
            "Weather observation {} not found",
            id
        ))),
        Err(e) => error(e),
    }
}

/// POST /api/weather-observations - Record an observation.
pub async fn create_weather_observation(
    State(state): State<AppState>,
    Json(request): Json<CreateWeatherObservationRequest>,
) -> ApiResult<WeatherObservation> {
    if let Err(e) = request.validate() {
        return error(e.into());
    }

    match state.repo.create_weather_observation(&request).await {
        Ok(observation) => success(observation),
        Err(e) => error(e),
    }
}

/// PUT /api/weather-observations/:id - Update an observation.
pub async fn update_weather_observation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateWeatherObservationRequest>,
) -> ApiResult<WeatherObservation> {
    if let Err(e) = request.validate() {
        return error(e.into());
    }

    match state.repo.update_weather_observation(id, &request).await {
        Ok(observation) => success(observation),
        Err(e) => error(e),
    }
}

/// DELETE /api/weather-observations/:id - Delete an observation.
pub async fn delete_weather_observation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    match state.repo.delete_weather_observation(id).await {
        Ok(()) => success(()),
        Err(e) => error(e),
    }
}
