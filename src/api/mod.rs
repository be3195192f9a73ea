//! REST API module.
//!
//! Contains all API routes and handlers. Every response is wrapped in the
//! `{ success, data }` / `{ success, error }` envelope.

mod auth;
mod dashboard;
mod extract;
mod fields;
mod harvest_records;
mod tasks;
mod weather_observations;

pub use auth::*;
pub use dashboard::*;
pub use fields::*;
pub use harvest_records::*;
pub use tasks::*;
pub use weather_observations::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError) -> ApiResult<T> {
    Err(err)
}
