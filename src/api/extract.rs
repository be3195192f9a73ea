//! Request extractors whose rejections render as the error envelope.
//!
//! Drop-in replacements for axum's `Json`, `Query` and `Path`. A body, query string or
//! path segment that fails to parse becomes `AppError::BadRequest`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::AppError;

/// JSON request body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

/// Query string parameters.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// Path parameters.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);
