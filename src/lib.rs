//! Tea farm operations backend and client.
//!
//! The server side is a REST backend with SQLite persistence and bearer-token
//! authentication. The [`client`] module talks to it and keeps per-entity state.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::Authenticator;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub authenticator: Arc<Authenticator>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let authenticator = state.authenticator.clone();

    // Routes behind the bearer token
    let protected_routes = Router::new()
        // Session
        .route("/auth/logout", post(api::logout))
        .route("/auth/me", get(api::me))
        // Dashboard
        .route("/dashboard/stats", get(api::get_dashboard_stats))
        // Fields
        .route("/fields", get(api::list_fields).post(api::create_field))
        .route(
            "/fields/{id}",
            get(api::get_field)
                .put(api::update_field)
                .delete(api::delete_field),
        )
        // Tasks
        .route("/tasks", get(api::list_tasks).post(api::create_task))
        .route(
            "/tasks/{id}",
            get(api::get_task)
                .put(api::update_task)
                .delete(api::delete_task),
        )
        // Harvest records
        .route(
            "/harvest-records",
            get(api::list_harvest_records).post(api::create_harvest_record),
        )
        .route(
            "/harvest-records/{id}",
            get(api::get_harvest_record)
                .put(api::update_harvest_record)
                .delete(api::delete_harvest_record),
        )
        // Weather observations
        .route(
            "/weather-observations",
            get(api::list_weather_observations).post(api::create_weather_observation),
        )
        .route(
            "/weather-observations/{id}",
            get(api::get_weather_observation)
                .put(api::update_weather_observation)
                .delete(api::delete_weather_observation),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::bearer_auth_layer(authenticator.clone(), req, next)
        }));

    let api_routes = Router::new()
        .route("/auth/login", post(api::login))
        .merge(protected_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
