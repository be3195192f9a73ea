//! Typed client for the tea farm REST API.
//!
//! [`AppStore`] is the single state container. It owns one [`ApiClient`] and hands out
//! typed sub-containers: the [`AuthGate`], one [`EntitySlice`] per collection and the
//! [`DashboardView`]. Every request goes through the adapter, so bearer tokens and
//! 401 handling apply uniformly.

mod auth;
mod dashboard;
mod export;
mod http;
mod resources;
mod slice;
mod storage;
mod store;

pub use auth::{AuthGate, AuthState};
pub use dashboard::{DashboardState, DashboardView};
pub use export::{
    export_all, export_fields, export_harvest_records, export_tasks,
    export_weather_observations, generate_csv, Column, CsvExport, UTF8_BOM,
};
pub use http::{ApiClient, SessionSignal};
pub use slice::{EntitySlice, Resource, SliceState};
pub use storage::{CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore};
pub use store::AppStore;

use thiserror::Error;

use crate::models::ValidationError;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur in client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or decoding failure
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    /// An authenticated request was rejected; stored credentials have been cleared
    #[error("Login required: {}", .message.as_deref().unwrap_or("session expired"))]
    Unauthorized { message: Option<String> },

    /// Input rejected before it was sent
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ClientError {
    /// The message shown to the user: the server's own message or validation text when
    /// there is one, otherwise `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Server {
                message: Some(message),
                ..
            }
            | ClientError::Unauthorized {
                message: Some(message),
            } if !message.trim().is_empty() => message.clone(),
            ClientError::Validation(err) => err.0.clone(),
            _ => fallback.to_string(),
        }
    }

    /// HTTP status of a server-side failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
