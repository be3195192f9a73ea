//! HTTP client adapter.
//!
//! Attaches the stored bearer token to every request and unwraps the response
//! envelope. A 401 on a request that carried a token clears the stored credentials
//! and raises [`SessionSignal::LoginRequired`].

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;

use super::storage::{CredentialStore, FileCredentialStore};
use super::{ClientError, Result};
use crate::api::ApiResponse;
use crate::config::ClientConfig;
use crate::errors::ErrorResponse;

/// Session status as seen by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    Active,
    /// The server rejected the stored token; the user has to sign in again.
    LoginRequired,
}

/// Shared handle for talking to the REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    session: Arc<watch::Sender<SessionSignal>>,
}

impl ApiClient {
    /// `base_url` includes the `/api` prefix.
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        let (session, _rx) = watch::channel(SessionSignal::Active);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            session: Arc::new(session),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.api_url.clone(),
            Arc::new(FileCredentialStore::new(&config.credentials_path)),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Subscribe to session changes.
    pub fn session(&self) -> watch::Receiver<SessionSignal> {
        self.session.subscribe()
    }

    pub fn session_state(&self) -> SessionSignal {
        *self.session.borrow()
    }

    pub(crate) fn mark_active(&self) {
        self.session.send_replace(SessionSignal::Active);
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.request(Method::GET, path), true).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.request(Method::GET, path).query(query), true)
            .await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::POST, path).json(body), true)
            .await
    }

    /// POST without attaching the stored token.
    pub async fn post_public<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::POST, path).json(body), false)
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::PUT, path).json(body), true)
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(self.request(Method::DELETE, path), true).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        authenticated: bool,
    ) -> Result<T> {
        let token = if authenticated {
            self.credentials.load()?.map(|c| c.token)
        } else {
            None
        };
        let request = match &token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let envelope: ApiResponse<T> = response.json().await?;
            return Ok(envelope.data);
        }

        let body = response.json::<ErrorResponse>().await.ok();
        let (code, message) = match body {
            Some(body) => (Some(body.error.code), Some(body.error.message)),
            None => (None, None),
        };

        if status == StatusCode::UNAUTHORIZED && token.is_some() {
            tracing::warn!(
                "Stored token rejected ({}); clearing credentials",
                message.as_deref().unwrap_or("no message")
            );
            if let Err(e) = self.credentials.clear() {
                tracing::error!("Failed to clear stored credentials: {}", e);
            }
            self.session.send_replace(SessionSignal::LoginRequired);
            return Err(ClientError::Unauthorized { message });
        }

        tracing::debug!("Request failed with status {}", status);
        Err(ClientError::Server {
            status: status.as_u16(),
            code,
            message,
        })
    }
}
