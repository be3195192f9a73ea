//! Authentication gate.
//!
//! `Anonymous -> Authenticating -> Authenticated | Failed`, and back to `Anonymous` on
//! logout or when the adapter reports that the stored token was rejected.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::http::{ApiClient, SessionSignal};
use super::storage::Credentials;
use super::Result;
use crate::models::{LoginRequest, LoginResponse, User, Validate};

/// Where the user stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated(User),
    /// Last login attempt was rejected; holds the message to show.
    Failed(String),
}

/// Tracks the signed-in user and owns the persisted credentials.
#[derive(Clone)]
pub struct AuthGate {
    api: ApiClient,
    state: Arc<RwLock<AuthState>>,
}

impl AuthGate {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(AuthState::Anonymous)),
        }
    }

    /// Current state. A rejected token observed by any request demotes
    /// `Authenticated` to `Anonymous`.
    pub async fn state(&self) -> AuthState {
        if self.api.session_state() == SessionSignal::LoginRequired {
            let mut state = self.state.write().await;
            if matches!(*state, AuthState::Authenticated(_)) {
                tracing::info!("Session expired; signed out");
                *state = AuthState::Anonymous;
            }
            return state.clone();
        }
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        match self.state().await {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user().await.is_some()
    }

    /// Cold start: confirm a persisted token with `GET /auth/me`.
    pub async fn restore(&self) -> Result<AuthState> {
        let stored = match self.api.credentials().load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Discarding unreadable stored credentials: {}", e);
                self.api.credentials().clear()?;
                None
            }
        };

        let Some(stored) = stored else {
            return Ok(self.set(AuthState::Anonymous).await);
        };

        self.set(AuthState::Authenticating).await;
        match self.api.get::<User>("/auth/me").await {
            Ok(user) => {
                self.api.credentials().save(&Credentials {
                    token: stored.token,
                    user: user.clone(),
                })?;
                self.api.mark_active();
                Ok(self.set(AuthState::Authenticated(user)).await)
            }
            Err(e) => {
                tracing::info!("Stored session is no longer valid: {}", e);
                self.api.credentials().clear()?;
                Ok(self.set(AuthState::Anonymous).await)
            }
        }
    }

    /// Sign in and persist the issued token.
    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        if let Err(e) = request.validate() {
            self.set(AuthState::Failed(e.0.clone())).await;
            return Err(e.into());
        }

        self.set(AuthState::Authenticating).await;
        let response = match self
            .api
            .post_public::<LoginResponse, _>("/auth/login", request)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.set(AuthState::Failed(e.display_message("Login failed")))
                    .await;
                return Err(e);
            }
        };

        if let Err(e) = self.api.credentials().save(&Credentials {
            token: response.token,
            user: response.user.clone(),
        }) {
            self.set(AuthState::Failed(e.display_message("Could not store credentials")))
                .await;
            return Err(e);
        }

        self.api.mark_active();
        self.set(AuthState::Authenticated(response.user.clone()))
            .await;
        tracing::info!("Signed in as '{}'", response.user.username);
        Ok(response.user)
    }

    /// Sign out. The server call is best effort; local credentials are always dropped.
    pub async fn logout(&self) -> Result<()> {
        if let Ok(Some(_)) = self.api.credentials().load() {
            if let Err(e) = self.api.post::<(), _>("/auth/logout", &()).await {
                tracing::warn!("Server logout failed: {}", e);
            }
        }

        let cleared = self.api.credentials().clear();
        self.set(AuthState::Anonymous).await;
        cleared
    }

    /// Leave `Failed` for `Anonymous`.
    pub async fn clear_error(&self) {
        let mut state = self.state.write().await;
        if matches!(*state, AuthState::Failed(_)) {
            *state = AuthState::Anonymous;
        }
    }

    async fn set(&self, next: AuthState) -> AuthState {
        *self.state.write().await = next.clone();
        next
    }
}
