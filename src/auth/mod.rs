//! Bearer-token authentication module.
//!
//! Issues HS256 JWTs for the configured accounts, verifies them on every protected
//! request and keeps a revocation list for logged-out tokens. Passwords are compared
//! in constant time to mitigate timing attacks.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse, Role, User};

/// Claims carried inside every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// User id
    pub uid: i64,
    pub role: Role,
    /// Unique token id, used for revocation
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user(&self) -> User {
        User {
            id: self.uid,
            username: self.sub.clone(),
            role: self.role,
        }
    }
}

struct Account {
    user: User,
    password: String,
}

/// Issues, verifies and revokes bearer tokens.
pub struct Authenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: i64,
    accounts: Vec<Account>,
    /// Revoked token ids mapped to their expiry.
    revoked: RwLock<HashMap<String, i64>>,
}

impl Authenticator {
    /// Build an authenticator with the built-in `admin` and `user` accounts.
    pub fn from_config(config: &Config) -> Self {
        let accounts = vec![
            Account {
                user: User {
                    id: 1,
                    username: "admin".to_string(),
                    role: Role::Admin,
                },
                password: config.admin_password.clone(),
            },
            Account {
                user: User {
                    id: 2,
                    username: "user".to_string(),
                    role: Role::Worker,
                },
                password: config.worker_password.clone(),
            },
        ];

        let secret = config.signing_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl_secs: i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX),
            accounts,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    /// Check credentials and issue a token.
    pub fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AppError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.user.username == request.username);

        let authenticated = match account {
            Some(account) => constant_time_compare(&request.password, &account.password),
            None => false,
        };

        let Some(account) = account.filter(|_| authenticated) else {
            tracing::warn!("Failed login attempt for user '{}'", request.username);
            return Err(AppError::InvalidCredentials);
        };

        let token = self.issue_token(&account.user)?;
        tracing::info!("User '{}' logged in", account.user.username);

        Ok(LoginResponse {
            token,
            user: account.user.clone(),
        })
    }

    /// Sign a new token for the given user.
    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.username.clone(),
            uid: user.id,
            role: user.role,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp: now.saturating_add(self.token_ttl_secs),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature, expiry and revocation status of a token.
    pub async fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;

        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(AppError::Unauthorized("Token has been revoked".to_string()));
        }

        Ok(claims)
    }

    /// Revoke a token until it would have expired anyway.
    pub async fn revoke(&self, claims: &Claims) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti.clone(), claims.exp);
    }
}

/// Bearer authentication layer function that takes the authenticator as a parameter.
///
/// On success the verified [`Claims`] are inserted into the request extensions.
pub async fn bearer_auth_layer(
    authenticator: Arc<Authenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return AppError::Unauthorized("Missing bearer token".to_string()).into_response();
    };

    match authenticator.verify(&token).await {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!("Rejected bearer token: {}", e);
            e.into_response()
        }
    }
}

/// Extract the bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
