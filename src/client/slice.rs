//! Generic entity state slice.
//!
//! An [`EntitySlice`] mirrors one REST collection: the last fetched `items`, the
//! `current` record, a `loading` flag and the last error message. The state lock is
//! taken only to apply a transition and never held across a request, so concurrent
//! operations on one slice race and the last one to finish wins.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use super::http::ApiClient;
use super::{ClientError, Result};
use crate::models::Validate;

/// A REST collection the client can mirror.
pub trait Resource: Clone + fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    /// Create body.
    type Draft: Serialize + Validate + Send + Sync;
    /// Partial update body.
    type Patch: Serialize + Validate + Send + Sync;
    /// Query parameters for listing.
    type Filter: Serialize + Default + Send + Sync;

    /// Collection path below the API root, e.g. `/fields`.
    const PATH: &'static str;
    /// Singular noun used in messages, e.g. `field`.
    const NOUN: &'static str;
    /// Plural noun used in messages, e.g. `fields`.
    const PLURAL: &'static str;

    fn id(&self) -> i64;
}

/// Observable state of one slice.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceState<R> {
    pub items: Vec<R>,
    pub current: Option<R>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<R> Default for SliceState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            loading: false,
            error: None,
        }
    }
}

/// State container for one entity collection.
pub struct EntitySlice<R: Resource> {
    api: ApiClient,
    state: Arc<RwLock<SliceState<R>>>,
}

impl<R: Resource> Clone for EntitySlice<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
        }
    }
}

impl<R: Resource> EntitySlice<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(SliceState::default())),
        }
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> SliceState<R> {
        self.state.read().await.clone()
    }

    /// Replace `items` with the server's listing.
    pub async fn fetch(&self, filter: &R::Filter) -> Result<Vec<R>> {
        self.begin().await;

        match self.api.get_with_query::<Vec<R>, _>(R::PATH, filter).await {
            Ok(items) => {
                let mut state = self.state.write().await;
                state.items = items.clone();
                state.loading = false;
                Ok(items)
            }
            Err(e) => Err(self.fail(e, format!("Failed to fetch {}", R::PLURAL)).await),
        }
    }

    /// Load one record into `current`.
    pub async fn fetch_by_id(&self, id: i64) -> Result<R> {
        self.begin().await;

        match self.api.get::<R>(&item_path::<R>(id)).await {
            Ok(item) => {
                let mut state = self.state.write().await;
                state.current = Some(item.clone());
                state.loading = false;
                Ok(item)
            }
            Err(e) => Err(self.fail(e, format!("Failed to fetch {}", R::NOUN)).await),
        }
    }

    /// Create a record and append it to `items`.
    pub async fn create(&self, draft: &R::Draft) -> Result<R> {
        self.check(draft).await?;
        self.begin().await;

        match self.api.post::<R, _>(R::PATH, draft).await {
            Ok(item) => {
                let mut state = self.state.write().await;
                state.items.push(item.clone());
                state.loading = false;
                Ok(item)
            }
            Err(e) => Err(self.fail(e, format!("Failed to create {}", R::NOUN)).await),
        }
    }

    /// Update a record and replace its copy in `items` and `current`.
    pub async fn update(&self, id: i64, patch: &R::Patch) -> Result<R> {
        self.check(patch).await?;
        self.begin().await;

        match self.api.put::<R, _>(&item_path::<R>(id), patch).await {
            Ok(item) => {
                let mut state = self.state.write().await;
                if let Some(slot) = state.items.iter_mut().find(|i| i.id() == item.id()) {
                    *slot = item.clone();
                }
                if state.current.as_ref().map(R::id) == Some(item.id()) {
                    state.current = Some(item.clone());
                }
                state.loading = false;
                Ok(item)
            }
            Err(e) => Err(self.fail(e, format!("Failed to update {}", R::NOUN)).await),
        }
    }

    /// Delete a record and drop it from `items` and `current`.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.begin().await;

        match self.api.delete(&item_path::<R>(id)).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.items.retain(|i| i.id() != id);
                if state.current.as_ref().map(R::id) == Some(id) {
                    state.current = None;
                }
                state.loading = false;
                Ok(())
            }
            Err(e) => Err(self.fail(e, format!("Failed to delete {}", R::NOUN)).await),
        }
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    pub async fn clear_current(&self) {
        self.state.write().await.current = None;
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
    }

    async fn check<V: Validate>(&self, input: &V) -> Result<()> {
        if let Err(e) = input.validate() {
            self.state.write().await.error = Some(e.0.clone());
            return Err(e.into());
        }
        Ok(())
    }

    async fn fail(&self, err: ClientError, fallback: String) -> ClientError {
        let message = err.display_message(&fallback);
        tracing::debug!("{} ({})", message, err);

        let mut state = self.state.write().await;
        state.loading = false;
        state.error = Some(message);
        err
    }
}

fn item_path<R: Resource>(id: i64) -> String {
    format!("{}/{}", R::PATH, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::client::MemoryCredentialStore;
    use crate::models::{CreateFieldRequest, Field};

    fn offline_slice() -> EntitySlice<Field> {
        // Nothing listens on port 9; requests fail at the transport level.
        let api = ApiClient::new(
            "http://127.0.0.1:9/api",
            Arc::new(MemoryCredentialStore::new()),
        );
        EntitySlice::new(api)
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let slice = offline_slice();
        let draft = CreateFieldRequest {
            name: "Terrace".to_string(),
            location: " ".to_string(),
            area_size: 1.0,
            soil_type: None,
            notes: None,
        };

        let err = slice.create(&draft).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let state = slice.snapshot().await;
        assert_eq!(state.error.as_deref(), Some("Location is required"));
        assert!(!state.loading);
        assert!(state.items.is_empty());

        slice.clear_error().await;
        assert!(slice.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_uses_default_message() {
        let slice = offline_slice();

        let err = slice.fetch(&Default::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));

        let state = slice.snapshot().await;
        assert_eq!(state.error.as_deref(), Some("Failed to fetch fields"));
        assert!(!state.loading);
    }
}
