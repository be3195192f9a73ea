//! Dashboard statistics view.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::http::ApiClient;
use super::Result;
use crate::models::DashboardStats;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub stats: Option<DashboardStats>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Holds the last fetched [`DashboardStats`].
#[derive(Clone)]
pub struct DashboardView {
    api: ApiClient,
    state: Arc<RwLock<DashboardState>>,
}

impl DashboardView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(DashboardState::default())),
        }
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn fetch(&self) -> Result<DashboardStats> {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.api.get::<DashboardStats>("/dashboard/stats").await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(stats) => {
                state.stats = Some(stats.clone());
                Ok(stats)
            }
            Err(e) => {
                state.error = Some(e.display_message("Failed to fetch dashboard statistics"));
                Err(e)
            }
        }
    }
}
