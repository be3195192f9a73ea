//! The application state container.

use chrono::NaiveDate;
use tokio::sync::watch;

use super::auth::AuthGate;
use super::dashboard::DashboardView;
use super::export::{export_all, CsvExport};
use super::http::{ApiClient, SessionSignal};
use super::slice::EntitySlice;
use super::Result;
use crate::config::ClientConfig;
use crate::models::{Field, HarvestRecord, Task, WeatherObservation};

/// Owns the adapter and every typed sub-container. Clones share state.
#[derive(Clone)]
pub struct AppStore {
    api: ApiClient,
    auth: AuthGate,
    fields: EntitySlice<Field>,
    tasks: EntitySlice<Task>,
    harvest_records: EntitySlice<HarvestRecord>,
    weather_observations: EntitySlice<WeatherObservation>,
    dashboard: DashboardView,
}

impl AppStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            auth: AuthGate::new(api.clone()),
            fields: EntitySlice::new(api.clone()),
            tasks: EntitySlice::new(api.clone()),
            harvest_records: EntitySlice::new(api.clone()),
            weather_observations: EntitySlice::new(api.clone()),
            dashboard: DashboardView::new(api.clone()),
            api,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(ApiClient::from_config(config))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Fires [`SessionSignal::LoginRequired`] when any request hits an expired session.
    pub fn session(&self) -> watch::Receiver<SessionSignal> {
        self.api.session()
    }

    pub fn auth(&self) -> &AuthGate {
        &self.auth
    }

    pub fn fields(&self) -> &EntitySlice<Field> {
        &self.fields
    }

    pub fn tasks(&self) -> &EntitySlice<Task> {
        &self.tasks
    }

    pub fn harvest_records(&self) -> &EntitySlice<HarvestRecord> {
        &self.harvest_records
    }

    pub fn weather_observations(&self) -> &EntitySlice<WeatherObservation> {
        &self.weather_observations
    }

    pub fn dashboard(&self) -> &DashboardView {
        &self.dashboard
    }

    /// CSV files for whatever the four slices currently hold.
    pub async fn export_all(&self, day: NaiveDate) -> Result<Vec<CsvExport>> {
        let fields = self.fields.snapshot().await;
        let tasks = self.tasks.snapshot().await;
        let harvest_records = self.harvest_records.snapshot().await;
        let weather_observations = self.weather_observations.snapshot().await;

        export_all(
            &fields.items,
            &tasks.items,
            &harvest_records.items,
            &weather_observations.items,
            day,
        )
    }
}
