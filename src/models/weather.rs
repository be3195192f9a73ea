//! Weather observation model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patch::nullable;
use super::validation::{
    require_finite, require_non_negative, require_range, Validate, ValidationError,
};

/// Daily conditions recorded at a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservation {
    pub id: i64,
    pub field_id: i64,
    #[serde(default)]
    pub field_name: String,
    pub date: NaiveDate,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Millimetres.
    pub rainfall: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pests_seen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Request body for creating a new weather observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWeatherObservationRequest {
    pub field_id: i64,
    pub date: NaiveDate,
    pub temperature: f64,
    pub rainfall: f64,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pests_seen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for CreateWeatherObservationRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_finite(self.temperature, "Temperature")?;
        require_non_negative(self.rainfall, "Rainfall")?;
        require_range(self.humidity, 0.0, 100.0, "Humidity")
    }
}

/// Request body for updating an existing weather observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWeatherObservationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub pests_seen: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl Validate for UpdateWeatherObservationRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(temperature) = self.temperature {
            require_finite(temperature, "Temperature")?;
        }
        if let Some(rainfall) = self.rainfall {
            require_non_negative(rainfall, "Rainfall")?;
        }
        if let Some(humidity) = self.humidity {
            require_range(humidity, 0.0, 100.0, "Humidity")?;
        }
        Ok(())
    }
}

/// Query parameters accepted by `GET /weather-observations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservationSearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}
