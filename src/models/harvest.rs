//! Harvest record model.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patch::nullable;
use super::validation::{require_non_negative, Validate, ValidationError};

/// Quality grade assigned to harvested leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeaGrade {
    Premium,
    High,
    Medium,
    Standard,
}

impl TeaGrade {
    pub const ALL: [TeaGrade; 4] = [
        TeaGrade::Premium,
        TeaGrade::High,
        TeaGrade::Medium,
        TeaGrade::Standard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeaGrade::Premium => "PREMIUM",
            TeaGrade::High => "HIGH",
            TeaGrade::Medium => "MEDIUM",
            TeaGrade::Standard => "STANDARD",
        }
    }
}

impl FromStr for TeaGrade {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PREMIUM" => Ok(TeaGrade::Premium),
            "HIGH" => Ok(TeaGrade::High),
            "MEDIUM" => Ok(TeaGrade::Medium),
            "STANDARD" => Ok(TeaGrade::Standard),
            other => Err(ValidationError::new(format!("Unknown tea grade: {}", other))),
        }
    }
}

impl fmt::Display for TeaGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf picked from a field on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestRecord {
    pub id: i64,
    pub field_id: i64,
    #[serde(default)]
    pub field_name: String,
    pub harvest_date: NaiveDate,
    pub quantity_kg: f64,
    pub tea_grade: TeaGrade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Request body for creating a new harvest record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHarvestRecordRequest {
    pub field_id: i64,
    pub harvest_date: NaiveDate,
    pub quantity_kg: f64,
    pub tea_grade: TeaGrade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for CreateHarvestRecordRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_negative(self.quantity_kg, "Quantity")
    }
}

/// Request body for updating an existing harvest record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHarvestRecordRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tea_grade: Option<TeaGrade>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl Validate for UpdateHarvestRecordRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(quantity) = self.quantity_kg {
            require_non_negative(quantity, "Quantity")?;
        }
        Ok(())
    }
}

/// Query parameters accepted by `GET /harvest-records`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestRecordSearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tea_grade: Option<TeaGrade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}
