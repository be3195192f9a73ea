//! Field model: a named, located plot of tea bushes.

use serde::{Deserialize, Serialize};

use super::patch::nullable;
use super::validation::{require_positive, require_text, Validate, ValidationError};

/// A cultivated field. Area is in hectares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub area_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Request body for creating a new field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFieldRequest {
    pub name: String,
    pub location: String,
    pub area_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for CreateFieldRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "Field name")?;
        require_text(&self.location, "Location")?;
        require_positive(self.area_size, "Area size")
    }
}

/// Request body for updating an existing field. Absent values keep their stored value;
/// an explicit `null` clears `soilType` or `notes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_size: Option<f64>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub soil_type: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl Validate for UpdateFieldRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text(name, "Field name")?;
        }
        if let Some(location) = &self.location {
            require_text(location, "Location")?;
        }
        if let Some(area_size) = self.area_size {
            require_positive(area_size, "Area size")?;
        }
        Ok(())
    }
}

/// Query parameters accepted by `GET /fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSearchParams {
    /// Case-insensitive substring of the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Case-insensitive substring of the location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Exact soil type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CreateFieldRequest {
        CreateFieldRequest {
            name: "North Terrace".to_string(),
            location: "Shizuoka".to_string(),
            area_size: 2.5,
            soil_type: None,
            notes: None,
        }
    }

    #[test]
    fn test_create_field_validation() {
        assert!(draft().validate().is_ok());

        let mut bad = draft();
        bad.area_size = 0.0;
        assert_eq!(
            bad.validate().unwrap_err().to_string(),
            "Area size must be a positive number"
        );

        let mut bad = draft();
        bad.location = " ".to_string();
        assert_eq!(bad.validate().unwrap_err().to_string(), "Location is required");
    }

    #[test]
    fn test_update_field_validates_only_present_values() {
        assert!(UpdateFieldRequest::default().validate().is_ok());

        let patch = UpdateFieldRequest {
            area_size: Some(-3.0),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_field_serializes_camel_case_and_skips_missing_options() {
        let field = Field {
            id: 7,
            name: "East".to_string(),
            location: "Hill".to_string(),
            area_size: 1.25,
            soil_type: None,
            notes: Some("terraced".to_string()),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["areaSize"], 1.25);
        assert!(value.get("soilType").is_none());
        assert_eq!(value["notes"], "terraced");
    }
}
