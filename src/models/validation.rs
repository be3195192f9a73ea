//! Input validation shared by the server handlers and the client slices.

use chrono::NaiveDate;

/// A human-readable reason an input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Implemented by every create and update payload.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn require_text(value: &str, label: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!("{} is required", label)));
    }
    Ok(())
}

pub(crate) fn require_positive(value: f64, label: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(format!(
            "{} must be a positive number",
            label
        )));
    }
    Ok(())
}

pub(crate) fn require_non_negative(value: f64, label: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(format!("{} must not be negative", label)));
    }
    Ok(())
}

pub(crate) fn require_finite(value: f64, label: &str) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(format!("{} must be a number", label)));
    }
    Ok(())
}

pub(crate) fn require_range(
    value: f64,
    min: f64,
    max: f64,
    label: &str,
) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::new(format!(
            "{} must be between {} and {}",
            label, min, max
        )));
    }
    Ok(())
}

pub(crate) fn require_date_order(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::new(
            "End date must not be before start date",
        ));
    }
    Ok(())
}
