//! Dashboard aggregate model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::TeaGrade;

/// Farm-wide totals plus figures for the current calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_fields: i64,
    /// Hectares.
    pub total_area: f64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub pending_tasks: i64,
    /// Kilograms, all time.
    pub total_harvest: f64,
    /// Kilograms, current month.
    pub monthly_harvest: f64,
    pub average_temperature: f64,
    pub total_rainfall: f64,
    pub average_humidity: f64,
    /// Kilograms per grade, all time. Every grade is present.
    pub harvest_by_grade: BTreeMap<TeaGrade, f64>,
}
