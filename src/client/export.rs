//! CSV export of the mirrored collections.
//!
//! Files are produced locally from slice data. Each carries a UTF-8 byte order mark so
//! spreadsheet applications pick the right encoding.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{Terminator, WriterBuilder};
use serde::Serialize;
use serde_json::Value;

use super::Result;
use crate::models::{Field, HarvestRecord, Task, WeatherObservation};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A CSV column: the JSON key to read and the header label to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

const FIELD_COLUMNS: &[Column] = &[
    Column::new("name", "Field name"),
    Column::new("location", "Location"),
    Column::new("areaSize", "Area (ha)"),
    Column::new("soilType", "Soil type"),
    Column::new("notes", "Notes"),
];

const TASK_COLUMNS: &[Column] = &[
    Column::new("fieldName", "Field"),
    Column::new("taskType", "Task type"),
    Column::new("assignedWorker", "Assigned worker"),
    Column::new("startDate", "Start date"),
    Column::new("endDate", "End date"),
    Column::new("status", "Status"),
    Column::new("notes", "Notes"),
];

const HARVEST_COLUMNS: &[Column] = &[
    Column::new("fieldName", "Field"),
    Column::new("harvestDate", "Harvest date"),
    Column::new("quantityKg", "Quantity (kg)"),
    Column::new("teaGrade", "Tea grade"),
    Column::new("notes", "Notes"),
];

const WEATHER_COLUMNS: &[Column] = &[
    Column::new("fieldName", "Field"),
    Column::new("date", "Date"),
    Column::new("temperature", "Temperature (°C)"),
    Column::new("rainfall", "Rainfall (mm)"),
    Column::new("humidity", "Humidity (%)"),
    Column::new("pestsSeen", "Pests seen"),
    Column::new("notes", "Notes"),
];

/// Render rows as CSV: a header line of labels, then one line per row.
///
/// Lines are joined by `\n` with no trailing newline. Missing keys and nulls are empty.
pub fn generate_csv<T: Serialize>(rows: &[T], columns: &[Column]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.label))?;
    for row in rows {
        let value = serde_json::to_value(row)?;
        writer.write_record(columns.iter().map(|c| cell(value.get(c.key))))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) => f.to_string(),
            (None, None) => n.to_string(),
        },
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// A generated file: name plus BOM-prefixed contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl CsvExport {
    pub fn new(filename: impl Into<String>, content: &str) -> Self {
        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + content.len());
        bytes.extend_from_slice(UTF8_BOM);
        bytes.extend_from_slice(content.as_bytes());
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Save into `dir`, creating it if needed. Returns the written path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)?;
        tracing::info!("Exported {}", path.display());
        Ok(path)
    }
}

fn export<T: Serialize>(
    prefix: &str,
    rows: &[T],
    columns: &[Column],
    day: NaiveDate,
) -> Result<CsvExport> {
    let content = generate_csv(rows, columns)?;
    Ok(CsvExport::new(
        format!("{}_{}.csv", prefix, day.format("%Y-%m-%d")),
        &content,
    ))
}

pub fn export_fields(fields: &[Field], day: NaiveDate) -> Result<CsvExport> {
    export("fields", fields, FIELD_COLUMNS, day)
}

pub fn export_tasks(tasks: &[Task], day: NaiveDate) -> Result<CsvExport> {
    export("tasks", tasks, TASK_COLUMNS, day)
}

pub fn export_harvest_records(records: &[HarvestRecord], day: NaiveDate) -> Result<CsvExport> {
    export("harvest_records", records, HARVEST_COLUMNS, day)
}

pub fn export_weather_observations(
    observations: &[WeatherObservation],
    day: NaiveDate,
) -> Result<CsvExport> {
    export("weather_observations", observations, WEATHER_COLUMNS, day)
}

/// All four exports, in the order fields, tasks, harvest records, weather observations.
pub fn export_all(
    fields: &[Field],
    tasks: &[Task],
    harvest_records: &[HarvestRecord],
    weather_observations: &[WeatherObservation],
    day: NaiveDate,
) -> Result<Vec<CsvExport>> {
    Ok(vec![
        export_fields(fields, day)?,
        export_tasks(tasks, day)?,
        export_harvest_records(harvest_records, day)?,
        export_weather_observations(weather_observations, day)?,
    ])
}
