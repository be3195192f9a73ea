//! Database repository for CRUD operations.
//!
//! Listings are ordered by id so repeated reads of unchanged data come back identical.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateFieldRequest, CreateHarvestRecordRequest, CreateTaskRequest,
    CreateWeatherObservationRequest, DashboardStats, Field, FieldSearchParams, HarvestRecord,
    HarvestRecordSearchParams, Task, TaskSearchParams, TaskStatus, TeaGrade,
    UpdateFieldRequest, UpdateHarvestRecordRequest, UpdateTaskRequest,
    UpdateWeatherObservationRequest, ValidationError, WeatherObservation,
    WeatherObservationSearchParams, merge_nullable,
};

const FIELD_SELECT: &str = "SELECT id, name, location, area_size, soil_type, notes, created_at, updated_at FROM fields";

const TASK_SELECT: &str = r#"SELECT t.id, t.field_id, f.name AS field_name, t.task_type,
       t.assigned_worker, t.start_date, t.end_date, t.status, t.notes,
       t.created_at, t.updated_at
FROM tasks t JOIN fields f ON f.id = t.field_id"#;

const HARVEST_SELECT: &str = r#"SELECT h.id, h.field_id, f.name AS field_name, h.harvest_date,
       h.quantity_kg, h.tea_grade, h.notes, h.created_at, h.updated_at
FROM harvest_records h JOIN fields f ON f.id = h.field_id"#;

const WEATHER_SELECT: &str = r#"SELECT w.id, w.field_id, f.name AS field_name, w.date,
       w.temperature, w.rainfall, w.humidity, w.pests_seen, w.notes,
       w.created_at, w.updated_at
FROM weather_observations w JOIN fields f ON f.id = w.field_id"#;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fail with a validation error unless the referenced field exists.
    async fn ensure_field_exists(&self, field_id: i64) -> Result<(), AppError> {
        let row = sqlx::query("SELECT 1 FROM fields WHERE id = ?")
            .bind(field_id)
            .fetch_optional(&self.pool)
            .await?;

        if row.is_none() {
            return Err(AppError::Validation(format!(
                "Field {} does not exist",
                field_id
            )));
        }
        Ok(())
    }

    // ==================== FIELD OPERATIONS ====================

    /// List fields matching the search parameters.
    pub async fn list_fields(&self, params: &FieldSearchParams) -> Result<Vec<Field>, AppError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(FIELD_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(name) = non_blank(&params.name) {
            query
                .push(" AND name LIKE ")
                .push_bind(like_pattern(name))
                .push(" ESCAPE '\\'");
        }
        if let Some(location) = non_blank(&params.location) {
            query
                .push(" AND location LIKE ")
                .push_bind(like_pattern(location))
                .push(" ESCAPE '\\'");
        }
        if let Some(soil_type) = non_blank(&params.soil_type) {
            query.push(" AND soil_type = ").push_bind(soil_type.to_string());
        }
        query.push(" ORDER BY id");

        let rows = query.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(field_from_row).collect::<Result<_, _>>()?)
    }

    /// Get a field by ID.
    pub async fn get_field(&self, id: i64) -> Result<Option<Field>, AppError> {
        let sql = format!("{} WHERE id = ?", FIELD_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(field_from_row).transpose()?)
    }

    /// Create a new field.
    pub async fn create_field(&self, request: &CreateFieldRequest) -> Result<Field, AppError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO fields (name, location, area_size, soil_type, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&request.name)
        .bind(&request.location)
        .bind(request.area_size)
        .bind(&request.soil_type)
        .bind(&request.notes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Field {
            id: result.last_insert_rowid(),
            name: request.name.clone(),
            location: request.location.clone(),
            area_size: request.area_size,
            soil_type: request.soil_type.clone(),
            notes: request.notes.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Apply a partial update to a field.
    pub async fn update_field(
        &self,
        id: i64,
        request: &UpdateFieldRequest,
    ) -> Result<Field, AppError> {
        let existing = self
            .get_field(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Field {} not found", id)))?;

        let now = Utc::now().to_rfc3339();
        let name = request.name.clone().unwrap_or(existing.name);
        let location = request.location.clone().unwrap_or(existing.location);
        let area_size = request.area_size.unwrap_or(existing.area_size);
        let soil_type = merge_nullable(&request.soil_type, existing.soil_type);
        let notes = merge_nullable(&request.notes, existing.notes);

        sqlx::query(
            "UPDATE fields SET name = ?, location = ?, area_size = ?, soil_type = ?, notes = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&name)
        .bind(&location)
        .bind(area_size)
        .bind(&soil_type)
        .bind(&notes)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Field {
            id,
            name,
            location,
            area_size,
            soil_type,
            notes,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a field together with its tasks, harvest records and observations.
    pub async fn delete_field(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM fields WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Field {} not found", id)));
        }
        Ok(())
    }

    // ==================== TASK OPERATIONS ====================

    /// List tasks matching the search parameters.
    pub async fn list_tasks(&self, params: &TaskSearchParams) -> Result<Vec<Task>, AppError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(TASK_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(field_id) = params.field_id {
            query.push(" AND t.field_id = ").push_bind(field_id);
        }
        if let Some(task_type) = params.task_type {
            query.push(" AND t.task_type = ").push_bind(task_type.as_str());
        }
        if let Some(status) = params.status {
            query.push(" AND t.status = ").push_bind(status.as_str());
        }
        if let Some(worker) = non_blank(&params.assigned_worker) {
            query
                .push(" AND t.assigned_worker LIKE ")
                .push_bind(like_pattern(worker))
                .push(" ESCAPE '\\'");
        }
        if let Some(start) = params.start_date {
            query.push(" AND t.start_date >= ").push_bind(start);
        }
        if let Some(end) = params.end_date {
            query.push(" AND t.start_date <= ").push_bind(end);
        }
        query.push(" ORDER BY t.id");

        let rows = query.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(task_from_row).collect::<Result<_, _>>()?)
    }

    /// Get a task by ID.
    pub async fn get_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        let sql = format!("{} WHERE t.id = ?", TASK_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(task_from_row).transpose()?)
    }

    /// Create a new task on an existing field.
    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, AppError> {
        self.ensure_field_exists(request.field_id).await?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO tasks (field_id, task_type, assigned_worker, start_date, end_date, status, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(request.field_id)
        .bind(request.task_type.as_str())
        .bind(&request.assigned_worker)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.status.as_str())
        .bind(&request.notes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.load_created(self.get_task(result.last_insert_rowid()).await?, "task")
    }

    /// Apply a partial update to a task.
    pub async fn update_task(&self, id: i64, request: &UpdateTaskRequest) -> Result<Task, AppError> {
        let existing = self
            .get_task(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

        let field_id = request.field_id.unwrap_or(existing.field_id);
        if field_id != existing.field_id {
            self.ensure_field_exists(field_id).await?;
        }

        let start_date = request.start_date.unwrap_or(existing.start_date);
        let end_date = request.end_date.unwrap_or(existing.end_date);
        if end_date < start_date {
            return Err(AppError::Validation(
                "End date must not be before start date".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE tasks SET field_id = ?, task_type = ?, assigned_worker = ?, start_date = ?, end_date = ?, status = ?, notes = ?, updated_at = ? WHERE id = ?"
        )
        .bind(field_id)
        .bind(request.task_type.unwrap_or(existing.task_type).as_str())
        .bind(request.assigned_worker.as_ref().unwrap_or(&existing.assigned_worker))
        .bind(start_date)
        .bind(end_date)
        .bind(request.status.unwrap_or(existing.status).as_str())
        .bind(merge_nullable(&request.notes, existing.notes))
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_task(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))
    }

    /// Delete a task.
    pub async fn delete_task(&self, id: i64) -> Result<(), AppError> {
        self.delete_row("tasks", "Task", id).await
    }

    // ==================== HARVEST RECORD OPERATIONS ====================

    /// List harvest records matching the search parameters.
    pub async fn list_harvest_records(
        &self,
        params: &HarvestRecordSearchParams,
    ) -> Result<Vec<HarvestRecord>, AppError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(HARVEST_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(field_id) = params.field_id {
            query.push(" AND h.field_id = ").push_bind(field_id);
        }
        if let Some(grade) = params.tea_grade {
            query.push(" AND h.tea_grade = ").push_bind(grade.as_str());
        }
        if let Some(start) = params.start_date {
            query.push(" AND h.harvest_date >= ").push_bind(start);
        }
        if let Some(end) = params.end_date {
            query.push(" AND h.harvest_date <= ").push_bind(end);
        }
        query.push(" ORDER BY h.id");

        let rows = query.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(harvest_from_row).collect::<Result<_, _>>()?)
    }

    /// Get a harvest record by ID.
    pub async fn get_harvest_record(&self, id: i64) -> Result<Option<HarvestRecord>, AppError> {
        let sql = format!("{} WHERE h.id = ?", HARVEST_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(harvest_from_row).transpose()?)
    }

    /// Create a new harvest record on an existing field.
    pub async fn create_harvest_record(
        &self,
        request: &CreateHarvestRecordRequest,
    ) -> Result<HarvestRecord, AppError> {
        self.ensure_field_exists(request.field_id).await?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO harvest_records (field_id, harvest_date, quantity_kg, tea_grade, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(request.field_id)
        .bind(request.harvest_date)
        .bind(request.quantity_kg)
        .bind(request.tea_grade.as_str())
        .bind(&request.notes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.load_created(
            self.get_harvest_record(result.last_insert_rowid()).await?,
            "harvest record",
        )
    }

    /// Apply a partial update to a harvest record.
    pub async fn update_harvest_record(
        &self,
        id: i64,
        request: &UpdateHarvestRecordRequest,
    ) -> Result<HarvestRecord, AppError> {
        let existing = self
            .get_harvest_record(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Harvest record {} not found", id)))?;

        let field_id = request.field_id.unwrap_or(existing.field_id);
        if field_id != existing.field_id {
            self.ensure_field_exists(field_id).await?;
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE harvest_records SET field_id = ?, harvest_date = ?, quantity_kg = ?, tea_grade = ?, notes = ?, updated_at = ? WHERE id = ?"
        )
        .bind(field_id)
        .bind(request.harvest_date.unwrap_or(existing.harvest_date))
        .bind(request.quantity_kg.unwrap_or(existing.quantity_kg))
        .bind(request.tea_grade.unwrap_or(existing.tea_grade).as_str())
        .bind(merge_nullable(&request.notes, existing.notes))
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_harvest_record(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Harvest record {} not found", id)))
    }

    /// Delete a harvest record.
    pub async fn delete_harvest_record(&self, id: i64) -> Result<(), AppError> {
        self.delete_row("harvest_records", "Harvest record", id)
            .await
    }

    // ==================== WEATHER OBSERVATION OPERATIONS ====================

    /// List weather observations matching the search parameters.
    pub async fn list_weather_observations(
        &self,
        params: &WeatherObservationSearchParams,
    ) -> Result<Vec<WeatherObservation>, AppError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(WEATHER_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(field_id) = params.field_id {
            query.push(" AND w.field_id = ").push_bind(field_id);
        }
        if let Some(start) = params.start_date {
            query.push(" AND w.date >= ").push_bind(start);
        }
        if let Some(end) = params.end_date {
            query.push(" AND w.date <= ").push_bind(end);
        }
        query.push(" ORDER BY w.id");

        let rows = query.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(weather_from_row).collect::<Result<_, _>>()?)
    }

    /// Get a weather observation by ID.
    pub async fn get_weather_observation(
        &self,
        id: i64,
    ) -> Result<Option<WeatherObservation>, AppError> {
        let sql = format!("{} WHERE w.id = ?", WEATHER_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(weather_from_row).transpose()?)
    }

    /// Create a new weather observation on an existing field.
    pub async fn create_weather_observation(
        &self,
        request: &CreateWeatherObservationRequest,
    ) -> Result<WeatherObservation, AppError> {
        self.ensure_field_exists(request.field_id).await?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO weather_observations (field_id, date, temperature, rainfall, humidity, pests_seen, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(request.field_id)
        .bind(request.date)
        .bind(request.temperature)
        .bind(request.rainfall)
        .bind(request.humidity)
        .bind(&request.pests_seen)
        .bind(&request.notes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.load_created(
            self.get_weather_observation(result.last_insert_rowid())
                .await?,
            "weather observation",
        )
    }

    /// Apply a partial update to a weather observation.
    pub async fn update_weather_observation(
        &self,
        id: i64,
        request: &UpdateWeatherObservationRequest,
    ) -> Result<WeatherObservation, AppError> {
        let existing = self
            .get_weather_observation(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Weather observation {} not found", id)))?;

        let field_id = request.field_id.unwrap_or(existing.field_id);
        if field_id != existing.field_id {
            self.ensure_field_exists(field_id).await?;
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE weather_observations SET field_id = ?, date = ?, temperature = ?, rainfall = ?, humidity = ?, pests_seen = ?, notes = ?, updated_at = ? WHERE id = ?"
        )
        .bind(field_id)
        .bind(request.date.unwrap_or(existing.date))
        .bind(request.temperature.unwrap_or(existing.temperature))
        .bind(request.rainfall.unwrap_or(existing.rainfall))
        .bind(request.humidity.unwrap_or(existing.humidity))
        .bind(merge_nullable(&request.pests_seen, existing.pests_seen))
        .bind(merge_nullable(&request.notes, existing.notes))
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_weather_observation(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Weather observation {} not found", id)))
    }

    /// Delete a weather observation.
    pub async fn delete_weather_observation(&self, id: i64) -> Result<(), AppError> {
        self.delete_row("weather_observations", "Weather observation", id)
            .await
    }

    // ==================== DASHBOARD ====================

    /// Aggregate farm statistics. Monthly figures cover the month containing `today`.
    pub async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats, AppError> {
        let (month_start, month_end) = month_bounds(today)?;

        let fields = sqlx::query(
            "SELECT COUNT(*) AS total, COALESCE(SUM(area_size), 0.0) AS area FROM fields",
        )
        .fetch_one(&self.pool)
        .await?;

        let status_rows = sqlx::query("SELECT status, COUNT(*) AS total FROM tasks GROUP BY status")
            .fetch_all(&self.pool)
            .await?;
        let mut completed_tasks = 0;
        let mut in_progress_tasks = 0;
        let mut pending_tasks = 0;
        for row in &status_rows {
            let total: i64 = row.try_get("total")?;
            match parse_column::<TaskStatus>(row, "status")? {
                TaskStatus::Completed => completed_tasks = total,
                TaskStatus::InProgress => in_progress_tasks = total,
                TaskStatus::Pending => pending_tasks = total,
                TaskStatus::Cancelled => {}
            }
        }

        let total_harvest: f64 =
            sqlx::query("SELECT COALESCE(SUM(quantity_kg), 0.0) AS total FROM harvest_records")
                .fetch_one(&self.pool)
                .await?
                .try_get("total")?;

        let monthly_harvest: f64 = sqlx::query(
            "SELECT COALESCE(SUM(quantity_kg), 0.0) AS total FROM harvest_records WHERE harvest_date BETWEEN ? AND ?",
        )
        .bind(month_start)
        .bind(month_end)
        .fetch_one(&self.pool)
        .await?
        .try_get("total")?;

        let mut harvest_by_grade: BTreeMap<TeaGrade, f64> =
            TeaGrade::ALL.iter().map(|grade| (*grade, 0.0)).collect();
        let grade_rows = sqlx::query(
            "SELECT tea_grade, COALESCE(SUM(quantity_kg), 0.0) AS total FROM harvest_records GROUP BY tea_grade",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &grade_rows {
            let grade = parse_column::<TeaGrade>(row, "tea_grade")?;
            harvest_by_grade.insert(grade, row.try_get("total")?);
        }

        let weather = sqlx::query(
            r#"SELECT COALESCE(AVG(temperature), 0.0) AS avg_temperature,
                      COALESCE(SUM(rainfall), 0.0) AS total_rainfall,
                      COALESCE(AVG(humidity), 0.0) AS avg_humidity
               FROM weather_observations WHERE date BETWEEN ? AND ?"#,
        )
        .bind(month_start)
        .bind(month_end)
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_fields: fields.try_get("total")?,
            total_area: fields.try_get("area")?,
            completed_tasks,
            in_progress_tasks,
            pending_tasks,
            total_harvest,
            monthly_harvest,
            average_temperature: weather.try_get("avg_temperature")?,
            total_rainfall: weather.try_get("total_rainfall")?,
            average_humidity: weather.try_get("avg_humidity")?,
            harvest_by_grade,
        })
    }

    // ==================== HELPERS ====================

    async fn delete_row(&self, table: &str, label: &str, id: i64) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {} not found", label, id)));
        }
        Ok(())
    }

    fn load_created<T>(&self, row: Option<T>, label: &str) -> Result<T, AppError> {
        row.ok_or_else(|| AppError::Internal(format!("Created {} could not be read back", label)))
    }
}

/// First and last day of the month containing `day`.
fn month_bounds(day: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = day
        .with_day(1)
        .ok_or_else(|| AppError::Internal(format!("No first day of month for {}", day)))?;
    let (year, month) = if start.month() == 12 {
        (start.year() + 1, 1)
    } else {
        (start.year(), start.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::Internal(format!("No last day of month for {}", day)))?;
    Ok((start, end))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Substring pattern for `LIKE ... ESCAPE '\'`. SQLite's `LIKE` already folds ASCII case.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Decode a TEXT column holding an enum name.
fn parse_column<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ValidationError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: ValidationError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn field_from_row(row: &SqliteRow) -> Result<Field, sqlx::Error> {
    Ok(Field {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        area_size: row.try_get("area_size")?,
        soil_type: row.try_get("soil_type")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn task_from_row(row: &SqliteRow) -> Result<Task, sqlx::Error> {
    Ok(Task {
        id: row.try_get("id")?,
        field_id: row.try_get("field_id")?,
        field_name: row.try_get("field_name")?,
        task_type: parse_column(row, "task_type")?,
        assigned_worker: row.try_get("assigned_worker")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        status: parse_column(row, "status")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn harvest_from_row(row: &SqliteRow) -> Result<HarvestRecord, sqlx::Error> {
    Ok(HarvestRecord {
        id: row.try_get("id")?,
        field_id: row.try_get("field_id")?,
        field_name: row.try_get("field_name")?,
        harvest_date: row.try_get("harvest_date")?,
        quantity_kg: row.try_get("quantity_kg")?,
        tea_grade: parse_column(row, "tea_grade")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn weather_from_row(row: &SqliteRow) -> Result<WeatherObservation, sqlx::Error> {
    Ok(WeatherObservation {
        id: row.try_get("id")?,
        field_id: row.try_get("field_id")?,
        field_name: row.try_get("field_name")?,
        date: row.try_get("date")?,
        temperature: row.try_get("temperature")?,
        rainfall: row.try_get("rainfall")?,
        humidity: row.try_get("humidity")?,
        pests_seen: row.try_get("pests_seen")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::db::init_database;
    use crate::models::TaskType;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("repo.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn field_request(name: &str, area: f64) -> CreateFieldRequest {
        CreateFieldRequest {
            name: name.to_string(),
            location: "Makinohara".to_string(),
            area_size: area,
            soil_type: Some("Red clay".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(date(2024, 2, 14)).unwrap(),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            month_bounds(date(2023, 12, 31)).unwrap(),
            (date(2023, 12, 1), date(2023, 12, 31))
        );
    }

    #[tokio::test]
    async fn test_field_filters() {
        let (repo, _dir) = repo().await;
        repo.create_field(&field_request("North Slope", 1.0)).await.unwrap();
        repo.create_field(&field_request("South Terrace", 2.0)).await.unwrap();

        let by_name = repo
            .list_fields(&FieldSearchParams {
                name: Some("north".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "North Slope");

        let by_soil = repo
            .list_fields(&FieldSearchParams {
                soil_type: Some("Red clay".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_soil.len(), 2);
        assert!(by_soil[0].id < by_soil[1].id);
    }

    #[tokio::test]
    async fn test_name_filter_treats_wildcards_literally() {
        let (repo, _dir) = repo().await;
        repo.create_field(&field_request("100% Yabukita", 1.0)).await.unwrap();
        repo.create_field(&field_request("1000 Yabukita", 1.0)).await.unwrap();
        repo.create_field(&field_request("Old_Terrace", 1.0)).await.unwrap();
        repo.create_field(&field_request("Old Terrace", 1.0)).await.unwrap();

        let search = |name: &str| FieldSearchParams {
            name: Some(name.to_string()),
            ..Default::default()
        };

        let hits = repo.list_fields(&search("100%")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "100% Yabukita");

        let hits = repo.list_fields(&search("old_")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Old_Terrace");
    }

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern("North"), "%North%");
        assert_eq!(like_pattern("5%_a\\b"), "%5\\%\\_a\\\\b%");
    }

    #[tokio::test]
    async fn test_partial_update_keeps_unset_values() {
        let (repo, _dir) = repo().await;
        let field = repo.create_field(&field_request("Upper", 3.5)).await.unwrap();

        let updated = repo
            .update_field(
                field.id,
                &UpdateFieldRequest {
                    notes: Some(Some("replanted".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Upper");
        assert_eq!(updated.area_size, 3.5);
        assert_eq!(updated.notes.as_deref(), Some("replanted"));
        assert_eq!(updated.created_at, field.created_at);
    }

    #[tokio::test]
    async fn test_explicit_null_clears_optional_text() {
        let (repo, _dir) = repo().await;
        let field = repo.create_field(&field_request("Upper", 3.5)).await.unwrap();
        assert_eq!(field.soil_type.as_deref(), Some("Red clay"));

        let updated = repo
            .update_field(
                field.id,
                &UpdateFieldRequest {
                    soil_type: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.soil_type.is_none());

        let stored = repo.get_field(field.id).await.unwrap().unwrap();
        assert!(stored.soil_type.is_none());
        assert_eq!(stored.location, "Makinohara");
    }

    #[tokio::test]
    async fn test_task_requires_existing_field() {
        let (repo, _dir) = repo().await;
        let err = repo
            .create_task(&CreateTaskRequest {
                field_id: 42,
                task_type: TaskType::Pruning,
                assigned_worker: "Sato".to_string(),
                start_date: date(2024, 5, 1),
                end_date: date(2024, 5, 2),
                status: TaskStatus::Pending,
                notes: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_deleting_field_cascades() {
        let (repo, _dir) = repo().await;
        let field = repo.create_field(&field_request("Lower", 1.0)).await.unwrap();
        let record = repo
            .create_harvest_record(&CreateHarvestRecordRequest {
                field_id: field.id,
                harvest_date: date(2024, 5, 1),
                quantity_kg: 120.0,
                tea_grade: TeaGrade::High,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(record.field_name, "Lower");

        repo.delete_field(field.id).await.unwrap();

        assert!(repo.get_harvest_record(record.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_field(field.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let (repo, _dir) = repo().await;
        let empty = repo.dashboard_stats(date(2024, 5, 15)).await.unwrap();
        assert_eq!(empty.total_fields, 0);
        assert_eq!(empty.harvest_by_grade.len(), 4);
        assert_eq!(empty.average_temperature, 0.0);

        let field = repo.create_field(&field_request("Main", 2.5)).await.unwrap();
        repo.create_field(&field_request("Side", 1.5)).await.unwrap();

        for (day, quantity, grade) in [
            (date(2024, 5, 2), 100.0, TeaGrade::Premium),
            (date(2024, 5, 20), 50.0, TeaGrade::Premium),
            (date(2024, 4, 30), 30.0, TeaGrade::Standard),
        ] {
            repo.create_harvest_record(&CreateHarvestRecordRequest {
                field_id: field.id,
                harvest_date: day,
                quantity_kg: quantity,
                tea_grade: grade,
                notes: None,
            })
            .await
            .unwrap();
        }

        for (day, temperature, rainfall, humidity) in [
            (date(2024, 5, 1), 20.0, 5.0, 60.0),
            (date(2024, 5, 2), 24.0, 0.0, 70.0),
            (date(2024, 6, 1), 40.0, 99.0, 10.0),
        ] {
            repo.create_weather_observation(&CreateWeatherObservationRequest {
                field_id: field.id,
                date: day,
                temperature,
                rainfall,
                humidity,
                pests_seen: None,
                notes: None,
            })
            .await
            .unwrap();
        }

        for status in [TaskStatus::Completed, TaskStatus::Completed, TaskStatus::Pending] {
            repo.create_task(&CreateTaskRequest {
                field_id: field.id,
                task_type: TaskType::Fertilizing,
                assigned_worker: "Ito".to_string(),
                start_date: date(2024, 5, 1),
                end_date: date(2024, 5, 1),
                status,
                notes: None,
            })
            .await
            .unwrap();
        }

        let stats = repo.dashboard_stats(date(2024, 5, 15)).await.unwrap();
        assert_eq!(stats.total_fields, 2);
        assert_eq!(stats.total_area, 4.0);
        assert_eq!(stats.completed_tasks, 2);
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.in_progress_tasks, 0);
        assert_eq!(stats.total_harvest, 180.0);
        assert_eq!(stats.monthly_harvest, 150.0);
        assert_eq!(stats.average_temperature, 22.0);
        assert_eq!(stats.total_rainfall, 5.0);
        assert_eq!(stats.average_humidity, 65.0);
        assert_eq!(stats.harvest_by_grade[&TeaGrade::Premium], 150.0);
        assert_eq!(stats.harvest_by_grade[&TeaGrade::Standard], 30.0);
        assert_eq!(stats.harvest_by_grade[&TeaGrade::High], 0.0);
    }
}
