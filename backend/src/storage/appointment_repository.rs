//! SQLite-backed appointment repository.
//!
//! Owns the SQL for the temporal queries. `date` and `time` are stored as
//! zero-padded TEXT, so SQL `ORDER BY` and range comparisons on them are
//! chronological.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Appointment, DayWindow};

#[derive(Clone)]
pub struct AppointmentRepository {
    db: DbConnection,
}

impl AppointmentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a new appointment
    pub async fn store(&self, appointment: &Appointment) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments
                (id, patient_id, date, time, duration, kind, status, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&appointment.id)
        .bind(&appointment.patient_id)
        .bind(appointment.date)
        .bind(&appointment.time)
        .bind(appointment.duration)
        .bind(appointment.kind.to_string())
        .bind(appointment.status.to_string())
        .bind(&appointment.notes)
        .bind(appointment.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Persist field changes to an existing appointment. `created_at` is
    /// immutable and never written back.
    pub async fn update(&self, appointment: &Appointment) -> DomainResult<()> {
        sqlx::query(
            r#"
            UPDATE appointments
            SET patient_id = ?, date = ?, time = ?, duration = ?, kind = ?, status = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&appointment.patient_id)
        .bind(appointment.date)
        .bind(&appointment.time)
        .bind(appointment.duration)
        .bind(appointment.kind.to_string())
        .bind(appointment.status.to_string())
        .bind(&appointment.notes)
        .bind(&appointment.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Fetch a single appointment by id
    pub async fn get(&self, id: &str) -> DomainResult<Option<Appointment>> {
        let row = sqlx::query("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.map(|r| map_appointment(&r)).transpose()
    }

    /// Delete an appointment by id, reporting whether a row was removed
    pub async fn delete(&self, id: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every appointment, ordered by (date, time) ascending
    pub async fn list_all(&self) -> DomainResult<Vec<Appointment>> {
        let rows = sqlx::query("SELECT * FROM appointments ORDER BY date, time")
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(map_appointment).collect()
    }

    /// Appointments whose date falls inside the given day window, ordered by
    /// time ascending
    pub async fn list_in_window(&self, window: &DayWindow) -> DomainResult<Vec<Appointment>> {
        let rows = sqlx::query(
            "SELECT * FROM appointments WHERE date >= ? AND date <= ? ORDER BY time",
        )
        .bind(window.start_day())
        .bind(window.end_day())
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(map_appointment).collect()
    }

    /// Appointments on a future calendar day, plus today's whose time string
    /// is lexicographically >= the given "HH:MM". Ordered by (date, time).
    pub async fn list_upcoming(
        &self,
        today: NaiveDate,
        now_hhmm: &str,
    ) -> DomainResult<Vec<Appointment>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM appointments
            WHERE date > ?1 OR (date = ?1 AND time >= ?2)
            ORDER BY date, time
            "#,
        )
        .bind(today)
        .bind(now_hhmm)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(map_appointment).collect()
    }

    /// Appointments referencing the given patient, in store-insertion order
    /// (no ORDER BY)
    pub async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Appointment>> {
        let rows = sqlx::query("SELECT * FROM appointments WHERE patient_id = ?")
            .bind(patient_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(map_appointment).collect()
    }
}

fn map_appointment(row: &SqliteRow) -> DomainResult<Appointment> {
    let kind: String = row.try_get("kind")?;
    let status: String = row.try_get("status")?;

    Ok(Appointment {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        date: row.try_get("date")?,
        time: row.try_get("time")?,
        duration: row.try_get("duration")?,
        kind: kind.parse().map_err(DomainError::Corrupt)?,
        status: status.parse().map_err(DomainError::Corrupt)?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}
