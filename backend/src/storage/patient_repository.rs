//! SQLite-backed patient repository.
//!
//! Address and medical history are embedded documents and travel as JSON
//! TEXT columns.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::domain::errors::DomainResult;
use crate::domain::models::{Address, MedicalHistoryEntry, Patient};

#[derive(Clone)]
pub struct PatientRepository {
    db: DbConnection,
}

impl PatientRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a new patient
    pub async fn store(&self, patient: &Patient) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO patients
                (id, first_name, last_name, email, phone, date_of_birth, address, medical_history, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&patient.id)
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.email)
        .bind(&patient.phone)
        .bind(patient.date_of_birth)
        .bind(encode_address(&patient.address)?)
        .bind(serde_json::to_string(&patient.medical_history)?)
        .bind(patient.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Persist field changes to an existing patient. `created_at` is
    /// immutable and never written back.
    pub async fn update(&self, patient: &Patient) -> DomainResult<()> {
        sqlx::query(
            r#"
            UPDATE patients
            SET first_name = ?, last_name = ?, email = ?, phone = ?,
                date_of_birth = ?, address = ?, medical_history = ?
            WHERE id = ?
            "#,
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.email)
        .bind(&patient.phone)
        .bind(patient.date_of_birth)
        .bind(encode_address(&patient.address)?)
        .bind(serde_json::to_string(&patient.medical_history)?)
        .bind(&patient.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Fetch a single patient by id
    pub async fn get(&self, id: &str) -> DomainResult<Option<Patient>> {
        let row = sqlx::query("SELECT * FROM patients WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.map(|r| map_patient(&r)).transpose()
    }

    /// Fetch a patient by email, used for the uniqueness check
    pub async fn find_by_email(&self, email: &str) -> DomainResult<Option<Patient>> {
        let row = sqlx::query("SELECT * FROM patients WHERE email = ?")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;

        row.map(|r| map_patient(&r)).transpose()
    }

    /// Delete a patient by id, reporting whether a row was removed
    pub async fn delete(&self, id: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All patients, ordered by last name then first name
    pub async fn list(&self) -> DomainResult<Vec<Patient>> {
        let rows = sqlx::query("SELECT * FROM patients ORDER BY last_name, first_name")
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(map_patient).collect()
    }
}

fn encode_address(address: &Option<Address>) -> DomainResult<Option<String>> {
    address
        .as_ref()
        .map(|a| serde_json::to_string(a).map_err(Into::into))
        .transpose()
}

fn map_patient(row: &SqliteRow) -> DomainResult<Patient> {
    let address: Option<String> = row.try_get("address")?;
    let medical_history: String = row.try_get("medical_history")?;

    let address: Option<Address> = address
        .map(|json| serde_json::from_str(&json))
        .transpose()?;
    let medical_history: Vec<MedicalHistoryEntry> = serde_json::from_str(&medical_history)?;

    Ok(Patient {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        date_of_birth: row.try_get("date_of_birth")?,
        address,
        medical_history,
        created_at: row.try_get("created_at")?,
    })
}
