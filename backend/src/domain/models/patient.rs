//! Domain model for a patient.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Domain model representing a patient of the clinic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub address: Option<Address>,
    /// Ordered list of prior conditions, oldest entry first
    pub medical_history: Vec<MedicalHistoryEntry>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    /// Generate a unique ID for a patient
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Optional structured postal address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// One entry in a patient's medical history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MedicalHistoryEntry {
    pub condition: Option<String>,
    pub diagnosis: Option<String>,
    pub diagnosis_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
