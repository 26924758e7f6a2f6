use serde::{Deserialize, Serialize};

/// Appointment as returned by the API, enriched with fields from the
/// referenced patient. Dates travel as strings: `date` is "YYYY-MM-DD",
/// `time` is zero-padded 24h "HH:MM", `created_at` is RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    pub id: String,
    /// The referenced patient. The id is always present; the name/contact
    /// fields are filled in by the read-time lookup and are simply absent
    /// when the reference does not resolve.
    pub patient: AppointmentPatient,
    pub date: String,
    pub time: String,
    /// Duration in minutes
    pub duration: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

/// Patient fields embedded in an enriched appointment.
///
/// List views carry first/last name only; the single-appointment view also
/// carries email and phone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatient {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Create/update payload for an appointment.
///
/// Every field is optional at the wire level: create validates that the
/// required ones are present, update merges the supplied fields over the
/// stored record. `date` arrives as a string and is parsed server-side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPayload {
    /// Patient id the appointment belongs to
    pub patient: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Patient as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDto {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// "YYYY-MM-DD"
    pub date_of_birth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub medical_history: Vec<MedicalHistoryEntry>,
    pub created_at: String,
}

/// Create/update payload for a patient. Same partial semantics as
/// [`AppointmentPayload`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<Address>,
    pub medical_history: Option<Vec<MedicalHistoryEntry>>,
}

/// Optional structured postal address on a patient record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

/// One entry in a patient's ordered medical history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistoryEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    /// "YYYY-MM-DD"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body used for delete confirmations, the welcome route, and error
/// responses: `{"message": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_patient_omits_unresolved_fields() {
        let patient = AppointmentPatient {
            id: "p-1".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json, serde_json::json!({"id": "p-1"}));
    }

    #[test]
    fn appointment_dto_uses_wire_field_names() {
        let dto = AppointmentDto {
            id: "a-1".to_string(),
            patient: AppointmentPatient {
                id: "p-1".to_string(),
                first_name: Some("Jane".to_string()),
                last_name: Some("Doe".to_string()),
                email: None,
                phone: None,
            },
            date: "2024-01-15".to_string(),
            time: "09:00".to_string(),
            duration: 30,
            kind: "Checkup".to_string(),
            status: "Scheduled".to_string(),
            notes: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["type"], "Checkup");
        assert_eq!(json["patient"]["firstName"], "Jane");
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00Z");
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn appointment_payload_accepts_partial_bodies() {
        let payload: AppointmentPayload =
            serde_json::from_str(r#"{"time": "14:30"}"#).unwrap();
        assert_eq!(payload.time.as_deref(), Some("14:30"));
        assert!(payload.patient.is_none());
        assert!(payload.kind.is_none());
    }
}
