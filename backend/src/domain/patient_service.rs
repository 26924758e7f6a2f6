//! Patient CRUD: plain field validation, trimming, and email uniqueness.
//! No temporal logic lives here; the appointment service only consumes the
//! lookup seams exposed by the underlying repository.

use chrono::{NaiveDate, Utc};
use shared::{MessageResponse, PatientDto, PatientPayload};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Address, MedicalHistoryEntry, Patient};
use crate::storage::PatientRepository;

#[derive(Clone)]
pub struct PatientService {
    patients: PatientRepository,
}

impl PatientService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            patients: PatientRepository::new(db),
        }
    }

    /// Create a new patient
    pub async fn create_patient(&self, payload: PatientPayload) -> DomainResult<PatientDto> {
        info!("Creating patient: {:?}", payload.email);

        let patient = build_patient(payload)?;
        self.ensure_email_unique(&patient.email, None).await?;
        self.patients.store(&patient).await?;

        info!("Created patient {} ({} {})", patient.id, patient.first_name, patient.last_name);
        Ok(to_dto(patient))
    }

    /// All patients, ordered by last name then first name
    pub async fn list_patients(&self) -> DomainResult<Vec<PatientDto>> {
        info!("Listing all patients");
        let patients = self.patients.list().await?;
        Ok(patients.into_iter().map(to_dto).collect())
    }

    /// Single patient by id
    pub async fn get_patient(&self, id: &str) -> DomainResult<PatientDto> {
        info!("Getting patient: {}", id);

        let patient = self
            .patients
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Patient not found"))?;
        Ok(to_dto(patient))
    }

    /// Merge the supplied fields over an existing patient, re-validate and
    /// persist
    pub async fn update_patient(
        &self,
        id: &str,
        payload: PatientPayload,
    ) -> DomainResult<PatientDto> {
        info!("Updating patient: {}", id);

        let mut patient = self
            .patients
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Patient not found"))?;

        apply_payload(&mut patient, payload)?;
        self.ensure_email_unique(&patient.email, Some(&patient.id)).await?;
        self.patients.update(&patient).await?;

        Ok(to_dto(patient))
    }

    /// Delete a patient by id.
    ///
    /// Appointments referencing the patient are left in place; their
    /// enrichment fields simply stop resolving.
    pub async fn delete_patient(&self, id: &str) -> DomainResult<MessageResponse> {
        info!("Deleting patient: {}", id);

        if !self.patients.delete(id).await? {
            return Err(DomainError::not_found("Patient not found"));
        }

        Ok(MessageResponse {
            message: "Patient deleted successfully".to_string(),
        })
    }

    async fn ensure_email_unique(&self, email: &str, own_id: Option<&str>) -> DomainResult<()> {
        if let Some(existing) = self.patients.find_by_email(email).await? {
            if own_id != Some(existing.id.as_str()) {
                return Err(DomainError::validation(format!(
                    "a patient with email `{}` already exists",
                    email
                )));
            }
        }
        Ok(())
    }
}

/// Validate a create payload and build the patient to store
fn build_patient(payload: PatientPayload) -> DomainResult<Patient> {
    Ok(Patient {
        id: Patient::generate_id(),
        first_name: required_text(payload.first_name, "firstName")?,
        last_name: required_text(payload.last_name, "lastName")?,
        email: required_text(payload.email, "email")?,
        phone: required_text(payload.phone, "phone")?,
        date_of_birth: parse_birthdate(
            payload
                .date_of_birth
                .ok_or_else(|| DomainError::validation("`dateOfBirth` is required"))?,
        )?,
        address: payload.address.map(address_from_dto),
        medical_history: history_from_dto(payload.medical_history.unwrap_or_default())?,
        created_at: Utc::now(),
    })
}

/// Merge an update payload over an existing patient, validating each
/// supplied field
fn apply_payload(patient: &mut Patient, payload: PatientPayload) -> DomainResult<()> {
    if let Some(first_name) = payload.first_name {
        patient.first_name = required_text(Some(first_name), "firstName")?;
    }
    if let Some(last_name) = payload.last_name {
        patient.last_name = required_text(Some(last_name), "lastName")?;
    }
    if let Some(email) = payload.email {
        patient.email = required_text(Some(email), "email")?;
    }
    if let Some(phone) = payload.phone {
        patient.phone = required_text(Some(phone), "phone")?;
    }
    if let Some(date_of_birth) = payload.date_of_birth {
        patient.date_of_birth = parse_birthdate(date_of_birth)?;
    }
    if let Some(address) = payload.address {
        patient.address = Some(address_from_dto(address));
    }
    if let Some(history) = payload.medical_history {
        patient.medical_history = history_from_dto(history)?;
    }
    Ok(())
}

fn parse_birthdate(raw: String) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("`{}` is not a valid date of birth", raw)))
}

fn required_text(value: Option<String>, field: &str) -> DomainResult<String> {
    let trimmed = value.as_deref().unwrap_or("").trim().to_string();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("`{}` is required", field)));
    }
    Ok(trimmed)
}

fn address_from_dto(address: shared::Address) -> Address {
    Address {
        street: address.street,
        city: address.city,
        state: address.state,
        zip_code: address.zip_code,
    }
}

fn address_to_dto(address: Address) -> shared::Address {
    shared::Address {
        street: address.street,
        city: address.city,
        state: address.state,
        zip_code: address.zip_code,
    }
}

fn history_from_dto(
    entries: Vec<shared::MedicalHistoryEntry>,
) -> DomainResult<Vec<MedicalHistoryEntry>> {
    entries
        .into_iter()
        .map(|entry| {
            Ok(MedicalHistoryEntry {
                condition: entry.condition,
                diagnosis: entry.diagnosis,
                diagnosis_date: entry
                    .diagnosis_date
                    .map(|raw| {
                        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                            DomainError::validation(format!(
                                "`{}` is not a valid diagnosis date",
                                raw
                            ))
                        })
                    })
                    .transpose()?,
                notes: entry.notes,
            })
        })
        .collect()
}

fn to_dto(patient: Patient) -> PatientDto {
    PatientDto {
        id: patient.id,
        first_name: patient.first_name,
        last_name: patient.last_name,
        email: patient.email,
        phone: patient.phone,
        date_of_birth: patient.date_of_birth.format("%Y-%m-%d").to_string(),
        address: patient.address.map(address_to_dto),
        medical_history: patient
            .medical_history
            .into_iter()
            .map(|entry| shared::MedicalHistoryEntry {
                condition: entry.condition,
                diagnosis: entry.diagnosis,
                diagnosis_date: entry
                    .diagnosis_date
                    .map(|date| date.format("%Y-%m-%d").to_string()),
                notes: entry.notes,
            })
            .collect(),
        created_at: patient.created_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> PatientService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        PatientService::new(db)
    }

    fn payload(email: &str) -> PatientPayload {
        PatientPayload {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            email: Some(email.to_string()),
            phone: Some("555-0100".to_string()),
            date_of_birth: Some("1990-04-12".to_string()),
            address: None,
            medical_history: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let service = setup().await;

        let created = service.create_patient(payload("jane@example.com")).await.unwrap();
        let fetched = service.get_patient(&created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.date_of_birth, "1990-04-12");
        assert!(fetched.medical_history.is_empty());
    }

    #[tokio::test]
    async fn test_create_trims_text_fields() {
        let service = setup().await;

        let mut untrimmed = payload("jane@example.com");
        untrimmed.first_name = Some("  Jane ".to_string());
        untrimmed.email = Some(" jane@example.com  ".to_string());

        let created = service.create_patient(untrimmed).await.unwrap();
        assert_eq!(created.first_name, "Jane");
        assert_eq!(created.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_create_rejects_missing_required_fields() {
        let service = setup().await;

        let mut missing_phone = payload("jane@example.com");
        missing_phone.phone = None;
        assert!(matches!(
            service.create_patient(missing_phone).await.unwrap_err(),
            DomainError::Validation(_)
        ));

        // Whitespace-only counts as missing after trimming
        let mut blank_name = payload("jane2@example.com");
        blank_name.last_name = Some("   ".to_string());
        assert!(matches!(
            service.create_patient(blank_name).await.unwrap_err(),
            DomainError::Validation(_)
        ));

        assert!(service.list_patients().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let service = setup().await;

        service.create_patient(payload("jane@example.com")).await.unwrap();

        let err = service
            .create_patient(payload("jane@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_cannot_take_anothers_email() {
        let service = setup().await;

        let jane = service.create_patient(payload("jane@example.com")).await.unwrap();
        service.create_patient(payload("john@example.com")).await.unwrap();

        let err = service
            .update_patient(
                &jane.id,
                PatientPayload {
                    email: Some("john@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Re-submitting one's own email is fine
        let unchanged = service
            .update_patient(
                &jane.id,
                PatientPayload {
                    email: Some("jane@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unchanged.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_update_merges_supplied_fields_only() {
        let service = setup().await;

        let created = service.create_patient(payload("jane@example.com")).await.unwrap();

        let updated = service
            .update_patient(
                &created.id,
                PatientPayload {
                    phone: Some("555-0199".to_string()),
                    medical_history: Some(vec![shared::MedicalHistoryEntry {
                        condition: Some("Gingivitis".to_string()),
                        diagnosis_date: Some("2023-11-02".to_string()),
                        ..Default::default()
                    }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.phone, "555-0199");
        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.medical_history.len(), 1);
        assert_eq!(
            updated.medical_history[0].diagnosis_date.as_deref(),
            Some("2023-11-02")
        );
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = setup().await;

        let created = service.create_patient(payload("jane@example.com")).await.unwrap();

        let confirmation = service.delete_patient(&created.id).await.unwrap();
        assert_eq!(confirmation.message, "Patient deleted successfully");

        assert!(matches!(
            service.get_patient(&created.id).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            service.delete_patient(&created.id).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_orders_by_last_then_first_name() {
        let service = setup().await;

        for (first, last, email) in [
            ("Maria", "Alvarez", "maria@example.com"),
            ("Adam", "Zimmer", "adam@example.com"),
            ("Ben", "Alvarez", "ben@example.com"),
        ] {
            let mut p = payload(email);
            p.first_name = Some(first.to_string());
            p.last_name = Some(last.to_string());
            service.create_patient(p).await.unwrap();
        }

        let names: Vec<(String, String)> = service
            .list_patients()
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.last_name, p.first_name))
            .collect();

        assert_eq!(
            names,
            vec![
                ("Alvarez".to_string(), "Ben".to_string()),
                ("Alvarez".to_string(), "Maria".to_string()),
                ("Zimmer".to_string(), "Adam".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_address_round_trip() {
        let service = setup().await;

        let mut with_address = payload("jane@example.com");
        with_address.address = Some(shared::Address {
            street: Some("12 Elm St".to_string()),
            city: Some("Springfield".to_string()),
            state: None,
            zip_code: Some("01101".to_string()),
        });

        let created = service.create_patient(with_address).await.unwrap();
        let fetched = service.get_patient(&created.id).await.unwrap();

        let address = fetched.address.expect("address should round-trip");
        assert_eq!(address.street.as_deref(), Some("12 Elm St"));
        assert!(address.state.is_none());
    }
}
