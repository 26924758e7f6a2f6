//! Appointment query service: temporal reads (day window, upcoming) and the
//! create/update/delete lifecycle, with patient enrichment at read time.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use shared::{AppointmentDto, AppointmentPatient, AppointmentPayload, MessageResponse};
use tracing::{info, warn};

use crate::db::DbConnection;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Appointment, AppointmentKind, AppointmentStatus, DayWindow, Patient,
    DEFAULT_DURATION_MINUTES,
};
use crate::storage::{AppointmentRepository, PatientRepository};

/// Service answering temporal queries over the appointment store and
/// mutating appointment state.
///
/// Patient enrichment is an explicit lookup at read time: a reference that
/// does not resolve leaves the patient name fields absent, it never errors.
#[derive(Clone)]
pub struct AppointmentService {
    appointments: AppointmentRepository,
    patients: PatientRepository,
}

impl AppointmentService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            appointments: AppointmentRepository::new(db.clone()),
            patients: PatientRepository::new(db),
        }
    }

    /// List every appointment, enriched with patient names, ordered by
    /// (date, time) ascending
    pub async fn list_appointments(&self) -> DomainResult<Vec<AppointmentDto>> {
        info!("Listing all appointments");
        let appointments = self.appointments.list_all().await?;
        self.enrich_all(appointments).await
    }

    /// Appointments on the calendar day named by `raw`, ordered by time.
    ///
    /// Any time-of-day component in the input is discarded. An unparseable
    /// input yields an empty result set rather than an error; the original
    /// system built its day window from an invalid date and matched nothing.
    pub async fn appointments_on_date(&self, raw: &str) -> DomainResult<Vec<AppointmentDto>> {
        info!("Listing appointments for date: {}", raw);

        let Some(day) = parse_calendar_date(raw) else {
            warn!("Unparseable date `{}`, returning empty result set", raw);
            return Ok(Vec::new());
        };

        let window = DayWindow::for_day(day);
        let appointments = self.appointments.list_in_window(&window).await?;
        self.enrich_all(appointments).await
    }

    /// Upcoming appointments relative to the server-local clock.
    ///
    /// Today's appointments whose "HH:MM" has already passed are excluded.
    pub async fn upcoming_appointments(&self) -> DomainResult<Vec<AppointmentDto>> {
        self.upcoming_appointments_at(Local::now().naive_local()).await
    }

    /// Upcoming appointments relative to an explicit instant: every
    /// appointment on a later calendar day, plus those today whose time
    /// string is lexicographically >= the instant's "HH:MM". Ordered by
    /// (date, time) ascending.
    pub async fn upcoming_appointments_at(
        &self,
        now: NaiveDateTime,
    ) -> DomainResult<Vec<AppointmentDto>> {
        let start_of_today = now.date();
        let now_hhmm = now.format("%H:%M").to_string();
        info!("Listing upcoming appointments from {} {}", start_of_today, now_hhmm);

        let appointments = self
            .appointments
            .list_upcoming(start_of_today, &now_hhmm)
            .await?;
        self.enrich_all(appointments).await
    }

    /// Single appointment, enriched with the patient's name and contact
    /// details
    pub async fn get_appointment(&self, id: &str) -> DomainResult<AppointmentDto> {
        info!("Getting appointment: {}", id);

        let appointment = self
            .appointments
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment not found"))?;

        self.enrich(appointment, Enrichment::Deep).await
    }

    /// All appointments referencing a patient, in store-insertion order
    pub async fn appointments_for_patient(
        &self,
        patient_id: &str,
    ) -> DomainResult<Vec<AppointmentDto>> {
        info!("Listing appointments for patient: {}", patient_id);
        let appointments = self.appointments.list_for_patient(patient_id).await?;
        self.enrich_all(appointments).await
    }

    /// Create an appointment from a payload, validating required fields and
    /// enum membership
    pub async fn create_appointment(
        &self,
        payload: AppointmentPayload,
    ) -> DomainResult<AppointmentDto> {
        info!("Creating appointment: {:?}", payload);

        let appointment = build_appointment(payload)?;
        self.appointments.store(&appointment).await?;

        info!("Created appointment {}", appointment.id);
        self.enrich(appointment, Enrichment::Names).await
    }

    /// Merge the supplied fields over an existing appointment, re-validate
    /// and persist
    pub async fn update_appointment(
        &self,
        id: &str,
        payload: AppointmentPayload,
    ) -> DomainResult<AppointmentDto> {
        info!("Updating appointment {}: {:?}", id, payload);

        let mut appointment = self
            .appointments
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment not found"))?;

        apply_payload(&mut appointment, payload)?;
        self.appointments.update(&appointment).await?;

        info!("Updated appointment {}", appointment.id);
        self.enrich(appointment, Enrichment::Names).await
    }

    /// Delete an appointment by id
    pub async fn delete_appointment(&self, id: &str) -> DomainResult<MessageResponse> {
        info!("Deleting appointment: {}", id);

        if !self.appointments.delete(id).await? {
            return Err(DomainError::not_found("Appointment not found"));
        }

        Ok(MessageResponse {
            message: "Appointment deleted successfully".to_string(),
        })
    }

    async fn enrich_all(
        &self,
        appointments: Vec<Appointment>,
    ) -> DomainResult<Vec<AppointmentDto>> {
        let mut enriched = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            enriched.push(self.enrich(appointment, Enrichment::Names).await?);
        }
        Ok(enriched)
    }

    async fn enrich(
        &self,
        appointment: Appointment,
        level: Enrichment,
    ) -> DomainResult<AppointmentDto> {
        let patient = self.patients.get(&appointment.patient_id).await?;
        Ok(to_dto(appointment, patient.as_ref(), level))
    }
}

#[derive(Clone, Copy)]
enum Enrichment {
    /// First and last name only (list views)
    Names,
    /// Name plus email and phone (single-appointment view)
    Deep,
}

/// Parse a calendar date from user input, discarding any time-of-day
/// component. Returns None for anything unparseable.
fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    None
}

/// Validate a create payload and build the appointment to store
fn build_appointment(payload: AppointmentPayload) -> DomainResult<Appointment> {
    let patient_id = required_text(payload.patient, "patient")?;
    let date = parse_payload_date(payload.date.as_deref())?
        .ok_or_else(|| DomainError::validation("`date` is required"))?;
    let time = required_text(payload.time, "time")?;
    let kind: AppointmentKind = required_text(payload.kind, "type")?
        .parse()
        .map_err(DomainError::Validation)?;
    let status = match payload.status {
        Some(raw) => raw.parse::<AppointmentStatus>().map_err(DomainError::Validation)?,
        None => AppointmentStatus::default(),
    };

    Ok(Appointment {
        id: Appointment::generate_id(),
        patient_id,
        date,
        time,
        duration: payload.duration.unwrap_or(DEFAULT_DURATION_MINUTES),
        kind,
        status,
        notes: payload.notes.map(|n| n.trim().to_string()),
        created_at: Utc::now(),
    })
}

/// Merge an update payload over an existing appointment, validating each
/// supplied field. Unspecified fields are retained.
fn apply_payload(
    appointment: &mut Appointment,
    payload: AppointmentPayload,
) -> DomainResult<()> {
    if let Some(patient) = payload.patient {
        appointment.patient_id = required_text(Some(patient), "patient")?;
    }
    if payload.date.is_some() {
        appointment.date = parse_payload_date(payload.date.as_deref())?
            .ok_or_else(|| DomainError::validation("`date` is required"))?;
    }
    if let Some(time) = payload.time {
        appointment.time = required_text(Some(time), "time")?;
    }
    if let Some(duration) = payload.duration {
        appointment.duration = duration;
    }
    if let Some(kind) = payload.kind {
        appointment.kind = kind.parse().map_err(DomainError::Validation)?;
    }
    if let Some(status) = payload.status {
        appointment.status = status.parse().map_err(DomainError::Validation)?;
    }
    if let Some(notes) = payload.notes {
        appointment.notes = Some(notes.trim().to_string());
    }
    Ok(())
}

/// Parse a submitted date string into a calendar date. A supplied but
/// unparseable date is a validation failure on a write path, unlike the
/// permissive read path.
fn parse_payload_date(raw: Option<&str>) -> DomainResult<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(raw) => parse_calendar_date(raw)
            .map(Some)
            .ok_or_else(|| DomainError::validation(format!("`{}` is not a valid date", raw))),
    }
}

fn required_text(value: Option<String>, field: &str) -> DomainResult<String> {
    let trimmed = value.as_deref().unwrap_or("").trim().to_string();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("`{}` is required", field)));
    }
    Ok(trimmed)
}

fn to_dto(
    appointment: Appointment,
    patient: Option<&Patient>,
    level: Enrichment,
) -> AppointmentDto {
    let mut patient_ref = AppointmentPatient {
        id: appointment.patient_id.clone(),
        ..Default::default()
    };
    if let Some(patient) = patient {
        patient_ref.first_name = Some(patient.first_name.clone());
        patient_ref.last_name = Some(patient.last_name.clone());
        if let Enrichment::Deep = level {
            patient_ref.email = Some(patient.email.clone());
            patient_ref.phone = Some(patient.phone.clone());
        }
    }

    AppointmentDto {
        id: appointment.id,
        patient: patient_ref,
        date: appointment.date.format("%Y-%m-%d").to_string(),
        time: appointment.time,
        duration: appointment.duration,
        kind: appointment.kind.to_string(),
        status: appointment.status.to_string(),
        notes: appointment.notes,
        created_at: appointment.created_at.to_rfc3339(),
    }
}
