use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::{AppointmentPayload, MessageResponse, PatientPayload};
use tracing::info;

use crate::domain::{AppointmentService, DomainError, PatientService};

/// Application state containing the two domain services
#[derive(Clone)]
pub struct AppState {
    pub appointments: AppointmentService,
    pub patients: PatientService,
}

impl AppState {
    pub fn new(appointments: AppointmentService, patients: PatientService) -> Self {
        Self {
            appointments,
            patients,
        }
    }
}

/// Map a domain failure to its HTTP response: NotFound -> 404,
/// Validation -> 400, store/corruption failures -> 500. The body is always
/// `{"message": "..."}`.
fn error_response(err: DomainError) -> Response {
    let status = match &err {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Store(_) | DomainError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Internal error: {:?}", err);
    }
    (
        status,
        Json(MessageResponse {
            message: err.to_string(),
        }),
    )
        .into_response()
}

/// GET /
pub async fn welcome() -> Response {
    (
        StatusCode::OK,
        Json(MessageResponse {
            message: "Welcome to Clinic Scheduler API".to_string(),
        }),
    )
        .into_response()
}

/// GET /api/appointments
pub async fn list_appointments(State(state): State<AppState>) -> Response {
    info!("GET /api/appointments");

    match state.appointments.list_appointments().await {
        Ok(appointments) => (StatusCode::OK, Json(appointments)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/appointments/date/:date
pub async fn appointments_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Response {
    info!("GET /api/appointments/date/{}", date);

    match state.appointments.appointments_on_date(&date).await {
        Ok(appointments) => (StatusCode::OK, Json(appointments)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/appointments/upcoming
pub async fn upcoming_appointments(State(state): State<AppState>) -> Response {
    info!("GET /api/appointments/upcoming");

    match state.appointments.upcoming_appointments().await {
        Ok(appointments) => (StatusCode::OK, Json(appointments)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/appointments/:id
pub async fn get_appointment(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/appointments/{}", id);

    match state.appointments.get_appointment(&id).await {
        Ok(appointment) => (StatusCode::OK, Json(appointment)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/appointments
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(payload): Json<AppointmentPayload>,
) -> Response {
    info!("POST /api/appointments");

    match state.appointments.create_appointment(payload).await {
        Ok(appointment) => (StatusCode::CREATED, Json(appointment)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/appointments/:id
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AppointmentPayload>,
) -> Response {
    info!("PUT /api/appointments/{}", id);

    match state.appointments.update_appointment(&id, payload).await {
        Ok(appointment) => (StatusCode::OK, Json(appointment)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/appointments/:id
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    info!("DELETE /api/appointments/{}", id);

    match state.appointments.delete_appointment(&id).await {
        Ok(confirmation) => (StatusCode::OK, Json(confirmation)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/patients
pub async fn list_patients(State(state): State<AppState>) -> Response {
    info!("GET /api/patients");

    match state.patients.list_patients().await {
        Ok(patients) => (StatusCode::OK, Json(patients)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/patients/:id
pub async fn get_patient(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/patients/{}", id);

    match state.patients.get_patient(&id).await {
        Ok(patient) => (StatusCode::OK, Json(patient)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/patients
pub async fn create_patient(
    State(state): State<AppState>,
    Json(payload): Json<PatientPayload>,
) -> Response {
    info!("POST /api/patients");

    match state.patients.create_patient(payload).await {
        Ok(patient) => (StatusCode::CREATED, Json(patient)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/patients/:id
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PatientPayload>,
) -> Response {
    info!("PUT /api/patients/{}", id);

    match state.patients.update_patient(&id, payload).await {
        Ok(patient) => (StatusCode::OK, Json(patient)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/patients/:id
pub async fn delete_patient(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("DELETE /api/patients/{}", id);

    match state.patients.delete_patient(&id).await {
        Ok(confirmation) => (StatusCode::OK, Json(confirmation)).into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    async fn setup_test_state() -> AppState {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        AppState::new(
            AppointmentService::new(db.clone()),
            PatientService::new(db),
        )
    }

    fn patient_payload(email: &str) -> PatientPayload {
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
    async fn test_create_patient_handler_returns_201() {
        let state = setup_test_state().await;

        let response =
            create_patient(State(state), Json(patient_payload("jane@example.com"))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_duplicate_patient_email_returns_400() {
        let state = setup_test_state().await;

        let first = create_patient(
            State(state.clone()),
            Json(patient_payload("jane@example.com")),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second =
            create_patient(State(state), Json(patient_payload("jane@example.com"))).await;
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_unknown_appointment_returns_404() {
        let state = setup_test_state().await;

        let response = get_appointment(State(state), Path("missing".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_appointment_without_type_returns_400() {
        let state = setup_test_state().await;

        let payload = AppointmentPayload {
            patient: Some("p-1".to_string()),
            date: Some("2024-01-15".to_string()),
            time: Some("09:00".to_string()),
            ..Default::default()
        };
        let response = create_appointment(State(state), Json(payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_appointment_lifecycle_over_handlers() {
        let state = setup_test_state().await;

        let payload = AppointmentPayload {
            patient: Some("p-1".to_string()),
            date: Some("2024-01-15".to_string()),
            time: Some("09:00".to_string()),
            kind: Some("Cleaning".to_string()),
            ..Default::default()
        };
        let created = create_appointment(State(state.clone()), Json(payload)).await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let listed = list_appointments(State(state.clone())).await;
        assert_eq!(listed.status(), StatusCode::OK);

        // Malformed date degrades to an empty 200, never an error
        let by_bad_date =
            appointments_by_date(State(state.clone()), Path("not-a-date".to_string())).await;
        assert_eq!(by_bad_date.status(), StatusCode::OK);

        let missing_delete =
            delete_appointment(State(state), Path("missing".to_string())).await;
        assert_eq!(missing_delete.status(), StatusCode::NOT_FOUND);
    }
}
