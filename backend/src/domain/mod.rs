//! Domain layer: models, error taxonomy, and the patient/appointment
//! services.

pub mod appointment_service;
pub mod errors;
pub mod models;
pub mod patient_service;

pub use appointment_service::AppointmentService;
pub use errors::{DomainError, DomainResult};
pub use patient_service::PatientService;
