//! SQLite repositories for the patient and appointment stores.

pub mod appointment_repository;
pub mod patient_repository;

pub use appointment_repository::AppointmentRepository;
pub use patient_repository::PatientRepository;
