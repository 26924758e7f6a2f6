pub mod appointment;
pub mod patient;

pub use appointment::{
    Appointment, AppointmentKind, AppointmentStatus, DayWindow, DEFAULT_DURATION_MINUTES,
};
pub use patient::{Address, MedicalHistoryEntry, Patient};
