//! Domain model for an appointment.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default appointment length in minutes when the payload omits one.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Domain model representing a scheduled appointment.
///
/// `date` is the calendar day key (time-of-day truncated); `time` is kept as
/// a zero-padded 24h "HH:MM" string and is compared lexicographically, which
/// is only valid because of the zero padding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub date: NaiveDate,
    pub time: String,
    /// Duration in minutes
    pub duration: i64,
    pub kind: AppointmentKind,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Generate a unique ID for an appointment
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Inclusive timestamp range spanning one calendar day in local time,
/// used by the by-date query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayWindow {
    pub start: chrono::NaiveDateTime,
    pub end: chrono::NaiveDateTime,
}

impl DayWindow {
    /// Build the window [00:00:00.000, 23:59:59.999] for the given day.
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            start: day.and_time(chrono::NaiveTime::MIN),
            end: day
                .and_hms_milli_opt(23, 59, 59, 999)
                .expect("23:59:59.999 is a valid time of day"),
        }
    }

    /// First calendar day covered by the window
    pub fn start_day(&self) -> NaiveDate {
        self.start.date()
    }

    /// Last calendar day covered by the window
    pub fn end_day(&self) -> NaiveDate {
        self.end.date()
    }
}

/// What the appointment is for. Serialized with the clinic's display labels
/// ("Follow-up", not "FollowUp").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentKind {
    Checkup,
    Cleaning,
    Surgery,
    Emergency,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentKind::Checkup => write!(f, "Checkup"),
            AppointmentKind::Cleaning => write!(f, "Cleaning"),
            AppointmentKind::Surgery => write!(f, "Surgery"),
            AppointmentKind::Emergency => write!(f, "Emergency"),
            AppointmentKind::FollowUp => write!(f, "Follow-up"),
        }
    }
}

impl FromStr for AppointmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Checkup" => Ok(AppointmentKind::Checkup),
            "Cleaning" => Ok(AppointmentKind::Cleaning),
            "Surgery" => Ok(AppointmentKind::Surgery),
            "Emergency" => Ok(AppointmentKind::Emergency),
            "Follow-up" => Ok(AppointmentKind::FollowUp),
            other => Err(format!("`{}` is not a valid appointment type", other)),
        }
    }
}

/// Lifecycle status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    #[serde(rename = "No-show")]
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "Scheduled"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
            AppointmentStatus::NoShow => write!(f, "No-show"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(AppointmentStatus::Scheduled),
            "Completed" => Ok(AppointmentStatus::Completed),
            "Cancelled" => Ok(AppointmentStatus::Cancelled),
            "No-show" => Ok(AppointmentStatus::NoShow),
            other => Err(format!("`{}` is not a valid appointment status", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_round_trip() {
        for kind in [
            AppointmentKind::Checkup,
            AppointmentKind::Cleaning,
            AppointmentKind::Surgery,
            AppointmentKind::Emergency,
            AppointmentKind::FollowUp,
        ] {
            let label = kind.to_string();
            assert_eq!(label.parse::<AppointmentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn status_defaults_to_scheduled() {
        assert_eq!(AppointmentStatus::default(), AppointmentStatus::Scheduled);
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert!("Consultation".parse::<AppointmentKind>().is_err());
        assert!("Pending".parse::<AppointmentStatus>().is_err());
        // Membership is case-sensitive, matching the stored labels
        assert!("checkup".parse::<AppointmentKind>().is_err());
    }
}
