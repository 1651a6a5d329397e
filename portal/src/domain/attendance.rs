//! Daily attendance records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::wire::wire_enum;
use super::{AttendanceId, EnrollmentId, PersonId};

wire_enum! {
    /// Whether the student attended.
    pub enum Presence {
        /// Attended.
        Present => "Si" | "Sí",
        /// Absent.
        Absent => "No",
    }
}

/// One attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// Backend identifier.
    pub id: AttendanceId,
    /// Enrollment the session belongs to.
    pub enrollment_id: EnrollmentId,
    /// Student.
    pub person_id: PersonId,
    /// Calendar day of the session.
    pub date: NaiveDate,
    /// Whether the student attended.
    pub presence: Presence,
}

/// Creation payload for an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAttendance {
    /// Enrollment the session belongs to.
    pub enrollment_id: EnrollmentId,
    /// Student.
    pub person_id: PersonId,
    /// Calendar day of the session.
    pub date: NaiveDate,
    /// Whether the student attended.
    pub presence: Presence,
}
