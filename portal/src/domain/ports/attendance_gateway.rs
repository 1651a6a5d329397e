//! Driven port for attendance records.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::{
    Attendance, AttendanceId, EnrollmentId, NewAttendance, PersonId, Presence,
};

/// Port for attendance records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceGateway: Send + Sync {
    /// Records of one person for one enrollment.
    async fn list_for_enrollment(
        &self,
        person: PersonId,
        enrollment: EnrollmentId,
    ) -> Result<Vec<Attendance>, GatewayError>;

    /// Create a record.
    async fn create(&self, attendance: &NewAttendance) -> Result<Attendance, GatewayError>;

    /// Change the presence flag of an existing record.
    async fn update(
        &self,
        id: AttendanceId,
        presence: Presence,
    ) -> Result<Attendance, GatewayError>;
}
