//! Attendance taking: one record per enrollment and date.

use std::sync::Arc;

use tracing::info;

use super::gateway_mapping::map_gateway_error;
use super::ports::AttendanceGateway;
use super::{Attendance, EnrollmentId, Error, NewAttendance, PersonId, attendance_percent};

/// Records and reads attendance.
pub struct AttendanceService {
    attendance: Arc<dyn AttendanceGateway>,
}

impl AttendanceService {
    /// Build the service.
    pub fn new(attendance: Arc<dyn AttendanceGateway>) -> Self {
        Self { attendance }
    }

    /// Attendance history of an enrollment and the share of sessions attended.
    ///
    /// # Errors
    ///
    /// `Remote` when the records cannot be read.
    pub async fn history(
        &self,
        person: PersonId,
        enrollment: EnrollmentId,
    ) -> Result<(Vec<Attendance>, u8), Error> {
        let mut records = self
            .attendance
            .list_for_enrollment(person, enrollment)
            .await
            .map_err(|err| map_gateway_error("No se pudo cargar la asistencia", &err))?;
        records.sort_by_key(|record| record.date);
        let percent = attendance_percent(&records);
        Ok((records, percent))
    }

    /// Record presence for one date, updating the record for that date if it
    /// already exists.
    ///
    /// # Errors
    ///
    /// `Remote` when the history read or the write fails.
    pub async fn record(&self, entry: NewAttendance) -> Result<Attendance, Error> {
        let (records, _) = self.history(entry.person_id, entry.enrollment_id).await?;
        let stored = match records.into_iter().find(|record| record.date == entry.date) {
            Some(record) if record.presence == entry.presence => return Ok(record),
            Some(record) => self.attendance.update(record.id, entry.presence).await,
            None => self.attendance.create(&entry).await,
        }
        .map_err(|err| map_gateway_error("No se pudo registrar la asistencia", &err))?;
        info!(
            enrollment = %entry.enrollment_id,
            date = %entry.date,
            presence = %entry.presence,
            "attendance recorded"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttendanceId, Presence};
    use crate::test_support::{InMemoryBackend, Operation};
    use chrono::NaiveDate;

    fn entry(day: u32, presence: Presence) -> NewAttendance {
        NewAttendance {
            enrollment_id: EnrollmentId::new(40),
            person_id: PersonId::new(7),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap_or_default(),
            presence,
        }
    }

    #[tokio::test]
    async fn same_date_updates_instead_of_duplicating() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = AttendanceService::new(backend.clone());

        let first = service
            .record(entry(4, Presence::Absent))
            .await
            .expect("created");
        let second = service
            .record(entry(4, Presence::Present))
            .await
            .expect("updated");

        assert_eq!(first.id, second.id);
        assert_eq!(second.presence, Presence::Present);
        let state = backend.snapshot();
        assert_eq!(state.attendance.len(), 1);
        assert_eq!(state.calls_to(Operation::CreateAttendance), 1);
        assert_eq!(state.calls_to(Operation::UpdateAttendance), 1);
    }

    #[tokio::test]
    async fn repeated_entry_sends_nothing() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = AttendanceService::new(backend.clone());
        service
            .record(entry(4, Presence::Present))
            .await
            .expect("created");

        service
            .record(entry(4, Presence::Present))
            .await
            .expect("no-op");

        assert_eq!(backend.calls_to(Operation::CreateAttendance), 1);
        assert_eq!(backend.calls_to(Operation::UpdateAttendance), 0);
    }

    #[tokio::test]
    async fn history_is_sorted_with_percentage() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = AttendanceService::new(backend.clone());
        let days = [
            (11, Presence::Absent),
            (4, Presence::Present),
            (18, Presence::Present),
        ];
        for (day, presence) in days {
            service.record(entry(day, presence)).await.expect("recorded");
        }

        let (records, percent) = service
            .history(PersonId::new(7), EnrollmentId::new(40))
            .await
            .expect("history loads");

        let days: Vec<_> = records.iter().map(|r| r.date).collect();
        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);
        assert_eq!(percent, 67);
        assert!(records.iter().all(|r| r.id != AttendanceId::new(0)));
    }
}
