//! Student view of one enrollment: modules, grades, attendance, material.
//!
//! Building the overview also writes the derived academic result back to the
//! enrollment when it differs from the stored one, so certificate eligibility
//! on the backend follows the grades.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::gateway_mapping::map_gateway_error;
use super::ports::{
    AttendanceGateway, EnrollmentGateway, GatewayError, ModuleGradeGateway,
    SupportContentGateway, TeachingGateway,
};
use super::{
    AcademicResult, AcademicSnapshot, Attendance, Enrollment, EnrollmentId, EnrollmentUpdate,
    Error, GradeState, Module, ModuleAssignment, ModuleGrade, ModuleId, SupportContent,
    assignment_for_module, attendance_percent, is_certificate_eligible,
};

/// Port bundle required by [`CourseOverviewService`].
pub struct CourseOverviewPorts {
    /// Enrollment read and result write-through.
    pub enrollments: Arc<dyn EnrollmentGateway>,
    /// Modules and teacher assignments.
    pub teaching: Arc<dyn TeachingGateway>,
    /// Module grades.
    pub grades: Arc<dyn ModuleGradeGateway>,
    /// Attendance history.
    pub attendance: Arc<dyn AttendanceGateway>,
    /// Support material.
    pub contents: Arc<dyn SupportContentGateway>,
}

/// One module with its teacher and the student's grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleProgress {
    /// Module.
    pub module: Module,
    /// First assignment found for the module.
    pub teacher: Option<ModuleAssignment>,
    /// Grade, `Pendiente` when none is recorded.
    pub grade: GradeState,
}

/// Everything a student sees for one enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseOverview {
    /// Enrollment, with the result as stored before write-through.
    pub enrollment: Enrollment,
    /// Modules in backend order.
    pub modules: Vec<ModuleProgress>,
    /// Derived academic state.
    pub snapshot: AcademicSnapshot,
    /// Attendance history.
    pub attendance: Vec<Attendance>,
    /// Share of sessions attended.
    pub attendance_percent: u8,
    /// Published support material.
    pub contents: Vec<SupportContent>,
    /// Whether the derived result was written to the enrollment.
    pub result_written: bool,
    /// Whether a certificate can be requested.
    pub certificate_eligible: bool,
    /// Non-critical problems (optional sections, write-through).
    pub warnings: Vec<String>,
}

/// Assembles [`CourseOverview`]s.
pub struct CourseOverviewService {
    enrollments: Arc<dyn EnrollmentGateway>,
    teaching: Arc<dyn TeachingGateway>,
    grades: Arc<dyn ModuleGradeGateway>,
    attendance: Arc<dyn AttendanceGateway>,
    contents: Arc<dyn SupportContentGateway>,
}

impl CourseOverviewService {
    /// Build the service from its ports.
    pub fn new(ports: CourseOverviewPorts) -> Self {
        Self {
            enrollments: ports.enrollments,
            teaching: ports.teaching,
            grades: ports.grades,
            attendance: ports.attendance,
            contents: ports.contents,
        }
    }

    /// Load the overview of `enrollment_id`.
    ///
    /// Modules and grades are required; teacher assignments, attendance, and
    /// support material degrade to empty with a warning.
    ///
    /// # Errors
    ///
    /// `Remote` when the enrollment, its modules, or its grades cannot be read.
    pub async fn overview(&self, enrollment_id: EnrollmentId) -> Result<CourseOverview, Error> {
        let enrollment = self
            .enrollments
            .find(enrollment_id)
            .await
            .map_err(|err| map_gateway_error("No se pudo cargar la matrícula", &err))?;
        let modules = self
            .teaching
            .modules_for_offering(enrollment.offering_id)
            .await
            .map_err(|err| map_gateway_error("No se pudieron cargar los módulos", &err))?;
        let grades = self
            .grades
            .list_for_person(enrollment.person_id, enrollment.offering_id)
            .await
            .map_err(|err| map_gateway_error("No se pudieron cargar las notas", &err))?;

        let mut warnings = Vec::new();
        let assignments = optional(
            self.teaching
                .assignments_for_offering(enrollment.offering_id)
                .await,
            "No se pudieron cargar los docentes",
            &mut warnings,
        );
        let attendance = optional(
            self.attendance
                .list_for_enrollment(enrollment.person_id, enrollment.id)
                .await,
            "No se pudo cargar la asistencia",
            &mut warnings,
        );
        let contents = optional(
            self.contents
                .list_for_offering(enrollment.offering_id)
                .await,
            "No se pudo cargar el material de apoyo",
            &mut warnings,
        );

        // The result aggregates every grade of the person in the offering;
        // the module listing only shapes the per-module view and progress.
        let snapshot = AcademicSnapshot::compute(&grades, modules.len());
        let progress = modules
            .into_iter()
            .map(|module| ModuleProgress {
                teacher: assignment_for_module(&assignments, module.id).cloned(),
                grade: grade_for(&grades, module.id),
                module,
            })
            .collect();

        let result_written = match self.write_through(&enrollment, snapshot.result).await {
            Ok(written) => written,
            Err(err) => {
                warn!(
                    enrollment = %enrollment.id,
                    error = %err,
                    "academic result write-through failed"
                );
                warnings.push(format!("No se pudo actualizar el resultado: {err}"));
                false
            }
        };
        let stored = if result_written {
            snapshot.result
        } else {
            enrollment.result
        };

        Ok(CourseOverview {
            attendance_percent: attendance_percent(&attendance),
            certificate_eligible: is_certificate_eligible(stored),
            enrollment,
            modules: progress,
            snapshot,
            attendance,
            contents,
            result_written,
            warnings,
        })
    }

    /// Recompute the result of `enrollment_id` and store it if it changed.
    ///
    /// # Errors
    ///
    /// `Remote` when any read or the write fails.
    pub async fn sync_result(
        &self,
        enrollment_id: EnrollmentId,
    ) -> Result<AcademicSnapshot, Error> {
        let enrollment = self
            .enrollments
            .find(enrollment_id)
            .await
            .map_err(|err| map_gateway_error("No se pudo cargar la matrícula", &err))?;
        let modules = self
            .teaching
            .modules_for_offering(enrollment.offering_id)
            .await
            .map_err(|err| map_gateway_error("No se pudieron cargar los módulos", &err))?;
        let grades = self
            .grades
            .list_for_person(enrollment.person_id, enrollment.offering_id)
            .await
            .map_err(|err| map_gateway_error("No se pudieron cargar las notas", &err))?;
        let snapshot = AcademicSnapshot::compute(&grades, modules.len());
        self.write_through(&enrollment, snapshot.result)
            .await
            .map_err(|err| map_gateway_error("No se pudo actualizar el resultado", &err))?;
        Ok(snapshot)
    }

    async fn write_through(
        &self,
        enrollment: &Enrollment,
        derived: AcademicResult,
    ) -> Result<bool, GatewayError> {
        if enrollment.result == derived {
            return Ok(false);
        }
        debug!(
            enrollment = %enrollment.id,
            from = %enrollment.result,
            to = %derived,
            "writing derived academic result"
        );
        self.enrollments
            .update(enrollment.id, EnrollmentUpdate::result(derived))
            .await?;
        Ok(true)
    }
}

fn grade_for(grades: &[ModuleGrade], module: ModuleId) -> GradeState {
    grades
        .iter()
        .find(|grade| grade.module_id == module)
        .map_or(GradeState::Pending, |grade| grade.state)
}

fn optional<T>(
    loaded: Result<Vec<T>, GatewayError>,
    context: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    loaded.unwrap_or_else(|err| {
        warn!(error = %err, "{context}");
        warnings.push(format!("{context}: {err}"));
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AttendanceId, EnrollmentStatus, GradeId, OfferingId, PersonId, Presence, TeacherId,
    };
    use crate::test_support::{InMemoryBackend, Operation, fixtures};
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    const ENROLLMENT: i64 = 40;

    #[fixture]
    fn backend() -> Arc<InMemoryBackend> {
        let backend = Arc::new(InMemoryBackend::new());
        backend.with_state(|state| {
            state.enrollments.insert(
                EnrollmentId::new(ENROLLMENT),
                fixtures::enrollment(
                    ENROLLMENT,
                    7,
                    3,
                    EnrollmentStatus::Active,
                    AcademicResult::Pending,
                ),
            );
            for id in [1, 2, 3] {
                state.modules.insert(ModuleId::new(id), fixtures::module(id, 3));
            }
            for (id, module, grade) in [
                (11, 1, GradeState::Passed),
                (12, 2, GradeState::Pending),
                (13, 3, GradeState::Passed),
            ] {
                state
                    .grades
                    .insert(GradeId::new(id), fixtures::grade(id, 7, 3, module, grade));
            }
            state.assignments.push(ModuleAssignment {
                id: crate::domain::AssignmentId::new(1),
                module_id: ModuleId::new(1),
                teacher_id: TeacherId::new(5),
                offering_id: OfferingId::new(3),
                teacher_name: Some("Ana Ruiz".to_owned()),
            });
            for (id, day, presence) in [
                (1, 5, Presence::Present),
                (2, 12, Presence::Absent),
                (3, 19, Presence::Present),
            ] {
                state.attendance.insert(
                    AttendanceId::new(id),
                    Attendance {
                        id: AttendanceId::new(id),
                        enrollment_id: EnrollmentId::new(ENROLLMENT),
                        person_id: PersonId::new(7),
                        date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap_or_default(),
                        presence,
                    },
                );
            }
        });
        backend
    }

    fn service(backend: &Arc<InMemoryBackend>) -> CourseOverviewService {
        CourseOverviewService::new(CourseOverviewPorts {
            enrollments: backend.clone(),
            teaching: backend.clone(),
            grades: backend.clone(),
            attendance: backend.clone(),
            contents: backend.clone(),
        })
    }

    #[rstest]
    #[tokio::test]
    async fn pending_module_keeps_result_pending(backend: Arc<InMemoryBackend>) {
        let overview = service(&backend)
            .overview(EnrollmentId::new(ENROLLMENT))
            .await
            .expect("overview loads");

        assert_eq!(overview.snapshot.result, AcademicResult::Pending);
        assert_eq!(overview.snapshot.progress_percent, 67);
        assert_eq!(overview.attendance_percent, 67);
        assert!(!overview.certificate_eligible);
        assert!(!overview.result_written);
        assert_eq!(overview.modules.len(), 3);
        assert_eq!(
            overview.modules[0].teacher.as_ref().and_then(|t| t.teacher_name.as_deref()),
            Some("Ana Ruiz")
        );
        assert!(overview.modules[1].teacher.is_none());
        assert_eq!(overview.modules[1].grade, GradeState::Pending);
        assert_eq!(backend.calls_to(Operation::UpdateEnrollment), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn all_passed_writes_approved_through(backend: Arc<InMemoryBackend>) {
        backend.with_state(|state| {
            if let Some(grade) = state.grades.get_mut(&GradeId::new(12)) {
                grade.state = GradeState::Passed;
            }
        });

        let overview = service(&backend)
            .overview(EnrollmentId::new(ENROLLMENT))
            .await
            .expect("overview loads");

        assert_eq!(overview.snapshot.result, AcademicResult::Approved);
        assert!(overview.result_written);
        assert!(overview.certificate_eligible);
        assert_eq!(
            backend.snapshot().enrollments[&EnrollmentId::new(ENROLLMENT)].result,
            AcademicResult::Approved
        );
    }

    #[rstest]
    #[tokio::test]
    async fn optional_sections_degrade_to_warnings(backend: Arc<InMemoryBackend>) {
        backend.fail(Operation::ListAttendance);
        backend.fail(Operation::ListContents);
        backend.fail(Operation::ListAssignments);

        let overview = service(&backend)
            .overview(EnrollmentId::new(ENROLLMENT))
            .await
            .expect("overview still loads");

        assert!(overview.attendance.is_empty());
        assert_eq!(overview.attendance_percent, 0);
        assert!(overview.modules.iter().all(|m| m.teacher.is_none()));
        assert_eq!(overview.warnings.len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn write_through_failure_is_a_warning(backend: Arc<InMemoryBackend>) {
        backend.with_state(|state| {
            if let Some(grade) = state.grades.get_mut(&GradeId::new(12)) {
                grade.state = GradeState::Failed;
            }
        });
        backend.fail(Operation::UpdateEnrollment);

        let overview = service(&backend)
            .overview(EnrollmentId::new(ENROLLMENT))
            .await
            .expect("overview still loads");

        assert_eq!(overview.snapshot.result, AcademicResult::Disapproved);
        assert!(!overview.result_written);
        assert_eq!(overview.warnings.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_grades_fail_the_overview(backend: Arc<InMemoryBackend>) {
        backend.fail(Operation::ListPersonGrades);

        let err = service(&backend)
            .overview(EnrollmentId::new(ENROLLMENT))
            .await
            .expect_err("grades are required");

        assert_eq!(err.code(), crate::domain::ErrorCode::Remote);
    }

    #[rstest]
    #[tokio::test]
    async fn sync_result_surfaces_write_failures(backend: Arc<InMemoryBackend>) {
        backend.with_state(|state| {
            if let Some(grade) = state.grades.get_mut(&GradeId::new(12)) {
                grade.state = GradeState::Passed;
            }
        });
        backend.fail(Operation::UpdateEnrollment);

        let err = service(&backend)
            .sync_result(EnrollmentId::new(ENROLLMENT))
            .await
            .expect_err("write fails");

        assert!(err.message().starts_with("No se pudo actualizar el resultado"));
    }

    #[rstest]
    #[tokio::test]
    async fn eligibility_follows_the_stored_result(backend: Arc<InMemoryBackend>) {
        backend.with_state(|state| {
            if let Some(grade) = state.grades.get_mut(&GradeId::new(12)) {
                grade.state = GradeState::Passed;
            }
        });
        backend.fail(Operation::UpdateEnrollment);

        let overview = service(&backend)
            .overview(EnrollmentId::new(ENROLLMENT))
            .await
            .expect("overview still loads");

        assert_eq!(overview.snapshot.result, AcademicResult::Approved);
        assert!(!overview.result_written);
        assert_eq!(overview.enrollment.result, AcademicResult::Pending);
        assert!(!overview.certificate_eligible);
    }

    #[rstest]
    #[tokio::test]
    async fn grades_outside_the_module_listing_still_count(backend: Arc<InMemoryBackend>) {
        backend.with_state(|state| {
            state.modules.clear();
            state.grades.remove(&GradeId::new(12));
            if let Some(enrollment) = state.enrollments.get_mut(&EnrollmentId::new(ENROLLMENT)) {
                enrollment.result = AcademicResult::Approved;
            }
        });

        let overview = service(&backend)
            .overview(EnrollmentId::new(ENROLLMENT))
            .await
            .expect("overview loads");

        assert_eq!(overview.snapshot.result, AcademicResult::Approved);
        assert!(overview.modules.is_empty());
        assert!(!overview.result_written);
        assert!(overview.certificate_eligible);
        assert_eq!(backend.calls_to(Operation::UpdateEnrollment), 0);
        assert_eq!(
            backend.snapshot().enrollments[&EnrollmentId::new(ENROLLMENT)].result,
            AcademicResult::Approved
        );
    }

    #[rstest]
    #[tokio::test]
    async fn sync_aggregates_every_grade(backend: Arc<InMemoryBackend>) {
        backend.with_state(|state| {
            state.modules.remove(&ModuleId::new(3));
            if let Some(grade) = state.grades.get_mut(&GradeId::new(12)) {
                grade.state = GradeState::Passed;
            }
            if let Some(grade) = state.grades.get_mut(&GradeId::new(13)) {
                grade.state = GradeState::Failed;
            }
        });

        let snapshot = service(&backend)
            .sync_result(EnrollmentId::new(ENROLLMENT))
            .await
            .expect("sync succeeds");

        assert_eq!(snapshot.result, AcademicResult::Disapproved);
        assert_eq!(snapshot.total_modules, 2);
        assert_eq!(snapshot.progress_percent, 100);
        assert_eq!(
            backend.snapshot().enrollments[&EnrollmentId::new(ENROLLMENT)].result,
            AcademicResult::Disapproved
        );
    }
}
