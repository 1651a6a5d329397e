//! Derived academic state: aggregate result, certificate eligibility, and
//! progress metrics.
//!
//! Everything here is a pure function of the grades and attendance handed in.
//! Persisting the derived result is the overview service's job.

use serde::{Deserialize, Serialize};

use super::{AcademicResult, Attendance, GradeState, ModuleGrade, Presence};

/// Aggregate result for a set of module grades.
///
/// - empty, or any `Pendiente` → `Pendiente`
/// - otherwise any `Desaprobó` → `Desaprobado`
/// - otherwise all `Aprobó` → `Aprobado`
/// - otherwise → `Reprobado`
///
/// # Examples
/// ```
/// use portal::domain::{AcademicResult, GradeState, derive_result};
///
/// let result = derive_result([GradeState::Passed, GradeState::Pending]);
/// assert_eq!(result, AcademicResult::Pending);
/// ```
pub fn derive_result(grades: impl IntoIterator<Item = GradeState>) -> AcademicResult {
    let states: Vec<GradeState> = grades.into_iter().collect();
    if states.is_empty() || states.contains(&GradeState::Pending) {
        return AcademicResult::Pending;
    }
    if states.contains(&GradeState::Failed) {
        return AcademicResult::Disapproved;
    }
    if states.iter().all(|state| *state == GradeState::Passed) {
        return AcademicResult::Approved;
    }
    AcademicResult::Failed
}

/// Whether an enrollment with this stored result may download a certificate.
pub const fn is_certificate_eligible(result: AcademicResult) -> bool {
    matches!(result, AcademicResult::Approved)
}

/// `round(part / whole * 100)`, half rounding up, `0` when `whole` is zero,
/// capped at 100.
///
/// # Examples
/// ```
/// use portal::domain::rounded_percent;
///
/// assert_eq!(rounded_percent(2, 3), 67);
/// assert_eq!(rounded_percent(1, 0), 0);
/// ```
pub fn rounded_percent(part: usize, whole: usize) -> u8 {
    let numerator = part.saturating_mul(200).saturating_add(whole);
    let percent = numerator
        .checked_div(whole.saturating_mul(2))
        .unwrap_or(0)
        .min(100);
    u8::try_from(percent).unwrap_or(100)
}

/// Attendance percentage over the recorded sessions.
pub fn attendance_percent(records: &[Attendance]) -> u8 {
    let present = records
        .iter()
        .filter(|record| record.presence == Presence::Present)
        .count();
    rounded_percent(present, records.len())
}

/// Derived academic figures for one enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicSnapshot {
    /// Aggregate result derived from the grades.
    pub result: AcademicResult,
    /// Modules in the offering.
    pub total_modules: usize,
    /// Grades no longer pending.
    pub evaluated: usize,
    /// Grades passed.
    pub passed: usize,
    /// `round(evaluated / total_modules * 100)`.
    pub progress_percent: u8,
    /// `round(passed / evaluated * 100)`.
    pub approval_percent: u8,
}

impl AcademicSnapshot {
    /// Compute the snapshot for `grades` over an offering with `total_modules`.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::{
    ///     AcademicResult, AcademicSnapshot, GradeId, GradeState, ModuleGrade, ModuleId,
    ///     OfferingId, PersonId,
    /// };
    ///
    /// let grade = |id, state| ModuleGrade {
    ///     id: GradeId::new(id),
    ///     person_id: PersonId::new(1),
    ///     offering_id: OfferingId::new(1),
    ///     module_id: ModuleId::new(id),
    ///     state,
    /// };
    /// let grades = [
    ///     grade(1, GradeState::Passed),
    ///     grade(2, GradeState::Pending),
    ///     grade(3, GradeState::Passed),
    /// ];
    /// let snapshot = AcademicSnapshot::compute(&grades, 3);
    /// assert_eq!(snapshot.result, AcademicResult::Pending);
    /// assert_eq!(snapshot.progress_percent, 67);
    /// assert!(!snapshot.is_certificate_eligible());
    /// ```
    pub fn compute(grades: &[ModuleGrade], total_modules: usize) -> Self {
        let evaluated = grades
            .iter()
            .filter(|grade| grade.state.is_evaluated())
            .count();
        let passed = grades
            .iter()
            .filter(|grade| grade.state == GradeState::Passed)
            .count();
        Self {
            result: derive_result(grades.iter().map(|grade| grade.state)),
            total_modules,
            evaluated,
            passed,
            progress_percent: rounded_percent(evaluated, total_modules),
            approval_percent: rounded_percent(passed, evaluated),
        }
    }

    /// Eligibility according to the derived result.
    pub const fn is_certificate_eligible(&self) -> bool {
        is_certificate_eligible(self.result)
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for the aggregate result rules and percentage maths.

    use super::*;
    use crate::domain::{AttendanceId, EnrollmentId, GradeId, ModuleId, OfferingId, PersonId};
    use chrono::NaiveDate;
    use rstest::rstest;
    use GradeState::{Failed, Passed, Pending};

    fn grade(module: i64, state: GradeState) -> ModuleGrade {
        ModuleGrade {
            id: GradeId::new(module),
            person_id: PersonId::new(1),
            offering_id: OfferingId::new(1),
            module_id: ModuleId::new(module),
            state,
        }
    }

    #[rstest]
    #[case::empty(vec![], AcademicResult::Pending)]
    #[case::single_pending(vec![Pending], AcademicResult::Pending)]
    #[case::pending_beats_failure(vec![Failed, Pending, Passed], AcademicResult::Pending)]
    #[case::any_failure(vec![Passed, Failed, Passed], AcademicResult::Disapproved)]
    #[case::all_failed(vec![Failed, Failed], AcademicResult::Disapproved)]
    #[case::all_passed(vec![Passed, Passed, Passed], AcademicResult::Approved)]
    fn derives_aggregate_result(#[case] states: Vec<GradeState>, #[case] expected: AcademicResult) {
        assert_eq!(derive_result(states), expected);
    }

    #[test]
    fn mixed_pending_example_matches_expected_figures() {
        let grades = [grade(1, Passed), grade(2, Pending), grade(3, Passed)];
        let snapshot = AcademicSnapshot::compute(&grades, 3);

        assert_eq!(snapshot.result, AcademicResult::Pending);
        assert_eq!(snapshot.progress_percent, 67);
        assert_eq!(snapshot.approval_percent, 100);
        assert!(!snapshot.is_certificate_eligible());
    }

    #[test]
    fn all_passed_is_certificate_eligible() {
        let grades = [grade(1, Passed), grade(2, Passed)];
        let snapshot = AcademicSnapshot::compute(&grades, 2);

        assert_eq!(snapshot.result, AcademicResult::Approved);
        assert_eq!(snapshot.progress_percent, 100);
        assert!(snapshot.is_certificate_eligible());
    }

    #[rstest]
    #[case(AcademicResult::Approved, true)]
    #[case(AcademicResult::Pending, false)]
    #[case(AcademicResult::Disapproved, false)]
    #[case(AcademicResult::Failed, false)]
    fn only_approved_results_are_eligible(#[case] result: AcademicResult, #[case] eligible: bool) {
        assert_eq!(is_certificate_eligible(result), eligible);
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(0, 4, 0)]
    #[case(1, 3, 33)]
    #[case(2, 3, 67)]
    #[case(1, 8, 13)]
    #[case(1, 2, 50)]
    #[case(3, 3, 100)]
    #[case(5, 3, 100)]
    fn rounds_percentages_half_up(#[case] part: usize, #[case] whole: usize, #[case] expected: u8) {
        assert_eq!(rounded_percent(part, whole), expected);
    }

    #[test]
    fn attendance_percent_counts_present_sessions() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date");
        let record = |id, presence| Attendance {
            id: AttendanceId::new(id),
            enrollment_id: EnrollmentId::new(1),
            person_id: PersonId::new(1),
            date: day,
            presence,
        };
        let records = [
            record(1, Presence::Present),
            record(2, Presence::Absent),
            record(3, Presence::Present),
        ];
        assert_eq!(attendance_percent(&records), 67);
        assert_eq!(attendance_percent(&[]), 0);
    }
}
