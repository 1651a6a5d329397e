//! Enrollments bind a person to an offering and track the academic outcome.

use serde::{Deserialize, Serialize};

use super::wire::wire_enum;
use super::{EnrollmentId, OfferingId, PersonId};

wire_enum! {
    /// Administrative lifecycle of an enrollment.
    pub enum EnrollmentStatus {
        /// Created by a submission, awaiting payment approval.
        PreEnrolled => "Preinscrito",
        /// Payment approved; the student is attending.
        Active => "Activo",
        /// Offering finished.
        Finished => "Finalizado",
        /// Payment rejected or enrollment withdrawn.
        Cancelled => "Cancelado",
    }
}

wire_enum! {
    /// Academic result stored on an enrollment.
    pub enum AcademicResult {
        /// Not every module has been graded.
        Pending => "Pendiente",
        /// Every module passed; certificate eligible.
        Approved => "Aprobado",
        /// Failed outright (also used when a payment is rejected).
        Failed => "Reprobado",
        /// At least one module failed.
        Disapproved => "Desaprobado",
    }
}

/// An enrollment as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Backend identifier.
    pub id: EnrollmentId,
    /// Enrolled person.
    pub person_id: PersonId,
    /// Offering enrolled in.
    pub offering_id: OfferingId,
    /// Administrative status.
    pub status: EnrollmentStatus,
    /// Stored academic result.
    pub result: AcademicResult,
}

/// Creation payload for an enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnrollment {
    /// Person to enroll.
    pub person_id: PersonId,
    /// Target offering.
    pub offering_id: OfferingId,
    /// Initial status.
    pub status: EnrollmentStatus,
    /// Initial result.
    pub result: AcademicResult,
}

impl NewEnrollment {
    /// Pre-enrollment created by the submission saga.
    pub const fn pre_enrollment(person_id: PersonId, offering_id: OfferingId) -> Self {
        Self {
            person_id,
            offering_id,
            status: EnrollmentStatus::PreEnrolled,
            result: AcademicResult::Pending,
        }
    }
}

/// Partial update of an enrollment; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnrollmentUpdate {
    /// New status.
    pub status: Option<EnrollmentStatus>,
    /// New result.
    pub result: Option<AcademicResult>,
}

impl EnrollmentUpdate {
    /// Update touching only the result.
    pub const fn result(result: AcademicResult) -> Self {
        Self {
            status: None,
            result: Some(result),
        }
    }

    /// Update touching status and result.
    pub const fn status_and_result(status: EnrollmentStatus, result: AcademicResult) -> Self {
        Self {
            status: Some(status),
            result: Some(result),
        }
    }

    /// Whether the update would change nothing.
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.result.is_none()
    }
}
