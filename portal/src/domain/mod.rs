//! Domain primitives, services, and ports.
//!
//! Purpose: model the portal's records (people, offerings, enrollments,
//! payments, grades, attendance) and the workflows that span several remote
//! calls. Nothing here knows about HTTP, the filesystem, or the command line;
//! adapters reach the domain only through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::DomainError`) and ErrorCode.
//! - Entities and their typed ids.
//! - The academic state calculator ([`derive_result`], [`AcademicSnapshot`]).
//! - Services: [`EnrollmentSubmissionService`], [`PaymentApprovalService`],
//!   [`CourseOverviewService`], [`GradingService`], [`AttendanceService`],
//!   [`TeacherRegistrationService`], [`CertificateService`], and
//!   [`SupportContentService`].

pub mod academic_state;
pub mod approval;
pub mod attendance;
pub mod attendance_service;
pub mod certificate_service;
pub mod course;
pub mod course_overview;
pub mod enrollment;
pub mod error;
pub mod grading;
pub mod grading_service;
pub mod idempotency;
pub mod ids;
pub mod payment;
pub mod person;
pub mod ports;
pub mod receipt;
pub mod submission;
pub mod support_content;
pub mod support_content_service;
pub mod teacher_registration;
pub mod teaching;
pub(crate) mod wire;

mod gateway_mapping;

pub(crate) use self::gateway_mapping::map_gateway_error;

pub use self::academic_state::{
    AcademicSnapshot, attendance_percent, derive_result, is_certificate_eligible, rounded_percent,
};
pub use self::approval::{
    ApprovalPorts, ApprovalReport, ApprovalStep, PartialSagaFailure, PaymentApprovalService,
    StepOutcome,
};
pub use self::attendance::{Attendance, NewAttendance, Presence};
pub use self::attendance_service::AttendanceService;
pub use self::certificate_service::{CertificateDocument, CertificateService};
pub use self::course::{Course, CourseOffering, CourseType, Quota};
pub use self::course_overview::{
    CourseOverview, CourseOverviewPorts, CourseOverviewService, ModuleProgress,
};
pub use self::enrollment::{
    AcademicResult, Enrollment, EnrollmentStatus, EnrollmentUpdate, NewEnrollment,
};
pub use self::error::{DomainError as Error, DomainErrorValidationError, ErrorCode};
pub use self::grading::{GradeState, GradeUpsert, ModuleGrade};
pub use self::grading_service::GradingService;
pub use self::ids::{
    AssignmentId, AttendanceId, ContentId, CourseId, EnrollmentId, GradeId, ModuleId,
    OfferingId, PaymentId, PersonId, TeacherId,
};
pub use self::payment::{
    DEFAULT_PAYMENT_METHOD, NewPayment, Payment, PaymentDecision, PaymentDetail, PaymentStatus,
};
pub use self::person::{Person, Role};
pub use self::receipt::{
    ALLOWED_RECEIPT_TYPES, MAX_RECEIPT_BYTES, ReceiptFile, ReceiptRuleViolation, StoredReceipt,
    receipt_object_path,
};
pub use self::submission::{
    EnrollmentSubmissionService, SubmissionOutcome, SubmissionPorts, SubmissionRequest,
    SubmissionStep,
};
pub use self::support_content::{SupportContent, SupportContentDraft};
pub use self::support_content_service::SupportContentService;
pub use self::teacher_registration::{TeacherRegistration, TeacherRegistrationService};
pub use self::teaching::{
    Module, ModuleAssignment, NewModuleAssignment, NewTeacher, Teacher, assignment_for_module,
};
pub use self::wire::UnknownWireValue;

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use portal::domain::{DomainResult, Error};
///
/// fn precondition() -> DomainResult<()> {
///     Err(Error::validation("el pago ya fue procesado"))
/// }
/// assert!(precondition().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
