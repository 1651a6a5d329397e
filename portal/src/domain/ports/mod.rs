//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Every remote resource gateway reports failures as [`GatewayError`]; the
//! receipt store and the submission journal have their own error enums.

mod macros;
pub(crate) use macros::define_port_error;

mod attendance_gateway;
mod certificate_gateway;
mod course_gateway;
mod enrollment_gateway;
mod gateway_error;
mod module_grade_gateway;
mod notification_gateway;
mod offering_gateway;
mod payment_gateway;
mod person_gateway;
mod receipt_storage;
mod submission_journal;
mod support_content_gateway;
mod teaching_gateway;

pub use attendance_gateway::AttendanceGateway;
#[cfg(test)]
pub use attendance_gateway::MockAttendanceGateway;
pub use certificate_gateway::CertificateGateway;
#[cfg(test)]
pub use certificate_gateway::MockCertificateGateway;
pub use course_gateway::CourseGateway;
#[cfg(test)]
pub use course_gateway::MockCourseGateway;
pub use enrollment_gateway::EnrollmentGateway;
#[cfg(test)]
pub use enrollment_gateway::MockEnrollmentGateway;
pub use gateway_error::GatewayError;
#[cfg(test)]
pub use module_grade_gateway::MockModuleGradeGateway;
pub use module_grade_gateway::ModuleGradeGateway;
#[cfg(test)]
pub use notification_gateway::MockNotificationGateway;
pub use notification_gateway::{
    FixtureNotificationGateway, NotificationGateway, PaymentApprovedEmail,
};
#[cfg(test)]
pub use offering_gateway::MockOfferingGateway;
pub use offering_gateway::OfferingGateway;
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::PaymentGateway;
#[cfg(test)]
pub use person_gateway::MockPersonGateway;
pub use person_gateway::PersonGateway;
#[cfg(test)]
pub use receipt_storage::MockReceiptStorage;
pub use receipt_storage::{ReceiptStorage, ReceiptStorageError};
#[cfg(test)]
pub use submission_journal::MockSubmissionJournal;
pub use submission_journal::{SubmissionCheckpoint, SubmissionJournal, SubmissionJournalError};
#[cfg(test)]
pub use support_content_gateway::MockSupportContentGateway;
pub use support_content_gateway::SupportContentGateway;
#[cfg(test)]
pub use teaching_gateway::MockTeachingGateway;
pub use teaching_gateway::TeachingGateway;
