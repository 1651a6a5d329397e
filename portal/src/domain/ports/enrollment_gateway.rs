//! Driven port for enrollments.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::idempotency::StepKey;
use crate::domain::{Enrollment, EnrollmentId, EnrollmentUpdate, NewEnrollment, PersonId};

/// Port for creating, reading, updating, and deleting enrollments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentGateway: Send + Sync {
    /// Create an enrollment. `key` is forwarded as the `Idempotency-Key`.
    async fn create(
        &self,
        enrollment: &NewEnrollment,
        key: &StepKey,
    ) -> Result<Enrollment, GatewayError>;

    /// Fetch one enrollment.
    async fn find(&self, id: EnrollmentId) -> Result<Enrollment, GatewayError>;

    /// Apply a partial update.
    async fn update(&self, id: EnrollmentId, update: EnrollmentUpdate)
    -> Result<(), GatewayError>;

    /// Delete an enrollment (used to compensate a failed submission).
    async fn delete(&self, id: EnrollmentId) -> Result<(), GatewayError>;

    /// Every enrollment of a person.
    async fn list_for_person(&self, person: PersonId) -> Result<Vec<Enrollment>, GatewayError>;
}
