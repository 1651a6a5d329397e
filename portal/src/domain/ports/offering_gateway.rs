//! Driven port for course offerings.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::idempotency::StepKey;
use crate::domain::{CourseOffering, OfferingId, PersonId, Quota};

/// Port for reading offerings and consuming seats.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferingGateway: Send + Sync {
    /// Fetch one offering.
    async fn find(&self, id: OfferingId) -> Result<CourseOffering, GatewayError>;

    /// Take one seat and return the remaining quota.
    ///
    /// The decrement happens on the backend in a single operation, floored at
    /// zero; callers never compute the new value from a value read earlier.
    /// `key` is forwarded as the `Idempotency-Key` so a retried step does not
    /// take a second seat.
    async fn decrement_quota(&self, id: OfferingId, key: &StepKey) -> Result<Quota, GatewayError>;

    /// Offerings where the person teaches at least one module.
    async fn list_by_teacher(&self, person: PersonId)
    -> Result<Vec<CourseOffering>, GatewayError>;
}
