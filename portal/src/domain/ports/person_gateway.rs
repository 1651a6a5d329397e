//! Driven port for person records.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::idempotency::StepKey;
use crate::domain::{OfferingId, Person, PersonId, Role};

/// Port for reading people and changing their role.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonGateway: Send + Sync {
    /// Fetch one person.
    async fn find(&self, id: PersonId) -> Result<Person, GatewayError>;

    /// Set the person's role.
    ///
    /// Sends a role-only update so concurrent edits to other fields are not
    /// overwritten. Assigning the role a person already has is a no-op on the
    /// backend. `key` is forwarded as the `Idempotency-Key`.
    async fn assign_role(
        &self,
        id: PersonId,
        role: &Role,
        key: &StepKey,
    ) -> Result<(), GatewayError>;

    /// People with an active enrollment in `offering`.
    async fn list_active_by_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<Person>, GatewayError>;
}
