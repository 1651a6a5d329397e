//! Person and role endpoints.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::RestClient;
use super::dto::{PersonDto, RolePatchBody};
use super::envelope::{decode_record, decode_records};
use crate::domain::idempotency::StepKey;
use crate::domain::ports::{GatewayError, PersonGateway};
use crate::domain::{OfferingId, Person, PersonId, Role};

/// [`PersonGateway`] over `/api/personas`.
pub struct HttpPersonGateway {
    client: Arc<RestClient>,
}

impl HttpPersonGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PersonGateway for HttpPersonGateway {
    async fn find(&self, id: PersonId) -> Result<Person, GatewayError> {
        let body = self.client.get(&format!("/api/personas/{id}")).await?;
        decode_record::<PersonDto, _>(&body, "persona")
    }

    async fn assign_role(
        &self,
        id: PersonId,
        role: &Role,
        key: &StepKey,
    ) -> Result<(), GatewayError> {
        let patch = RolePatchBody { rol: role.as_wire() };
        self.client
            .patch_keyed(&format!("/api/personas/{id}"), &patch, key)
            .await
            .map(drop)
    }

    async fn list_active_by_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<Person>, GatewayError> {
        let body = self
            .client
            .get(&format!("/api/personas/oferta/{offering}/activos"))
            .await?;
        decode_records::<PersonDto, _>(&body, "personas")
    }
}
