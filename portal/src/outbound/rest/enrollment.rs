//! Enrollment endpoints.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::RestClient;
use super::dto::{EnrollmentDto, EnrollmentPatchBody, NewEnrollmentBody};
use super::envelope::{decode_record, decode_records};
use crate::domain::idempotency::StepKey;
use crate::domain::ports::{EnrollmentGateway, GatewayError};
use crate::domain::{Enrollment, EnrollmentId, EnrollmentUpdate, NewEnrollment, PersonId};

/// [`EnrollmentGateway`] over `/api/matriculas`.
pub struct HttpEnrollmentGateway {
    client: Arc<RestClient>,
}

impl HttpEnrollmentGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EnrollmentGateway for HttpEnrollmentGateway {
    async fn create(
        &self,
        enrollment: &NewEnrollment,
        key: &StepKey,
    ) -> Result<Enrollment, GatewayError> {
        let payload = NewEnrollmentBody::from(enrollment);
        let body = self
            .client
            .post("/api/matriculas", &payload, Some(key))
            .await?;
        decode_record::<EnrollmentDto, _>(&body, "matricula")
    }

    async fn find(&self, id: EnrollmentId) -> Result<Enrollment, GatewayError> {
        let body = self.client.get(&format!("/api/matriculas/{id}")).await?;
        decode_record::<EnrollmentDto, _>(&body, "matricula")
    }

    async fn update(&self, id: EnrollmentId, update: EnrollmentUpdate) -> Result<(), GatewayError> {
        if update.is_empty() {
            return Ok(());
        }
        self.client
            .patch(
                &format!("/api/matriculas/{id}"),
                &EnrollmentPatchBody::from(update),
            )
            .await
            .map(drop)
    }

    async fn delete(&self, id: EnrollmentId) -> Result<(), GatewayError> {
        self.client
            .delete(&format!("/api/matriculas/{id}"))
            .await
            .map(drop)
    }

    async fn list_for_person(&self, person: PersonId) -> Result<Vec<Enrollment>, GatewayError> {
        let body = self
            .client
            .get(&format!("/api/cursosPersonas/{person}"))
            .await?;
        decode_records::<EnrollmentDto, _>(&body, "matriculas")
    }
}
