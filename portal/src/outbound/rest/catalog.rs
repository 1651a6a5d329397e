//! Course catalogue and offering endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::client::RestClient;
use super::dto::{CourseDto, OfferingDto, QuotaDto};
use super::envelope::{decode_record, decode_records};
use crate::domain::idempotency::StepKey;
use crate::domain::ports::{CourseGateway, GatewayError, OfferingGateway};
use crate::domain::{Course, CourseId, CourseOffering, OfferingId, PersonId, Quota};

/// [`CourseGateway`] over `/api/cursos`.
pub struct HttpCourseGateway {
    client: Arc<RestClient>,
}

impl HttpCourseGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CourseGateway for HttpCourseGateway {
    async fn list(&self) -> Result<Vec<Course>, GatewayError> {
        let body = self.client.get("/api/cursos").await?;
        decode_records::<CourseDto, _>(&body, "cursos")
    }

    async fn find(&self, id: CourseId) -> Result<Course, GatewayError> {
        let body = self.client.get(&format!("/api/cursos/{id}")).await?;
        decode_record::<CourseDto, _>(&body, "curso")
    }
}

/// [`OfferingGateway`] over `/api/ofertaCursos`.
pub struct HttpOfferingGateway {
    client: Arc<RestClient>,
}

impl HttpOfferingGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OfferingGateway for HttpOfferingGateway {
    async fn find(&self, id: OfferingId) -> Result<CourseOffering, GatewayError> {
        let body = self.client.get(&format!("/api/ofertaCursos/{id}")).await?;
        decode_record::<OfferingDto, _>(&body, "oferta")
    }

    async fn decrement_quota(&self, id: OfferingId, key: &StepKey) -> Result<Quota, GatewayError> {
        let body = self
            .client
            .post(
                &format!("/api/ofertaCursos/{id}/cupos/decrementar"),
                &json!({}),
                Some(key),
            )
            .await?;
        decode_record::<QuotaDto, _>(&body, "oferta")
    }

    async fn list_by_teacher(
        &self,
        person: PersonId,
    ) -> Result<Vec<CourseOffering>, GatewayError> {
        let body = self
            .client
            .get(&format!("/api/ofertaCursos/docente/{person}"))
            .await?;
        decode_records::<OfferingDto, _>(&body, "ofertas")
    }
}
