//! Support content, certificates, and notification email endpoints.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::RestClient;
use super::dto::{
    CertificateRequestBody, PaymentApprovedEmailBody, SupportContentBody, SupportContentDto,
};
use super::envelope::{decode_record, decode_records};
use crate::domain::ports::{
    CertificateGateway, GatewayError, NotificationGateway, PaymentApprovedEmail,
    SupportContentGateway,
};
use crate::domain::{ContentId, EnrollmentId, OfferingId, SupportContent, SupportContentDraft};

/// [`SupportContentGateway`] over `/api/contenidoApoyo`.
pub struct HttpSupportContentGateway {
    client: Arc<RestClient>,
}

impl HttpSupportContentGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SupportContentGateway for HttpSupportContentGateway {
    async fn list_for_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<SupportContent>, GatewayError> {
        let body = self
            .client
            .get(&format!("/api/contenidoApoyo/oferta/{offering}"))
            .await?;
        decode_records::<SupportContentDto, _>(&body, "contenidos")
    }

    async fn create(&self, draft: &SupportContentDraft) -> Result<SupportContent, GatewayError> {
        let body = self
            .client
            .post("/api/contenidoApoyo", &SupportContentBody::from(draft), None)
            .await?;
        decode_record::<SupportContentDto, _>(&body, "contenido")
    }

    async fn update(
        &self,
        id: ContentId,
        draft: &SupportContentDraft,
    ) -> Result<SupportContent, GatewayError> {
        let body = self
            .client
            .patch(
                &format!("/api/contenidoApoyo/{id}"),
                &SupportContentBody::from(draft),
            )
            .await?;
        decode_record::<SupportContentDto, _>(&body, "contenido")
    }

    async fn delete(&self, id: ContentId) -> Result<(), GatewayError> {
        self.client
            .delete(&format!("/api/contenidoApoyo/{id}"))
            .await
            .map(drop)
    }
}

/// [`CertificateGateway`] over `/api/certificado/generar`; the body is the PDF.
pub struct HttpCertificateGateway {
    client: Arc<RestClient>,
}

impl HttpCertificateGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CertificateGateway for HttpCertificateGateway {
    async fn generate(&self, enrollment: EnrollmentId) -> Result<Vec<u8>, GatewayError> {
        let bytes = self
            .client
            .post(
                "/api/certificado/generar",
                &CertificateRequestBody {
                    id_curso_matriculado: enrollment,
                },
                None,
            )
            .await?;
        if bytes.is_empty() {
            return Err(GatewayError::decode("certificate response was empty"));
        }
        Ok(bytes)
    }
}

/// [`NotificationGateway`] backed by the backend's email endpoints.
pub struct HttpNotificationGateway {
    client: Arc<RestClient>,
}

impl HttpNotificationGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationGateway for HttpNotificationGateway {
    async fn send_payment_approved(
        &self,
        email: &PaymentApprovedEmail,
    ) -> Result<(), GatewayError> {
        self.client
            .post(
                "/api/email/send-payment-approved",
                &PaymentApprovedEmailBody::from(email),
                None,
            )
            .await
            .map(drop)
    }
}
