//! Driven port for certificate generation.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::EnrollmentId;

/// Port that renders a completion certificate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateGateway: Send + Sync {
    /// Render the certificate for an enrollment and return the PDF bytes.
    async fn generate(&self, enrollment: EnrollmentId) -> Result<Vec<u8>, GatewayError>;
}
