//! Certificate download for approved enrollments.

use std::sync::Arc;

use tracing::info;

use super::gateway_mapping::map_gateway_error;
use super::ports::{CertificateGateway, EnrollmentGateway};
use super::{EnrollmentId, Error, is_certificate_eligible};

/// A rendered certificate.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateDocument {
    /// Suggested file name, `certificado-{id}.pdf`.
    pub file_name: String,
    /// PDF bytes.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for CertificateDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateDocument")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Downloads certificates once the stored result allows it.
pub struct CertificateService {
    enrollments: Arc<dyn EnrollmentGateway>,
    certificates: Arc<dyn CertificateGateway>,
}

impl CertificateService {
    /// Build the service.
    pub fn new(
        enrollments: Arc<dyn EnrollmentGateway>,
        certificates: Arc<dyn CertificateGateway>,
    ) -> Self {
        Self {
            enrollments,
            certificates,
        }
    }

    /// Fetch the certificate of `enrollment_id`.
    ///
    /// # Errors
    ///
    /// `Validation` unless the stored result is `Aprobado`; the generation
    /// endpoint is not called in that case.
    pub async fn download(
        &self,
        enrollment_id: EnrollmentId,
    ) -> Result<CertificateDocument, Error> {
        let enrollment = self
            .enrollments
            .find(enrollment_id)
            .await
            .map_err(|err| map_gateway_error("No se pudo cargar la matrícula", &err))?;
        if !is_certificate_eligible(enrollment.result) {
            return Err(Error::validation(
                "El certificado solo está disponible para matrículas aprobadas",
            ));
        }
        let bytes = self
            .certificates
            .generate(enrollment_id)
            .await
            .map_err(|err| map_gateway_error("No se pudo generar el certificado", &err))?;
        info!(enrollment = %enrollment_id, size = bytes.len(), "certificate downloaded");
        Ok(CertificateDocument {
            file_name: format!("certificado-{enrollment_id}.pdf"),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AcademicResult, EnrollmentStatus, ErrorCode};
    use crate::test_support::{InMemoryBackend, Operation, fixtures};
    use rstest::rstest;

    fn backend_with(result: AcademicResult) -> Arc<InMemoryBackend> {
        let backend = Arc::new(InMemoryBackend::new());
        backend.with_state(|state| {
            state.enrollments.insert(
                EnrollmentId::new(40),
                fixtures::enrollment(40, 7, 3, EnrollmentStatus::Finished, result),
            );
        });
        backend
    }

    #[tokio::test]
    async fn approved_enrollment_gets_a_named_pdf() {
        let backend = backend_with(AcademicResult::Approved);
        let document = CertificateService::new(backend.clone(), backend.clone())
            .download(EnrollmentId::new(40))
            .await
            .expect("certificate");

        assert_eq!(document.file_name, "certificado-40.pdf");
        assert!(document.bytes.starts_with(b"%PDF"));
    }

    #[rstest]
    #[case::pending(AcademicResult::Pending)]
    #[case::failed(AcademicResult::Failed)]
    #[case::disapproved(AcademicResult::Disapproved)]
    #[tokio::test]
    async fn other_results_never_reach_the_generator(#[case] result: AcademicResult) {
        let backend = backend_with(result);
        let err = CertificateService::new(backend.clone(), backend.clone())
            .download(EnrollmentId::new(40))
            .await
            .expect_err("not eligible");

        assert_eq!(err.code(), ErrorCode::Validation);
        assert_eq!(backend.calls_to(Operation::GenerateCertificate), 0);
    }
}
