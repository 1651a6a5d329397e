//! Tests for the enrollment submission saga.

use std::sync::Arc;

use mockall::predicate::always;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

use super::*;
use crate::domain::ports::{
    GatewayError, MockEnrollmentGateway, MockOfferingGateway, MockPaymentGateway,
    MockReceiptStorage, MockSubmissionJournal,
};
use crate::domain::{AcademicResult, EnrollmentStatus, ErrorCode, MAX_RECEIPT_BYTES, Role};
use crate::test_support::{FixtureClock, InMemoryBackend, Operation, fixtures};

const STUDENT: i64 = 7;
const OFFERING: i64 = 3;

#[fixture]
fn backend() -> Arc<InMemoryBackend> {
    let backend = Arc::new(InMemoryBackend::new());
    backend.with_state(|state| {
        state
            .people
            .insert(PersonId::new(STUDENT), fixtures::person(STUDENT, Role::Student));
        state.offerings.insert(
            OfferingId::new(OFFERING),
            fixtures::offering(OFFERING, 20, Some(Decimal::new(350_000, 0))),
        );
    });
    backend
}

fn service(backend: &Arc<InMemoryBackend>) -> EnrollmentSubmissionService {
    EnrollmentSubmissionService::new(
        SubmissionPorts {
            offerings: backend.clone(),
            enrollments: backend.clone(),
            payments: backend.clone(),
            storage: backend.clone(),
            journal: backend.clone(),
        },
        Arc::new(FixtureClock::fixed()),
    )
}

fn request(key: SubmissionKey) -> SubmissionRequest {
    SubmissionRequest {
        key,
        person_id: PersonId::new(STUDENT),
        offering_id: OfferingId::new(OFFERING),
        receipt: ReceiptFile::new("comprobante.png", "image/png", vec![0x89, b'P', b'N', b'G']),
        reference: Some(" NEQ-123 ".to_owned()),
        method: String::new(),
    }
}

#[rstest]
#[tokio::test]
async fn happy_path_creates_one_of_each(backend: Arc<InMemoryBackend>) {
    let key = SubmissionKey::random();
    let outcome = service(&backend)
        .submit(&request(key))
        .await
        .expect("submission succeeds");

    assert!(!outcome.replayed);
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.receipt.path, "7/3/7_1709294400000.png");

    let state = backend.snapshot();
    assert_eq!(state.enrollments.len(), 1);
    assert_eq!(state.objects.len(), 1);
    assert_eq!(state.payments.len(), 1);

    let enrollment = &state.enrollments[&outcome.enrollment_id];
    assert_eq!(enrollment.status, EnrollmentStatus::PreEnrolled);
    assert_eq!(enrollment.result, AcademicResult::Pending);

    let payment = &state.payments[&outcome.payment_id];
    assert_eq!(payment.enrollment_id, outcome.enrollment_id);
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.method, DEFAULT_PAYMENT_METHOD);
    assert_eq!(payment.amount, Decimal::new(350_000, 0));
    assert_eq!(payment.reference.as_deref(), Some("NEQ-123"));
    assert_eq!(
        payment.receipt_url.as_deref(),
        Some(outcome.receipt.public_url.as_str())
    );
    assert_eq!(
        state.idempotency_keys,
        vec![
            format!("{key}:create_enrollment"),
            format!("{key}:create_payment"),
        ]
    );
    assert!(state.journal[&key.to_string()].is_complete());
}

#[rstest]
#[case::empty(Vec::new(), "image/png")]
#[case::wrong_type(vec![1, 2, 3], "text/plain")]
#[case::too_large(vec![0; MAX_RECEIPT_BYTES + 1], "application/pdf")]
#[tokio::test]
async fn receipt_rule_violations_create_nothing(
    backend: Arc<InMemoryBackend>,
    #[case] bytes: Vec<u8>,
    #[case] content_type: &str,
) {
    let mut bad = request(SubmissionKey::random());
    bad.receipt = ReceiptFile::new("archivo", content_type, bytes);

    let err = service(&backend)
        .submit(&bad)
        .await
        .expect_err("receipt must be rejected");

    assert_eq!(err.code(), ErrorCode::Upload);
    assert!(backend.snapshot().calls.is_empty());
}

#[rstest]
#[tokio::test]
async fn missing_price_is_a_validation_error(backend: Arc<InMemoryBackend>) {
    backend.with_state(|state| {
        state.offerings.insert(
            OfferingId::new(OFFERING),
            fixtures::offering(OFFERING, 20, None),
        );
    });

    let err = service(&backend)
        .submit(&request(SubmissionKey::random()))
        .await
        .expect_err("offering without price");

    assert_eq!(err.code(), ErrorCode::Validation);
    assert_eq!(backend.calls_to(Operation::CreateEnrollment), 0);
}

#[rstest]
#[tokio::test]
async fn enrollment_failure_needs_no_compensation(backend: Arc<InMemoryBackend>) {
    backend.fail(Operation::CreateEnrollment);

    let err = service(&backend)
        .submit(&request(SubmissionKey::random()))
        .await
        .expect_err("enrollment step fails");

    assert_eq!(err.code(), ErrorCode::Remote);
    assert!(err.message().starts_with("No se pudo crear la matrícula"));
    assert_eq!(backend.calls_to(Operation::UploadReceipt), 0);
    assert_eq!(backend.calls_to(Operation::DeleteEnrollment), 0);
}

#[rstest]
#[tokio::test]
async fn upload_failure_reverts_the_enrollment(backend: Arc<InMemoryBackend>) {
    backend.fail(Operation::UploadReceipt);
    let key = SubmissionKey::random();

    let err = service(&backend)
        .submit(&request(key))
        .await
        .expect_err("upload step fails");

    assert_eq!(err.code(), ErrorCode::Upload);
    assert!(err.message().contains("matrícula revertida"));
    let state = backend.snapshot();
    assert!(state.enrollments.is_empty());
    assert!(state.payments.is_empty());
    assert!(!state.journal.contains_key(&key.to_string()));
}

#[rstest]
#[tokio::test]
async fn payment_failure_compensates_in_reverse_order(backend: Arc<InMemoryBackend>) {
    backend.fail(Operation::CreatePayment);
    let key = SubmissionKey::random();

    let err = service(&backend)
        .submit(&request(key))
        .await
        .expect_err("payment step fails");

    assert_eq!(err.code(), ErrorCode::Remote);
    assert!(err.message().starts_with("No se pudo registrar el pago"));
    assert!(err.message().ends_with("comprobante eliminado · matrícula revertida"));
    let details = err.details().expect("step details");
    assert_eq!(details["step"], "create_payment");
    assert_eq!(details["compensation"][0]["action"], "remove_receipt");
    assert_eq!(details["compensation"][1]["action"], "delete_enrollment");

    let state = backend.snapshot();
    assert!(state.enrollments.is_empty());
    assert!(state.objects.is_empty());
    assert_eq!(state.removed_objects, vec!["7/3/7_1709294400000.png".to_owned()]);
    assert!(state.journal.is_empty());
}

#[rstest]
#[tokio::test]
async fn retry_after_failed_compensation_reuses_the_enrollment(backend: Arc<InMemoryBackend>) {
    backend.fail(Operation::CreatePayment);
    backend.fail(Operation::DeleteEnrollment);
    let key = SubmissionKey::random();
    let svc = service(&backend);

    let err = svc.submit(&request(key)).await.expect_err("first attempt fails");
    assert!(err.message().contains("matrícula no revertida"));
    assert_eq!(backend.snapshot().enrollments.len(), 1);

    backend.recover(Operation::CreatePayment);
    backend.recover(Operation::DeleteEnrollment);
    let outcome = svc.submit(&request(key)).await.expect("retry succeeds");

    let state = backend.snapshot();
    assert_eq!(state.enrollments.len(), 1);
    assert_eq!(state.payments.len(), 1);
    assert_eq!(state.calls_to(Operation::CreateEnrollment), 1);
    assert!(state.enrollments.contains_key(&outcome.enrollment_id));
}

#[rstest]
#[tokio::test]
async fn completed_submission_is_replayed_without_remote_calls(backend: Arc<InMemoryBackend>) {
    let key = SubmissionKey::random();
    let svc = service(&backend);
    let first = svc.submit(&request(key)).await.expect("first run");
    let calls_before = backend.snapshot().calls.len();

    let replayed = svc.submit(&request(key)).await.expect("replay");

    assert!(replayed.replayed);
    assert_eq!(replayed.payment_id, first.payment_id);
    assert_eq!(replayed.enrollment_id, first.enrollment_id);
    let state = backend.snapshot();
    assert_eq!(state.calls.len(), calls_before + 1);
    assert_eq!(state.calls.last(), Some(&Operation::LoadJournal));
    assert_eq!(state.payments.len(), 1);
}

#[rstest]
#[tokio::test]
async fn reusing_a_key_for_other_data_conflicts(backend: Arc<InMemoryBackend>) {
    let key = SubmissionKey::random();
    let svc = service(&backend);
    svc.submit(&request(key)).await.expect("first run");

    let mut other = request(key);
    other.reference = Some("OTRA".to_owned());
    let err = svc.submit(&other).await.expect_err("conflicting payload");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(backend.snapshot().payments.len(), 1);
}

#[rstest]
#[tokio::test]
async fn journal_write_failures_become_warnings(backend: Arc<InMemoryBackend>) {
    backend.fail(Operation::SaveJournal);

    let outcome = service(&backend)
        .submit(&request(SubmissionKey::random()))
        .await
        .expect("submission still succeeds");

    assert!(!outcome.warnings.is_empty());
    assert!(outcome.warnings[0].starts_with("No se guardó el avance del envío"));
}

#[tokio::test]
async fn unauthorized_payment_failure_keeps_the_flag() {
    let mut offerings = MockOfferingGateway::new();
    offerings
        .expect_find()
        .returning(|_| Ok(fixtures::offering(OFFERING, 5, Some(Decimal::new(100, 0)))));
    let mut enrollments = MockEnrollmentGateway::new();
    enrollments.expect_create().times(1).returning(|_, _| {
        Ok(fixtures::enrollment(
            41,
            STUDENT,
            OFFERING,
            EnrollmentStatus::PreEnrolled,
            AcademicResult::Pending,
        ))
    });
    enrollments
        .expect_delete()
        .with(always())
        .times(1)
        .returning(|_| Ok(()));
    let mut payments = MockPaymentGateway::new();
    payments
        .expect_create()
        .times(1)
        .returning(|_, _| Err(GatewayError::unauthorized("token vencido")));
    let mut storage = MockReceiptStorage::new();
    storage.expect_upload().times(1).returning(|path, _| {
        Ok(StoredReceipt {
            path: path.to_owned(),
            public_url: format!("https://storage.test/{path}"),
        })
    });
    storage.expect_remove().times(1).returning(|_| Ok(()));
    let mut journal = MockSubmissionJournal::new();
    journal.expect_load().returning(|_| Ok(None));
    journal.expect_save().returning(|_| Ok(()));
    journal.expect_clear().times(1).returning(|_| Ok(()));

    let svc = EnrollmentSubmissionService::new(
        SubmissionPorts {
            offerings: Arc::new(offerings),
            enrollments: Arc::new(enrollments),
            payments: Arc::new(payments),
            storage: Arc::new(storage),
            journal: Arc::new(journal),
        },
        Arc::new(FixtureClock::fixed()),
    );

    let err = svc
        .submit(&request(SubmissionKey::random()))
        .await
        .expect_err("payment rejected");

    assert!(err.is_unauthorized());
    assert_eq!(err.details().expect("details")["step"], "create_payment");
}
