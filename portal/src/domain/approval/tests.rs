//! Tests for the payment approval saga.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockEnrollmentGateway, MockNotificationGateway, MockOfferingGateway, MockPaymentGateway,
    MockPersonGateway,
};
use crate::domain::{EnrollmentId, ErrorCode, OfferingId, PaymentStatus, PersonId};
use crate::test_support::{InMemoryBackend, Operation, fixtures};

const PAYMENT: i64 = 90;
const ENROLLMENT: i64 = 40;
const STUDENT: i64 = 7;
const OFFERING: i64 = 3;

#[fixture]
fn backend() -> Arc<InMemoryBackend> {
    let backend = Arc::new(InMemoryBackend::new());
    backend.with_state(|state| {
        let guest = fixtures::person(STUDENT, Role::Other("Invitado".to_owned()));
        state.people.insert(PersonId::new(STUDENT), guest);
        state
            .offerings
            .insert(OfferingId::new(OFFERING), fixtures::offering(OFFERING, 10, None));
        state.enrollments.insert(
            EnrollmentId::new(ENROLLMENT),
            fixtures::enrollment(
                ENROLLMENT,
                STUDENT,
                OFFERING,
                EnrollmentStatus::PreEnrolled,
                AcademicResult::Pending,
            ),
        );
        state.payments.insert(
            PaymentId::new(PAYMENT),
            fixtures::payment(PAYMENT, STUDENT, ENROLLMENT, PaymentStatus::Pending),
        );
    });
    backend
}

fn service(backend: &Arc<InMemoryBackend>) -> PaymentApprovalService {
    PaymentApprovalService::new(ApprovalPorts {
        payments: backend.clone(),
        enrollments: backend.clone(),
        offerings: backend.clone(),
        persons: backend.clone(),
        notifications: backend.clone(),
    })
}

#[rstest]
#[tokio::test]
async fn approval_runs_every_step(backend: Arc<InMemoryBackend>) {
    let report = service(&backend)
        .decide(PaymentId::new(PAYMENT), PaymentDecision::Approve)
        .await
        .expect("approval succeeds");

    assert_eq!(
        report.message(),
        "Estado actualizado a Pagado · Matrícula Activo · Cupos decrecidos · \
         Rol actualizado a Estudiante · Correo de aprobación enviado"
    );
    assert!(report.partial_failure().is_none());
    assert_eq!(report.remaining_quota, Some(Quota::new(9)));

    let state = backend.snapshot();
    assert_eq!(state.payments[&PaymentId::new(PAYMENT)].status, PaymentStatus::Paid);
    let enrollment = &state.enrollments[&EnrollmentId::new(ENROLLMENT)];
    assert_eq!(enrollment.status, EnrollmentStatus::Active);
    assert_eq!(enrollment.result, AcademicResult::Pending);
    assert_eq!(state.people[&PersonId::new(STUDENT)].role, Role::Student);
    assert_eq!(state.emails.len(), 1);
    assert_eq!(state.emails[0].email, "persona7@example.org");
    assert_eq!(state.emails[0].course, "Soldadura básica");
}

#[rstest]
#[tokio::test]
async fn rejection_cancels_the_enrollment_only(backend: Arc<InMemoryBackend>) {
    let report = service(&backend)
        .decide(PaymentId::new(PAYMENT), PaymentDecision::Reject)
        .await
        .expect("rejection succeeds");

    assert_eq!(
        report.message(),
        "Estado actualizado a Rechazado · Matrícula Cancelado · Resultado Reprobado"
    );
    let state = backend.snapshot();
    let enrollment = &state.enrollments[&EnrollmentId::new(ENROLLMENT)];
    assert_eq!(enrollment.status, EnrollmentStatus::Cancelled);
    assert_eq!(enrollment.result, AcademicResult::Failed);
    assert_eq!(state.offerings[&OfferingId::new(OFFERING)].quota, Quota::new(10));
    assert_eq!(state.calls_to(Operation::AssignRole), 0);
    assert!(state.emails.is_empty());
}

#[rstest]
#[case::paid(PaymentStatus::Paid)]
#[case::rejected(PaymentStatus::Rejected)]
#[tokio::test]
async fn decided_payments_are_refused(
    backend: Arc<InMemoryBackend>,
    #[case] status: PaymentStatus,
) {
    backend.with_state(|state| {
        if let Some(payment) = state.payments.get_mut(&PaymentId::new(PAYMENT)) {
            payment.status = status;
        }
    });

    let err = service(&backend)
        .decide(PaymentId::new(PAYMENT), PaymentDecision::Approve)
        .await
        .expect_err("already decided");

    assert_eq!(err.code(), ErrorCode::Validation);
    assert_eq!(backend.calls_to(Operation::UpdatePaymentStatus), 0);
}

#[rstest]
#[tokio::test]
async fn status_write_failure_aborts(backend: Arc<InMemoryBackend>) {
    backend.fail(Operation::UpdatePaymentStatus);

    let err = service(&backend)
        .decide(PaymentId::new(PAYMENT), PaymentDecision::Approve)
        .await
        .expect_err("status write fails");

    assert_eq!(err.code(), ErrorCode::Remote);
    let state = backend.snapshot();
    assert_eq!(state.calls_to(Operation::UpdateEnrollment), 0);
    assert_eq!(state.calls_to(Operation::DecrementQuota), 0);
    assert_eq!(state.calls_to(Operation::AssignRole), 0);
    assert!(state.emails.is_empty());
}

#[rstest]
#[tokio::test]
async fn best_effort_failures_are_reported_not_rolled_back(backend: Arc<InMemoryBackend>) {
    backend.fail(Operation::DecrementQuota);
    backend.fail(Operation::SendEmail);

    let report = service(&backend)
        .decide(PaymentId::new(PAYMENT), PaymentDecision::Approve)
        .await
        .expect("payment status still written");

    assert_eq!(
        report.message(),
        "Estado actualizado a Pagado · Matrícula Activo · (cupos no actualizados) · \
         Rol actualizado a Estudiante · (correo no enviado)"
    );
    let failure = report.partial_failure().expect("partial failure");
    assert_eq!(failure.failed_steps, vec![ApprovalStep::Quota, ApprovalStep::Email]);
    assert_eq!(failure.to_string(), report.message());
    assert_eq!(
        backend.snapshot().payments[&PaymentId::new(PAYMENT)].status,
        PaymentStatus::Paid
    );
}

#[rstest]
#[tokio::test]
async fn email_failure_alone_keeps_every_backend_write(backend: Arc<InMemoryBackend>) {
    backend.fail(Operation::SendEmail);

    let report = service(&backend)
        .decide(PaymentId::new(PAYMENT), PaymentDecision::Approve)
        .await
        .expect("payment status still written");

    assert!(report.message().ends_with("· (correo no enviado)"));
    let failure = report.partial_failure().expect("partial failure");
    assert_eq!(failure.failed_steps, vec![ApprovalStep::Email]);
    assert_eq!(report.remaining_quota, Some(Quota::new(9)));
    let state = backend.snapshot();
    assert_eq!(state.offerings[&OfferingId::new(OFFERING)].quota, Quota::new(9));
    assert_eq!(state.people[&PersonId::new(STUDENT)].role, Role::Student);
    assert_eq!(
        state.enrollments[&EnrollmentId::new(ENROLLMENT)].status,
        EnrollmentStatus::Active
    );
    assert!(state.emails.is_empty());
}

#[rstest]
#[tokio::test]
async fn backend_writes_carry_payment_scoped_keys(backend: Arc<InMemoryBackend>) {
    service(&backend)
        .decide(PaymentId::new(PAYMENT), PaymentDecision::Approve)
        .await
        .expect("approval succeeds");

    let state = backend.snapshot();
    assert_eq!(
        state.idempotency_keys,
        vec!["pago-90:status", "pago-90:quota", "pago-90:role"]
    );
}

#[rstest]
#[tokio::test]
async fn replayed_quota_key_takes_one_seat(backend: Arc<InMemoryBackend>) {
    let key = StepKey::scoped("pago-90", "quota");
    let first = backend
        .decrement_quota(OfferingId::new(OFFERING), &key)
        .await
        .expect("first decrement");
    let replay = backend
        .decrement_quota(OfferingId::new(OFFERING), &key)
        .await
        .expect("replayed decrement");

    assert_eq!(first, Quota::new(9));
    assert_eq!(replay, Quota::new(9));
}

#[rstest]
#[tokio::test]
async fn missing_email_skips_the_notification(backend: Arc<InMemoryBackend>) {
    backend.with_state(|state| {
        if let Some(person) = state.people.get_mut(&PersonId::new(STUDENT)) {
            person.email = Some("  ".to_owned());
        }
    });

    let report = service(&backend)
        .decide(PaymentId::new(PAYMENT), PaymentDecision::Approve)
        .await
        .expect("approval succeeds");

    assert!(matches!(
        report.outcome(ApprovalStep::Email),
        Some(StepOutcome::Skipped { .. })
    ));
    assert!(report.partial_failure().is_none());
    assert!(report.message().ends_with("(correo no enviado: sin dirección registrada)"));
    assert_eq!(backend.calls_to(Operation::SendEmail), 0);
}

#[tokio::test]
async fn enrollment_is_fetched_when_detail_lacks_it() {
    let payment = fixtures::payment(PAYMENT, STUDENT, ENROLLMENT, PaymentStatus::Pending);
    let mut payments = MockPaymentGateway::new();
    payments.expect_find_detail().returning(move |_| {
        Ok(PaymentDetail {
            payment: payment.clone(),
            person: None,
            enrollment: None,
            course_name: None,
        })
    });
    payments
        .expect_update_status()
        .with(
            eq(PaymentId::new(PAYMENT)),
            eq(PaymentStatus::Paid),
            eq(StepKey::scoped("pago-90", "status")),
        )
        .times(1)
        .returning(|_, _, _| Ok(()));
    let mut enrollments = MockEnrollmentGateway::new();
    enrollments
        .expect_find()
        .with(eq(EnrollmentId::new(ENROLLMENT)))
        .times(1)
        .returning(|_| {
            Ok(fixtures::enrollment(
                ENROLLMENT,
                STUDENT,
                OFFERING,
                EnrollmentStatus::PreEnrolled,
                AcademicResult::Approved,
            ))
        });
    enrollments
        .expect_update()
        .with(
            eq(EnrollmentId::new(ENROLLMENT)),
            eq(EnrollmentUpdate::status_and_result(
                EnrollmentStatus::Active,
                AcademicResult::Approved,
            )),
        )
        .times(1)
        .returning(|_, _| Ok(()));
    let mut offerings = MockOfferingGateway::new();
    offerings
        .expect_decrement_quota()
        .with(eq(OfferingId::new(OFFERING)), eq(StepKey::scoped("pago-90", "quota")))
        .returning(|_, _| Ok(Quota::new(0)));
    let mut persons = MockPersonGateway::new();
    persons.expect_assign_role().returning(|_, _, _| Ok(()));
    let mut notifications = MockNotificationGateway::new();
    notifications.expect_send_payment_approved().never();

    let report = PaymentApprovalService::new(ApprovalPorts {
        payments: Arc::new(payments),
        enrollments: Arc::new(enrollments),
        offerings: Arc::new(offerings),
        persons: Arc::new(persons),
        notifications: Arc::new(notifications),
    })
    .decide(PaymentId::new(PAYMENT), PaymentDecision::Approve)
    .await
    .expect("approval succeeds");

    assert_eq!(report.remaining_quota, Some(Quota::new(0)));
    assert!(report.partial_failure().is_none());
}
