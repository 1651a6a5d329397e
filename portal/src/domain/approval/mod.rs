//! Payment approval saga.
//!
//! An administrator accepts or rejects a pending payment. The payment status
//! write is the only step that can abort the saga; everything after it is
//! best-effort and recorded in an [`ApprovalReport`] instead of rolled back.
//! Backend writes carry an `Idempotency-Key` scoped to the payment so a
//! retried decision does not take a second seat.

mod report;

use std::sync::Arc;

use tracing::{info, warn};

pub use self::report::{ApprovalReport, ApprovalStep, PartialSagaFailure, StepOutcome};

use super::gateway_mapping::map_gateway_error;
use super::idempotency::StepKey;
use super::ports::{
    EnrollmentGateway, GatewayError, NotificationGateway, OfferingGateway, PaymentApprovedEmail,
    PaymentGateway, PersonGateway,
};
use super::{
    AcademicResult, Enrollment, EnrollmentStatus, EnrollmentUpdate, Error, PaymentDecision,
    PaymentDetail, PaymentId, Person, Quota, Role,
};

/// Course name used in the email when the payment detail lacks one.
const FALLBACK_COURSE_NAME: &str = "Curso";

/// Port bundle required by the approval saga.
pub struct ApprovalPorts {
    /// Payment reads and status writes.
    pub payments: Arc<dyn PaymentGateway>,
    /// Enrollment lookup and patch.
    pub enrollments: Arc<dyn EnrollmentGateway>,
    /// Quota decrement.
    pub offerings: Arc<dyn OfferingGateway>,
    /// Role promotion.
    pub persons: Arc<dyn PersonGateway>,
    /// Payment-approved email.
    pub notifications: Arc<dyn NotificationGateway>,
}

/// Applies an administrator decision to a pending payment.
pub struct PaymentApprovalService {
    payments: Arc<dyn PaymentGateway>,
    enrollments: Arc<dyn EnrollmentGateway>,
    offerings: Arc<dyn OfferingGateway>,
    persons: Arc<dyn PersonGateway>,
    notifications: Arc<dyn NotificationGateway>,
}

impl PaymentApprovalService {
    /// Build the service from its ports.
    pub fn new(ports: ApprovalPorts) -> Self {
        Self {
            payments: ports.payments,
            enrollments: ports.enrollments,
            offerings: ports.offerings,
            persons: ports.persons,
            notifications: ports.notifications,
        }
    }

    /// Approve or reject `payment_id`.
    ///
    /// # Errors
    ///
    /// - `Remote` when the payment cannot be read or its status cannot be
    ///   written. Nothing else runs in that case.
    /// - `Validation` when the payment was already decided.
    ///
    /// Later failures do not error; inspect
    /// [`ApprovalReport::partial_failure`].
    pub async fn decide(
        &self,
        payment_id: PaymentId,
        decision: PaymentDecision,
    ) -> Result<ApprovalReport, Error> {
        let detail = self
            .payments
            .find_detail(payment_id)
            .await
            .map_err(|err| map_gateway_error("No se pudo cargar el pago", &err))?;
        let current = detail.payment.status;
        if !current.is_pending() {
            return Err(Error::validation(format!(
                "El pago {payment_id} ya fue procesado ({current})"
            )));
        }

        let payment_status = decision.target_status();
        self.payments
            .update_status(payment_id, payment_status, &step_key(payment_id, "status"))
            .await
            .map_err(|err| map_gateway_error("No se pudo actualizar el estado del pago", &err))?;

        let mut report = ApprovalReport {
            payment_id,
            decision,
            payment_status,
            enrollment_status: None,
            remaining_quota: None,
            steps: Vec::with_capacity(4),
        };

        let enrollment = self.resolve_enrollment(&detail).await;
        let enrollment_outcome = match &enrollment {
            Ok(enrollment) => {
                let update = enrollment_update(decision, enrollment);
                match self.enrollments.update(enrollment.id, update).await {
                    Ok(()) => {
                        report.enrollment_status = update.status;
                        StepOutcome::Applied
                    }
                    Err(err) => failed(payment_id, ApprovalStep::Enrollment, &err),
                }
            }
            Err(err) => failed(payment_id, ApprovalStep::Enrollment, err),
        };
        report.steps.push((ApprovalStep::Enrollment, enrollment_outcome));

        if decision == PaymentDecision::Approve {
            let quota = self.decrement_quota(payment_id, enrollment.as_ref().ok()).await;
            if let Ok(remaining) = &quota {
                report.remaining_quota = Some(*remaining);
            }
            report.steps.push((
                ApprovalStep::Quota,
                quota.map_or_else(|outcome| outcome, |_| StepOutcome::Applied),
            ));

            let role_key = step_key(payment_id, ApprovalStep::Role.as_str());
            let role = match self
                .persons
                .assign_role(detail.payment.person_id, &Role::Student, &role_key)
                .await
            {
                Ok(()) => StepOutcome::Applied,
                Err(err) => failed(payment_id, ApprovalStep::Role, &err),
            };
            report.steps.push((ApprovalStep::Role, role));

            let email = self.send_email(payment_id, &detail).await;
            report.steps.push((ApprovalStep::Email, email));
        }

        info!(
            payment = %payment_id,
            status = %payment_status,
            failed_steps = report.failed_steps().len(),
            "payment decision applied"
        );
        Ok(report)
    }

    async fn resolve_enrollment(&self, detail: &PaymentDetail) -> Result<Enrollment, GatewayError> {
        match &detail.enrollment {
            Some(enrollment) => Ok(enrollment.clone()),
            None => self.enrollments.find(detail.payment.enrollment_id).await,
        }
    }

    async fn decrement_quota(
        &self,
        payment_id: PaymentId,
        enrollment: Option<&Enrollment>,
    ) -> Result<Quota, StepOutcome> {
        let Some(enrollment) = enrollment else {
            return Err(StepOutcome::Failed {
                message: "matrícula desconocida; no se puede ubicar la oferta".to_owned(),
            });
        };
        let key = step_key(payment_id, ApprovalStep::Quota.as_str());
        self.offerings
            .decrement_quota(enrollment.offering_id, &key)
            .await
            .map_err(|err| failed(payment_id, ApprovalStep::Quota, &err))
    }

    async fn send_email(&self, payment_id: PaymentId, detail: &PaymentDetail) -> StepOutcome {
        let Some((person, email)) = detail
            .person
            .as_ref()
            .and_then(|person| person.contact_email().map(|email| (person, email)))
        else {
            return StepOutcome::Skipped {
                reason: "sin dirección registrada".to_owned(),
            };
        };
        let message = approval_email(person, email, detail);
        match self.notifications.send_payment_approved(&message).await {
            Ok(()) => StepOutcome::Applied,
            Err(err) => failed(payment_id, ApprovalStep::Email, &err),
        }
    }
}

/// `pago-<id>:<step>`.
fn step_key(payment_id: PaymentId, step: &str) -> StepKey {
    StepKey::scoped(&format!("pago-{payment_id}"), step)
}

fn enrollment_update(decision: PaymentDecision, enrollment: &Enrollment) -> EnrollmentUpdate {
    match decision {
        PaymentDecision::Approve => {
            EnrollmentUpdate::status_and_result(EnrollmentStatus::Active, enrollment.result)
        }
        PaymentDecision::Reject => {
            EnrollmentUpdate::status_and_result(EnrollmentStatus::Cancelled, AcademicResult::Failed)
        }
    }
}

fn approval_email(person: &Person, email: &str, detail: &PaymentDetail) -> PaymentApprovedEmail {
    PaymentApprovedEmail {
        email: email.to_owned(),
        name: person.full_name(),
        course: detail
            .course_name
            .clone()
            .unwrap_or_else(|| FALLBACK_COURSE_NAME.to_owned()),
    }
}

fn failed(payment_id: PaymentId, step: ApprovalStep, err: &GatewayError) -> StepOutcome {
    warn!(payment = %payment_id, step = step.as_str(), error = %err, "approval step failed");
    StepOutcome::Failed {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests;
