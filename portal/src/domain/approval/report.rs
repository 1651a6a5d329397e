//! Step-by-step record of one approval decision.

use serde::Serialize;

use crate::domain::{EnrollmentStatus, PaymentDecision, PaymentId, PaymentStatus, Quota};

/// Best-effort steps that run after the payment status is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStep {
    /// Enrollment status/result patch.
    Enrollment,
    /// Offering quota decrement.
    Quota,
    /// Student role promotion.
    Role,
    /// Payment-approved email.
    Email,
}

impl ApprovalStep {
    /// Stable step name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enrollment => "enrollment",
            Self::Quota => "quota",
            Self::Role => "role",
            Self::Email => "email",
        }
    }
}

/// Result of one best-effort step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step succeeded.
    Applied,
    /// The step did not apply to this payment.
    Skipped {
        /// Why it was skipped.
        reason: String,
    },
    /// The step failed; the saga carried on.
    Failed {
        /// Failure description.
        message: String,
    },
}

impl StepOutcome {
    /// Whether the step failed.
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Report of a completed approval or rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalReport {
    /// Decided payment.
    pub payment_id: PaymentId,
    /// Administrator decision.
    pub decision: PaymentDecision,
    /// Status written to the payment.
    pub payment_status: PaymentStatus,
    /// Status written to the enrollment, when that step succeeded.
    pub enrollment_status: Option<EnrollmentStatus>,
    /// Seats left after the decrement, when that step succeeded.
    pub remaining_quota: Option<Quota>,
    /// Outcome of every step that ran, in order.
    pub steps: Vec<(ApprovalStep, StepOutcome)>,
}

/// The payment status was written but at least one later step failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PartialSagaFailure {
    /// Decided payment.
    pub payment_id: PaymentId,
    /// Steps that failed.
    pub failed_steps: Vec<ApprovalStep>,
    /// Rendered report message.
    pub message: String,
}

impl ApprovalReport {
    /// Outcome recorded for `step`, if it ran.
    pub fn outcome(&self, step: ApprovalStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(recorded, _)| *recorded == step)
            .map(|(_, outcome)| outcome)
    }

    /// Steps that failed.
    pub fn failed_steps(&self) -> Vec<ApprovalStep> {
        self.steps
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(step, _)| *step)
            .collect()
    }

    /// Partial failure, when any step failed.
    pub fn partial_failure(&self) -> Option<PartialSagaFailure> {
        let failed_steps = self.failed_steps();
        if failed_steps.is_empty() {
            return None;
        }
        Some(PartialSagaFailure {
            payment_id: self.payment_id,
            failed_steps,
            message: self.message(),
        })
    }

    /// User-facing summary joined with ` · `.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::{
    ///     ApprovalReport, ApprovalStep, EnrollmentStatus, PaymentDecision, PaymentId,
    ///     PaymentStatus, StepOutcome,
    /// };
    ///
    /// let report = ApprovalReport {
    ///     payment_id: PaymentId::new(5),
    ///     decision: PaymentDecision::Reject,
    ///     payment_status: PaymentStatus::Rejected,
    ///     enrollment_status: Some(EnrollmentStatus::Cancelled),
    ///     remaining_quota: None,
    ///     steps: vec![(ApprovalStep::Enrollment, StepOutcome::Applied)],
    /// };
    /// assert_eq!(
    ///     report.message(),
    ///     "Estado actualizado a Rechazado · Matrícula Cancelado · Resultado Reprobado"
    /// );
    /// ```
    pub fn message(&self) -> String {
        let mut parts = vec![format!("Estado actualizado a {}", self.payment_status)];
        for (step, outcome) in &self.steps {
            match (step, outcome) {
                (ApprovalStep::Enrollment, StepOutcome::Applied) => {
                    if let Some(status) = self.enrollment_status {
                        parts.push(format!("Matrícula {status}"));
                    }
                    if self.decision == PaymentDecision::Reject {
                        parts.push("Resultado Reprobado".to_owned());
                    }
                }
                (ApprovalStep::Enrollment, _) => {
                    parts.push("(matrícula no actualizada)".to_owned());
                }
                (ApprovalStep::Quota, StepOutcome::Applied) => {
                    parts.push("Cupos decrecidos".to_owned());
                }
                (ApprovalStep::Quota, _) => parts.push("(cupos no actualizados)".to_owned()),
                (ApprovalStep::Role, StepOutcome::Applied) => {
                    parts.push("Rol actualizado a Estudiante".to_owned());
                }
                (ApprovalStep::Role, _) => parts.push("(rol no actualizado)".to_owned()),
                (ApprovalStep::Email, StepOutcome::Applied) => {
                    parts.push("Correo de aprobación enviado".to_owned());
                }
                (ApprovalStep::Email, StepOutcome::Skipped { reason }) => {
                    parts.push(format!("(correo no enviado: {reason})"));
                }
                (ApprovalStep::Email, StepOutcome::Failed { .. }) => {
                    parts.push("(correo no enviado)".to_owned());
                }
            }
        }
        parts.join(" · ")
    }
}
