//! Enrollment submission saga.
//!
//! A student pays for an offering in three dependent remote steps: create a
//! pre-enrollment, upload the receipt, and register a pending payment. Each
//! completed step is checkpointed in the [`SubmissionJournal`] under the
//! submission key, so a retry resumes after the last completed step and a
//! finished submission is replayed without touching the backend. When the
//! upload or the payment step fails, the saga compensates by deleting what the
//! earlier steps created.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::gateway_mapping::{map_gateway_error, map_journal_error, map_storage_error};
use super::idempotency::{PayloadHash, SubmissionKey, canonicalize_and_hash};
use super::ports::{
    EnrollmentGateway, OfferingGateway, PaymentGateway, ReceiptStorage, SubmissionCheckpoint,
    SubmissionJournal,
};
use super::{
    DEFAULT_PAYMENT_METHOD, EnrollmentId, Error, NewEnrollment, NewPayment, OfferingId, PaymentId,
    PaymentStatus, PersonId, ReceiptFile, StoredReceipt, receipt_object_path,
};

/// Remote steps of the submission saga, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStep {
    /// Create the pre-enrollment.
    CreateEnrollment,
    /// Upload the receipt to object storage.
    UploadReceipt,
    /// Register the pending payment.
    CreatePayment,
}

impl SubmissionStep {
    /// Stable step name used in idempotency keys and error details.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateEnrollment => "create_enrollment",
            Self::UploadReceipt => "upload_receipt",
            Self::CreatePayment => "create_payment",
        }
    }
}

/// Port bundle required by the submission saga.
pub struct SubmissionPorts {
    /// Offering reads (price lookup).
    pub offerings: Arc<dyn OfferingGateway>,
    /// Enrollment creation and compensation.
    pub enrollments: Arc<dyn EnrollmentGateway>,
    /// Payment creation.
    pub payments: Arc<dyn PaymentGateway>,
    /// Receipt object store.
    pub storage: Arc<dyn ReceiptStorage>,
    /// Step checkpoints.
    pub journal: Arc<dyn SubmissionJournal>,
}

/// Input of one submission.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// Client-generated key; reuse it when retrying the same submission.
    pub key: SubmissionKey,
    /// Paying student.
    pub person_id: PersonId,
    /// Offering paid for.
    pub offering_id: OfferingId,
    /// Receipt file.
    pub receipt: ReceiptFile,
    /// Transaction reference, if the payer has one.
    pub reference: Option<String>,
    /// Payment method; blank falls back to [`DEFAULT_PAYMENT_METHOD`].
    pub method: String,
}

impl SubmissionRequest {
    fn method(&self) -> &str {
        let trimmed = self.method.trim();
        if trimmed.is_empty() {
            DEFAULT_PAYMENT_METHOD
        } else {
            trimmed
        }
    }

    fn reference(&self) -> Option<String> {
        self.reference
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
            .map(str::to_owned)
    }

    fn fingerprint(&self) -> Result<PayloadHash, Error> {
        let payload = json!({
            "person": self.person_id,
            "offering": self.offering_id,
            "method": self.method(),
            "reference": self.reference(),
            "receipt": {
                "type": self.receipt.content_type(),
                "digest": self.receipt.digest(),
            },
        });
        canonicalize_and_hash(&payload).map_err(|err| {
            Error::internal(format!("No se pudo calcular la huella del envío: {err}"))
        })
    }
}

/// Result of a successful (or replayed) submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    /// Submission key.
    pub key: SubmissionKey,
    /// Created enrollment.
    pub enrollment_id: EnrollmentId,
    /// Created payment.
    pub payment_id: PaymentId,
    /// Stored receipt.
    pub receipt: StoredReceipt,
    /// `true` when the submission had already completed and nothing was sent.
    pub replayed: bool,
    /// Non-critical problems (journal writes).
    pub warnings: Vec<String>,
}

/// Orchestrates the submission saga.
pub struct EnrollmentSubmissionService {
    offerings: Arc<dyn OfferingGateway>,
    enrollments: Arc<dyn EnrollmentGateway>,
    payments: Arc<dyn PaymentGateway>,
    storage: Arc<dyn ReceiptStorage>,
    journal: Arc<dyn SubmissionJournal>,
    clock: Arc<dyn Clock>,
}

impl EnrollmentSubmissionService {
    /// Build the service from its ports and a clock (used to name receipts).
    pub fn new(ports: SubmissionPorts, clock: Arc<dyn Clock>) -> Self {
        Self {
            offerings: ports.offerings,
            enrollments: ports.enrollments,
            payments: ports.payments,
            storage: ports.storage,
            journal: ports.journal,
            clock,
        }
    }

    /// Run (or resume) a submission.
    ///
    /// ```rust,ignore
    /// let outcome = service.submit(&request).await?;
    /// assert!(!outcome.replayed);
    /// # Ok::<(), portal::domain::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// - `Upload` when the receipt breaks a rule (nothing is created) or
    ///   storage rejects it (the enrollment is compensated).
    /// - `Conflict` when the key was used for a different payload.
    /// - `Validation` when the offering has no price.
    /// - `Remote` when a backend step fails.
    /// - `Internal` when the journal cannot be read.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionOutcome, Error> {
        request.receipt.check().map_err(|violation| {
            Error::upload(violation.to_string()).with_details(json!({ "step": "validate_receipt" }))
        })?;
        let payload_hash = request.fingerprint()?;
        let mut checkpoint = self.open_checkpoint(request.key, payload_hash).await?;
        if let Some(outcome) = replay(&checkpoint) {
            info!(key = %request.key, "submission already completed; replaying outcome");
            return Ok(outcome);
        }

        let offering = self
            .offerings
            .find(request.offering_id)
            .await
            .map_err(|err| map_gateway_error("No se pudo cargar la oferta", &err))?;
        let amount = offering.price.ok_or_else(|| {
            Error::validation(format!("La oferta {} no tiene precio definido", offering.id))
        })?;

        let mut warnings = Vec::new();
        let enrollment_id = self
            .ensure_enrollment(request, &mut checkpoint, &mut warnings)
            .await?;
        let receipt = self
            .ensure_receipt(request, &mut checkpoint, &mut warnings)
            .await?;
        let payment_id = self
            .create_payment(request, enrollment_id, amount, &receipt, &mut checkpoint)
            .await?;

        checkpoint.payment_id = Some(payment_id);
        self.save_checkpoint(&checkpoint, &mut warnings).await;
        info!(
            key = %request.key,
            enrollment = %enrollment_id,
            payment = %payment_id,
            "enrollment submission completed"
        );
        Ok(SubmissionOutcome {
            key: request.key,
            enrollment_id,
            payment_id,
            receipt,
            replayed: false,
            warnings,
        })
    }

    async fn open_checkpoint(
        &self,
        key: SubmissionKey,
        payload_hash: PayloadHash,
    ) -> Result<SubmissionCheckpoint, Error> {
        let stored = self
            .journal
            .load(&key)
            .await
            .map_err(|err| map_journal_error("No se pudo leer el registro del envío", &err))?;
        match stored {
            Some(existing) if existing.payload_hash != payload_hash => Err(Error::conflict(
                format!("La clave de envío {key} ya se usó con datos distintos"),
            )
            .with_details(json!({ "key": key.to_string() }))),
            Some(existing) => Ok(existing),
            None => Ok(SubmissionCheckpoint::started(key, payload_hash)),
        }
    }

    async fn ensure_enrollment(
        &self,
        request: &SubmissionRequest,
        checkpoint: &mut SubmissionCheckpoint,
        warnings: &mut Vec<String>,
    ) -> Result<EnrollmentId, Error> {
        if let Some(existing) = checkpoint.enrollment_id {
            return Ok(existing);
        }
        let step = SubmissionStep::CreateEnrollment;
        let created = self
            .enrollments
            .create(
                &NewEnrollment::pre_enrollment(request.person_id, request.offering_id),
                &request.key.step_key(step.as_str()),
            )
            .await
            .map_err(|err| {
                with_step_details(
                    map_gateway_error("No se pudo crear la matrícula", &err),
                    step,
                    Vec::new(),
                )
            })?;
        checkpoint.enrollment_id = Some(created.id);
        self.save_checkpoint(checkpoint, warnings).await;
        Ok(created.id)
    }

    async fn ensure_receipt(
        &self,
        request: &SubmissionRequest,
        checkpoint: &mut SubmissionCheckpoint,
        warnings: &mut Vec<String>,
    ) -> Result<StoredReceipt, Error> {
        if let Some(existing) = checkpoint.receipt.clone() {
            return Ok(existing);
        }
        let path = receipt_object_path(
            request.person_id,
            request.offering_id,
            self.clock.utc().timestamp_millis(),
            &request.receipt.extension(),
        );
        match self.storage.upload(&path, &request.receipt).await {
            Ok(stored) => {
                checkpoint.receipt = Some(stored.clone());
                self.save_checkpoint(checkpoint, warnings).await;
                Ok(stored)
            }
            Err(err) => {
                let cause = map_storage_error("No se pudo subir el comprobante", &err);
                Err(self
                    .compensate(checkpoint, SubmissionStep::UploadReceipt, cause)
                    .await)
            }
        }
    }

    async fn create_payment(
        &self,
        request: &SubmissionRequest,
        enrollment_id: EnrollmentId,
        amount: Decimal,
        receipt: &StoredReceipt,
        checkpoint: &mut SubmissionCheckpoint,
    ) -> Result<PaymentId, Error> {
        let step = SubmissionStep::CreatePayment;
        let payment = NewPayment {
            person_id: request.person_id,
            enrollment_id,
            method: request.method().to_owned(),
            amount,
            status: PaymentStatus::Pending,
            receipt_url: receipt.public_url.clone(),
            receipt_path: receipt.path.clone(),
            reference: request.reference(),
            paid_at: self.now(),
        };
        match self
            .payments
            .create(&payment, &request.key.step_key(step.as_str()))
            .await
        {
            Ok(created) => Ok(created.id),
            Err(err) => {
                let cause = map_gateway_error("No se pudo registrar el pago", &err);
                Err(self.compensate(checkpoint, step, cause).await)
            }
        }
    }

    /// Undo the steps recorded in `checkpoint` and build the itemised error.
    ///
    /// A fully compensated submission forgets its checkpoint; a partially
    /// compensated one keeps what still exists so a retry resumes from it.
    async fn compensate(
        &self,
        checkpoint: &mut SubmissionCheckpoint,
        failed: SubmissionStep,
        cause: Error,
    ) -> Error {
        let mut notes = Vec::new();
        let mut actions = Vec::new();

        if let Some(receipt) = checkpoint.receipt.clone() {
            match self.storage.remove(&receipt.path).await {
                Ok(()) => {
                    checkpoint.receipt = None;
                    notes.push("comprobante eliminado");
                    actions.push(json!({ "action": "remove_receipt", "ok": true }));
                }
                Err(err) => {
                    warn!(
                        key = %checkpoint.key,
                        path = %receipt.path,
                        error = %err,
                        "receipt compensation failed"
                    );
                    notes.push("comprobante no eliminado");
                    actions.push(json!({
                        "action": "remove_receipt",
                        "ok": false,
                        "error": err.to_string(),
                    }));
                }
            }
        }

        if let Some(enrollment_id) = checkpoint.enrollment_id {
            match self.enrollments.delete(enrollment_id).await {
                Ok(()) => {
                    checkpoint.enrollment_id = None;
                    notes.push("matrícula revertida");
                    actions.push(json!({ "action": "delete_enrollment", "ok": true }));
                }
                Err(err) => {
                    warn!(
                        key = %checkpoint.key,
                        enrollment = %enrollment_id,
                        error = %err,
                        "enrollment compensation failed"
                    );
                    notes.push("matrícula no revertida");
                    actions.push(json!({
                        "action": "delete_enrollment",
                        "ok": false,
                        "error": err.to_string(),
                    }));
                }
            }
        }

        let journal_result = if checkpoint.enrollment_id.is_none() && checkpoint.receipt.is_none() {
            self.journal.clear(&checkpoint.key).await
        } else {
            self.journal.save(checkpoint).await
        };
        if let Err(err) = journal_result {
            warn!(key = %checkpoint.key, error = %err, "journal update after compensation failed");
        }

        let message = std::iter::once(cause.message())
            .chain(notes)
            .collect::<Vec<_>>()
            .join(" · ");
        let unauthorized = cause.is_unauthorized();
        let error = with_step_details(Error::new(cause.code(), message), failed, actions);
        if unauthorized {
            mark_unauthorized(error)
        } else {
            error
        }
    }

    async fn save_checkpoint(&self, checkpoint: &SubmissionCheckpoint, warnings: &mut Vec<String>) {
        if let Err(err) = self.journal.save(checkpoint).await {
            warn!(key = %checkpoint.key, error = %err, "submission checkpoint not saved");
            warnings.push(format!("No se guardó el avance del envío: {err}"));
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

fn replay(checkpoint: &SubmissionCheckpoint) -> Option<SubmissionOutcome> {
    let SubmissionCheckpoint {
        key,
        enrollment_id: Some(enrollment_id),
        receipt: Some(receipt),
        payment_id: Some(payment_id),
        ..
    } = checkpoint
    else {
        return None;
    };
    Some(SubmissionOutcome {
        key: *key,
        enrollment_id: *enrollment_id,
        payment_id: *payment_id,
        receipt: receipt.clone(),
        replayed: true,
        warnings: Vec::new(),
    })
}

fn with_step_details(error: Error, step: SubmissionStep, compensation: Vec<Value>) -> Error {
    let unauthorized = error.is_unauthorized();
    let mut details = json!({ "step": step.as_str(), "compensation": compensation });
    if unauthorized {
        details["unauthorized"] = Value::Bool(true);
    }
    error.with_details(details)
}

fn mark_unauthorized(error: Error) -> Error {
    let mut details = error.details().cloned().unwrap_or_else(|| json!({}));
    details["unauthorized"] = Value::Bool(true);
    error.with_details(details)
}

#[cfg(test)]
mod tests;
