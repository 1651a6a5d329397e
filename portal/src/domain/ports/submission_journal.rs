//! Driven port for the submission saga journal.
//!
//! The journal checkpoints every completed step of a submission under its
//! submission key so a retry resumes instead of repeating remote writes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::define_port_error;
use crate::domain::idempotency::{PayloadHash, SubmissionKey};
use crate::domain::{EnrollmentId, PaymentId, StoredReceipt};

/// Progress of one submission saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionCheckpoint {
    /// Submission this checkpoint belongs to.
    pub key: SubmissionKey,
    /// Fingerprint of the submitted payload.
    pub payload_hash: PayloadHash,
    /// Enrollment created by step 1.
    pub enrollment_id: Option<EnrollmentId>,
    /// Receipt stored by step 2.
    pub receipt: Option<StoredReceipt>,
    /// Payment created by step 3; present once the saga completed.
    pub payment_id: Option<PaymentId>,
}

impl SubmissionCheckpoint {
    /// Empty checkpoint for a new submission.
    pub const fn started(key: SubmissionKey, payload_hash: PayloadHash) -> Self {
        Self {
            key,
            payload_hash,
            enrollment_id: None,
            receipt: None,
            payment_id: None,
        }
    }

    /// Whether every step has completed.
    pub const fn is_complete(&self) -> bool {
        self.enrollment_id.is_some() && self.receipt.is_some() && self.payment_id.is_some()
    }
}

define_port_error! {
    /// Errors surfaced by a journal backend.
    pub enum SubmissionJournalError {
        /// Reading or writing the journal failed.
        Io { message: String } =>
            "submission journal I/O failed: {message}",
        /// A stored checkpoint could not be decoded.
        Corrupt { message: String } =>
            "submission journal entry is corrupt: {message}",
    }
}

/// Port for persisting submission checkpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionJournal: Send + Sync {
    /// Checkpoint stored for `key`, if any.
    async fn load(
        &self,
        key: &SubmissionKey,
    ) -> Result<Option<SubmissionCheckpoint>, SubmissionJournalError>;

    /// Store `checkpoint`, replacing any previous one for its key.
    async fn save(&self, checkpoint: &SubmissionCheckpoint) -> Result<(), SubmissionJournalError>;

    /// Forget the checkpoint for `key`.
    async fn clear(&self, key: &SubmissionKey) -> Result<(), SubmissionJournalError>;
}
