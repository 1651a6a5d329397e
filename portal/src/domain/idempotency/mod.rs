//! Idempotency primitives for the submission saga.
//!
//! - [`SubmissionKey`]: client-generated UUID naming one submission across
//!   retries; [`StepKey`] is the per-step header value derived from it or
//!   from another saga scope such as a payment id.
//! - [`PayloadHash`]: SHA-256 of the canonicalised submission payload, used to
//!   detect a key being reused for different content.

mod key;
mod payload;

pub use key::{StepKey, SubmissionKey, SubmissionKeyValidationError};
pub use payload::{PayloadHash, PayloadHashError, canonicalize_and_hash};
