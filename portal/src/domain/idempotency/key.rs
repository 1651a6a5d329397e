//! Submission keys identify one submission saga across retries.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors for [`SubmissionKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionKeyValidationError {
    /// The key string was empty.
    #[error("submission key must not be empty")]
    EmptyKey,
    /// The key string was not a valid UUID.
    #[error("submission key must be a valid UUID")]
    InvalidKey,
}

/// Client-generated UUID naming one enrollment submission.
///
/// Each remote step derives its own `Idempotency-Key` header from it (see
/// [`SubmissionKey::step_key`]) so a retried step can be recognised by the
/// backend, and the local journal is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubmissionKey(Uuid);

impl SubmissionKey {
    /// Validate and construct a key from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionKeyValidationError::EmptyKey`] for empty input and
    /// [`SubmissionKeyValidationError::InvalidKey`] for anything that is not a
    /// UUID without surrounding whitespace.
    ///
    /// # Example
    ///
    /// ```
    /// # use portal::domain::idempotency::SubmissionKey;
    /// let key = SubmissionKey::new("550e8400-e29b-41d4-a716-446655440000")
    ///     .expect("valid UUID");
    /// assert_eq!(key.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    /// ```
    pub fn new(key: impl AsRef<str>) -> Result<Self, SubmissionKeyValidationError> {
        let raw = key.as_ref();
        if raw.is_empty() {
            return Err(SubmissionKeyValidationError::EmptyKey);
        }
        if raw.trim() != raw {
            return Err(SubmissionKeyValidationError::InvalidKey);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| SubmissionKeyValidationError::InvalidKey)
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random key for a new submission.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Per-step idempotency token sent with a remote write.
    pub fn step_key(&self, step: &str) -> StepKey {
        StepKey(format!("{}:{step}", self.0))
    }
}

impl fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SubmissionKey {
    type Err = SubmissionKeyValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::new(raw)
    }
}

impl From<SubmissionKey> for String {
    fn from(value: SubmissionKey) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for SubmissionKey {
    type Error = SubmissionKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Idempotency token for one remote step of a saga.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepKey(String);

impl StepKey {
    /// Key for `step` of a saga named by `scope` rather than a
    /// [`SubmissionKey`], e.g. `pago-90:quota`.
    pub fn scoped(scope: &str, step: &str) -> Self {
        Self(format!("{scope}:{step}"))
    }

    /// Header value.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for StepKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
