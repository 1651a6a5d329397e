//! Fingerprints of submission payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Errors raised while fingerprinting a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadHashError {
    /// A stored fingerprint was not 64 hexadecimal characters.
    #[error("payload hash must be 64 hex characters: {value}")]
    Malformed {
        /// Offending stored value.
        value: String,
    },
    /// The canonical JSON could not be serialised.
    #[error("failed to serialise canonical JSON payload: {message}")]
    Serialization {
        /// Serializer message.
        message: String,
    },
}

/// SHA-256 of a canonical JSON payload.
///
/// Stored in the submission journal as lowercase hex so a retry with the same
/// key but different content can be told apart from a genuine retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayloadHash([u8; 32]);

impl PayloadHash {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Lowercase hexadecimal form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PayloadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<PayloadHash> for String {
    fn from(value: PayloadHash) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for PayloadHash {
    type Error = PayloadHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut bytes = [0_u8; 32];
        hex::decode_to_slice(value.as_str(), &mut bytes)
            .map_err(|_| PayloadHashError::Malformed { value })?;
        Ok(Self(bytes))
    }
}

/// Canonicalise a JSON value and hash it.
///
/// Object keys are sorted recursively and the value is serialised compactly
/// before hashing, so key order and whitespace never change the fingerprint.
///
/// # Errors
///
/// Returns [`PayloadHashError::Serialization`] if serialisation fails.
///
/// # Example
///
/// ```
/// # use portal::domain::idempotency::canonicalize_and_hash;
/// # use serde_json::json;
/// let a = canonicalize_and_hash(&json!({"persona": 1, "oferta": 2})).expect("hash");
/// let b = canonicalize_and_hash(&json!({"oferta": 2, "persona": 1})).expect("hash");
/// assert_eq!(a, b);
/// ```
pub fn canonicalize_and_hash(value: &Value) -> Result<PayloadHash, PayloadHashError> {
    let encoded = serde_json::to_vec(&canonicalize(value)).map_err(|err| {
        PayloadHashError::Serialization {
            message: err.to_string(),
        }
    })?;
    Ok(PayloadHash::from_bytes(Sha256::digest(&encoded).into()))
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by_key(|(key, _)| key.as_str());
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, nested)| (key.clone(), canonicalize(nested)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
