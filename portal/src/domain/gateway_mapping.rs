//! Translation of port errors into domain errors.

use serde_json::json;

use super::Error;
use super::ports::{GatewayError, ReceiptStorageError, SubmissionJournalError};

/// Remote error prefixed with a user-facing context line.
///
/// Unauthorized responses keep a machine-readable flag so the command surface
/// can ask the operator to sign in again.
pub(crate) fn map_gateway_error(context: &str, error: &GatewayError) -> Error {
    let message = format!("{context}: {error}");
    if error.is_unauthorized() {
        Error::remote(message).with_details(json!({ "unauthorized": true }))
    } else {
        Error::remote(message)
    }
}

pub(crate) fn map_storage_error(context: &str, error: &ReceiptStorageError) -> Error {
    Error::upload(format!("{context}: {error}"))
}

pub(crate) fn map_journal_error(context: &str, error: &SubmissionJournalError) -> Error {
    Error::internal(format!("{context}: {error}"))
}
