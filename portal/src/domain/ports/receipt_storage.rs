//! Driven port for receipt object storage.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{ReceiptFile, StoredReceipt};

define_port_error! {
    /// Errors surfaced by the object store.
    pub enum ReceiptStorageError {
        /// Network transport failed.
        Transport { message: String } =>
            "receipt storage transport failed: {message}",
        /// The store refused the object.
        Rejected { status: u16, message: String } =>
            "receipt storage rejected request with status {status}: {message}",
        /// The adapter refused to build the request.
        InvalidRequest { message: String } =>
            "receipt storage request invalid: {message}",
    }
}

/// Port for storing payment receipts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReceiptStorage: Send + Sync {
    /// Store `receipt` at `path`, replacing any object already there, and
    /// return its public location.
    async fn upload(
        &self,
        path: &str,
        receipt: &ReceiptFile,
    ) -> Result<StoredReceipt, ReceiptStorageError>;

    /// Delete the object at `path`.
    async fn remove(&self, path: &str) -> Result<(), ReceiptStorageError>;
}
