//! Receipt object-storage adapters.

mod http_storage;

pub use http_storage::{HttpReceiptStorage, ReceiptStorageConfig};
