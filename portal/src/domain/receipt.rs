//! Payment receipt files and the rules they must satisfy before upload.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::{OfferingId, PersonId};

/// Largest accepted receipt, in bytes (10 MiB).
pub const MAX_RECEIPT_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted for receipts.
pub const ALLOWED_RECEIPT_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "application/pdf",
];

/// Receipt rule violations detected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptRuleViolation {
    /// The file has no content.
    #[error("El comprobante está vacío")]
    Empty,
    /// The file exceeds [`MAX_RECEIPT_BYTES`].
    #[error("El comprobante supera el máximo de 10MB ({size} bytes)")]
    TooLarge {
        /// Actual size in bytes.
        size: usize,
    },
    /// The MIME type is not in [`ALLOWED_RECEIPT_TYPES`].
    #[error("Tipo de archivo no permitido: {content_type}")]
    UnsupportedType {
        /// Offending MIME type.
        content_type: String,
    },
}

/// A receipt file chosen by the payer.
#[derive(Clone, PartialEq, Eq)]
pub struct ReceiptFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ReceiptFile {
    /// Wrap file content. Rules are checked separately by [`Self::check`].
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into().trim().to_ascii_lowercase(),
            bytes,
        }
    }

    /// Original file name.
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// Normalised MIME type.
    pub fn content_type(&self) -> &str {
        self.content_type.as_str()
    }

    /// File content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Verify size and type.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn check(&self) -> Result<(), ReceiptRuleViolation> {
        if self.bytes.is_empty() {
            return Err(ReceiptRuleViolation::Empty);
        }
        if self.bytes.len() > MAX_RECEIPT_BYTES {
            return Err(ReceiptRuleViolation::TooLarge {
                size: self.bytes.len(),
            });
        }
        if !ALLOWED_RECEIPT_TYPES.contains(&self.content_type.as_str()) {
            return Err(ReceiptRuleViolation::UnsupportedType {
                content_type: self.content_type.clone(),
            });
        }
        Ok(())
    }

    /// File extension, taken from the name or derived from the MIME type.
    pub fn extension(&self) -> String {
        let from_name = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
        from_name.unwrap_or_else(|| {
            match self.content_type.as_str() {
                "image/png" => "png",
                "image/webp" => "webp",
                "application/pdf" => "pdf",
                _ => "jpg",
            }
            .to_owned()
        })
    }

    /// Lowercase hex SHA-256 of the content.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

impl fmt::Debug for ReceiptFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiptFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A receipt stored in object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReceipt {
    /// Object path inside the bucket.
    pub path: String,
    /// Publicly reachable URL.
    pub public_url: String,
}

/// Object path for a receipt: `{person}/{offering}/{person}_{millis}.{ext}`.
///
/// # Examples
/// ```
/// use portal::domain::{OfferingId, PersonId, receipt_object_path};
///
/// let path = receipt_object_path(PersonId::new(4), OfferingId::new(9), 1_700_000_000_000, "pdf");
/// assert_eq!(path, "4/9/4_1700000000000.pdf");
/// ```
pub fn receipt_object_path(
    person: PersonId,
    offering: OfferingId,
    unix_millis: i64,
    extension: &str,
) -> String {
    format!("{person}/{offering}/{person}_{unix_millis}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::png("image/png")]
    #[case::jpeg("image/jpeg")]
    #[case::jpg("image/jpg")]
    #[case::webp("image/webp")]
    #[case::pdf("application/pdf")]
    #[case::uppercase("IMAGE/PNG")]
    fn accepts_allowed_types(#[case] content_type: &str) {
        let receipt = ReceiptFile::new("pago.bin", content_type, vec![1, 2, 3]);
        assert_eq!(receipt.check(), Ok(()));
    }

    #[test]
    fn rejects_unsupported_types() {
        let receipt = ReceiptFile::new("pago.gif", "image/gif", vec![1]);
        assert!(matches!(
            receipt.check(),
            Err(ReceiptRuleViolation::UnsupportedType { .. })
        ));
    }

    #[test]
    fn rejects_files_over_ten_mebibytes() {
        let bytes = vec![0; MAX_RECEIPT_BYTES + 1];
        let receipt = ReceiptFile::new("pago.pdf", "application/pdf", bytes);
        assert_eq!(
            receipt.check(),
            Err(ReceiptRuleViolation::TooLarge {
                size: MAX_RECEIPT_BYTES + 1
            })
        );
    }

    #[test]
    fn accepts_exactly_ten_mebibytes() {
        let receipt = ReceiptFile::new("pago.pdf", "application/pdf", vec![0; MAX_RECEIPT_BYTES]);
        assert_eq!(receipt.check(), Ok(()));
    }

    #[test]
    fn rejects_empty_files() {
        let receipt = ReceiptFile::new("pago.pdf", "application/pdf", Vec::new());
        assert_eq!(receipt.check(), Err(ReceiptRuleViolation::Empty));
    }

    #[rstest]
    #[case("comprobante.PNG", "image/png", "png")]
    #[case("comprobante", "application/pdf", "pdf")]
    #[case("comprobante.", "image/webp", "webp")]
    #[case("sin-extension", "image/jpeg", "jpg")]
    fn derives_extensions(#[case] name: &str, #[case] content_type: &str, #[case] expected: &str) {
        let receipt = ReceiptFile::new(name, content_type, vec![1]);
        assert_eq!(receipt.extension(), expected);
    }
}
