//! Local file access for receipts and certificates.

use std::path::Path;

use cap_std::{ambient_authority, fs::Dir};

use crate::domain::{CertificateDocument, Error, ReceiptFile};

/// MIME type inferred from the file extension; unknown extensions are
/// passed through so the receipt rules reject them with a clear message.
fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

pub(super) fn read_receipt(path: &Path) -> Result<ReceiptFile, Error> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::validation(format!("{} no es un archivo", path.display())))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        Error::validation(format!(
            "No se pudo abrir la carpeta del comprobante {}: {error}",
            parent.display()
        ))
    })?;
    let bytes = directory.read(file_name).map_err(|error| {
        Error::validation(format!(
            "No se pudo leer el comprobante {}: {error}",
            path.display()
        ))
    })?;
    Ok(ReceiptFile::new(
        file_name.to_string_lossy(),
        content_type_for(path),
        bytes,
    ))
}

pub(super) fn write_certificate(
    output: &Path,
    document: &CertificateDocument,
) -> Result<String, Error> {
    let saving = |error: std::io::Error| {
        Error::internal(format!(
            "No se pudo guardar el certificado en {}: {error}",
            output.display()
        ))
    };
    Dir::create_ambient_dir_all(output, ambient_authority()).map_err(saving)?;
    let directory = Dir::open_ambient_dir(output, ambient_authority()).map_err(saving)?;
    directory
        .write(&document.file_name, &document.bytes)
        .map_err(saving)?;
    Ok(output.join(&document.file_name).display().to_string())
}
