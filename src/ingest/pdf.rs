//! PDF text extraction via pdfium.
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and must not run on a Tokio worker thread. The whole
//! load-and-extract step runs on the blocking pool.

use crate::error::DigestError;
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Check that `path` exists, is readable and starts with the `%PDF` magic.
pub fn validate_pdf_path(path: &Path) -> Result<(), DigestError> {
    if !path.exists() {
        return Err(DigestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
                return Err(DigestError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DigestError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(DigestError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(())
}

/// Extract the text layer of every page, in page order.
pub async fn extract_page_texts(
    pdf_path: &Path,
    password: Option<&str>,
    pdfium_lib_path: Option<&Path>,
) -> Result<Vec<String>, DigestError> {
    let path = pdf_path.to_path_buf();
    let password = password.map(str::to_string);
    let lib_path = pdfium_lib_path.map(Path::to_path_buf);

    tokio::task::spawn_blocking(move || {
        extract_page_texts_blocking(&path, password.as_deref(), lib_path.as_deref())
    })
    .await
    .map_err(|e| DigestError::Internal(format!("Text extraction task panicked: {}", e)))?
}

fn extract_page_texts_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    pdfium_lib_path: Option<&Path>,
) -> Result<Vec<String>, DigestError> {
    let pdfium = bind_pdfium(pdfium_lib_path)?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| load_error(pdf_path, password, e))?;

    let mut texts = Vec::new();
    for (idx, page) in document.pages().iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| DigestError::TextExtractionFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;
        let content = text.all();
        debug!("Page {}: {} chars of text", idx + 1, content.len());
        texts.push(content);
    }

    info!("PDF text extraction complete: {} pages", texts.len());
    Ok(texts)
}

/// Bind pdfium from an explicit directory, or from the working directory
/// with the system library as fallback.
fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, DigestError> {
    let bindings = match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| DigestError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn load_error(pdf_path: &Path, password: Option<&str>, e: PdfiumError) -> DigestError {
    let path: PathBuf = pdf_path.to_path_buf();
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            DigestError::WrongPassword { path }
        } else {
            DigestError::PasswordRequired { path }
        }
    } else {
        DigestError::CorruptPdf {
            path,
            detail: err_str,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = validate_pdf_path(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, DigestError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_not_a_pdf() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"PK\x03\x04 not a pdf").unwrap();
        let err = validate_pdf_path(tmp.path()).unwrap_err();
        assert!(matches!(err, DigestError::NotAPdf { magic, .. } if &magic == b"PK\x03\x04"));
    }

    #[test]
    fn short_file_is_not_a_pdf() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%P").unwrap();
        assert!(matches!(
            validate_pdf_path(tmp.path()),
            Err(DigestError::NotAPdf { .. })
        ));
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n").unwrap();
        assert!(validate_pdf_path(tmp.path()).is_ok());
    }
}
