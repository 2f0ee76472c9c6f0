//! Error types for the bilingual-digest library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`DigestError`]: **Fatal**: the run cannot produce artifacts at all
//!   (bad input, unreadable PDF, provider not configured, a completion call
//!   failed). Returned as `Err(DigestError)` from the top-level `run*`
//!   functions; no output file is written.
//!
//! * [`CompletionError`]: a single call to the language model could not be
//!   completed. The pipeline never swallows it: it is wrapped into
//!   [`DigestError::Completion`] together with the paragraph index and stage.
//!
//! * [`MalformedResponse`]: **Non-fatal**: the model answered, but not with
//!   the JSON object the prompt asked for. The lenient parsers in
//!   [`crate::pipeline::parse`] log it and fall back to empty fields so the
//!   rest of the document still gets processed.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the bilingual-digest library.
#[derive(Debug, Error)]
pub enum DigestError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Text mode was selected but the text is empty or only whitespace.
    #[error("No input text provided")]
    EmptyInput,

    /// Segmentation produced no paragraphs, so there is nothing to process.
    #[error("Document '{source_name}' contains no paragraphs of text")]
    NoParagraphs { source_name: String },

    /// The requested input mode is neither `pdf` nor `text`.
    #[error("Invalid mode '{mode}'. Please choose 'pdf' or 'text'.")]
    InvalidMode { mode: String },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not return the text layer of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Install libpdfium or point --pdfium-lib at the directory containing it."
    )]
    PdfiumBindingFailed(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// A completion call failed; the whole run is aborted.
    #[error("Paragraph {}: {stage} call failed: {source}", .paragraph + 1)]
    Completion {
        /// 0-based paragraph index.
        paragraph: usize,
        stage: Stage,
        #[source]
        source: CompletionError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DigestError {
    /// True for errors raised while validating input, before any remote call.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DigestError::EmptyInput
                | DigestError::NoParagraphs { .. }
                | DigestError::InvalidMode { .. }
                | DigestError::FileNotFound { .. }
                | DigestError::PermissionDenied { .. }
                | DigestError::NotAPdf { .. }
        )
    }
}

/// Which of the two model calls made for a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// English summary + keyword extraction.
    Summarize,
    /// English → Chinese translation of paragraph, summary and keywords.
    Translate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Summarize => f.write_str("summarize"),
            Stage::Translate => f.write_str("translate"),
        }
    }
}

/// A completion call that could not be completed.
///
/// No partial reply is ever carried alongside this error.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The request was rejected before being sent.
    #[error("Invalid completion request: {0}")]
    InvalidRequest(String),

    /// Transport or provider failure reported by the LLM client.
    #[error("LLM API error: {0}")]
    Upstream(String),
}

/// A model reply that does not follow the requested JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedResponse {
    /// The reply is not valid JSON.
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(String),

    /// The reply is valid JSON but not an object.
    #[error("reply is JSON but not an object")]
    NotAnObject,
}
