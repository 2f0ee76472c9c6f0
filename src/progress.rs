//! Progress-callback trait for per-paragraph pipeline events.
//!
//! Inject an [`Arc<dyn DigestProgressCallback>`] via
//! [`crate::config::DigestConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the document.
//!
//! Paragraphs are processed strictly one after another, so events arrive in
//! paragraph order. The trait is still `Send + Sync` because a run may be
//! moved onto a tokio worker with [`crate::run::spawn_run`].
//!
//! # Example
//!
//! ```rust
//! use bilingual_digest::{DigestConfig, DigestProgressCallback, ParagraphRecord};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl DigestProgressCallback for CountingCallback {
//!     fn on_paragraph_complete(&self, index: usize, total: usize, record: &ParagraphRecord) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{}: {} keywords", index + 1, total, record.keywords_en.len());
//!     }
//! }
//!
//! let config = DigestConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::record::ParagraphRecord;
use std::sync::Arc;

/// Called by the pipeline as it processes each paragraph.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Indices are 0-based paragraph positions.
pub trait DigestProgressCallback: Send + Sync {
    /// Called once before the first completion call.
    fn on_run_start(&self, total_paragraphs: usize) {
        let _ = total_paragraphs;
    }

    /// Called just before the summarize call of a paragraph.
    fn on_paragraph_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called once the paragraph's record has been emitted.
    fn on_paragraph_complete(&self, index: usize, total: usize, record: &ParagraphRecord) {
        let _ = (index, total, record);
    }

    /// Called once after every paragraph produced a record.
    ///
    /// Not called when a completion failure aborts the run.
    fn on_run_complete(&self, total_paragraphs: usize) {
        let _ = total_paragraphs;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DigestProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DigestConfig`].
pub type ProgressCallback = Arc<dyn DigestProgressCallback>;
