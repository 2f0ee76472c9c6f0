//! Paragraph pipeline: two completion stages per paragraph, in order.
//!
//! Every paragraph goes through
//! `summarize call → parse → translate call → parse → record`, and the next
//! paragraph only starts once the previous record has been emitted. There is
//! no concurrency across paragraphs: the translate stage needs the summarize
//! result, and records must come out in document order.
//!
//! ## Failure policy
//!
//! * A [`CompletionError`](crate::error::CompletionError) from either call
//!   aborts the whole document. No partial [`DocumentResult`] is returned.
//! * A malformed reply only empties the affected fields; the record is still
//!   emitted and the run continues.

use crate::error::{DigestError, Stage};
use crate::pipeline::client::{CompletionClient, Message};
use crate::pipeline::parse::{parse_stage_one, parse_stage_two};
use crate::progress::ProgressCallback;
use crate::prompts::{build_summary_prompt, build_translation_prompt, english_block};
use crate::record::{DocumentResult, ParagraphRecord};
use std::sync::Arc;
use tracing::{debug, info};

/// Drives a [`CompletionClient`] over a document's paragraphs.
pub struct ParagraphPipeline {
    client: Arc<dyn CompletionClient>,
    progress: Option<ProgressCallback>,
    calls: usize,
}

impl ParagraphPipeline {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            progress: None,
            calls: 0,
        }
    }

    /// Report per-paragraph events to `cb`.
    pub fn with_progress(mut self, cb: Option<ProgressCallback>) -> Self {
        self.progress = cb;
        self
    }

    /// Completion calls issued so far (successful or not).
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Process every paragraph in order.
    ///
    /// # Errors
    /// [`DigestError::NoParagraphs`] for an empty slice (before any call), or
    /// [`DigestError::Completion`] for the first call that fails.
    pub async fn process_document(
        &mut self,
        paragraphs: &[String],
    ) -> Result<DocumentResult, DigestError> {
        if paragraphs.is_empty() {
            return Err(DigestError::NoParagraphs {
                source_name: "<paragraphs>".to_string(),
            });
        }

        let total = paragraphs.len();
        if let Some(ref cb) = self.progress {
            cb.on_run_start(total);
        }

        let mut result = DocumentResult::with_capacity(total);
        for (idx, paragraph) in paragraphs.iter().enumerate() {
            info!("Processing paragraph {} of {}", idx + 1, total);
            if let Some(ref cb) = self.progress {
                cb.on_paragraph_start(idx, total);
            }

            let record = self.process_paragraph(idx, paragraph).await?;

            if let Some(ref cb) = self.progress {
                cb.on_paragraph_complete(idx, total, &record);
            }
            result.push(record);
        }

        if let Some(ref cb) = self.progress {
            cb.on_run_complete(total);
        }
        Ok(result)
    }

    /// Run both stages for one paragraph and assemble its record.
    pub async fn process_paragraph(
        &mut self,
        idx: usize,
        paragraph: &str,
    ) -> Result<ParagraphRecord, DigestError> {
        let reply = self
            .call(idx, Stage::Summarize, &build_summary_prompt(paragraph))
            .await?;
        debug!("Summary and keywords reply: {}", reply);
        let en = parse_stage_one(&reply);

        let block = english_block(paragraph, &en.summary, &en.keywords);
        let reply = self
            .call(idx, Stage::Translate, &build_translation_prompt(&block))
            .await?;
        debug!("Translation reply: {}", reply);
        let zh = parse_stage_two(&reply);

        Ok(ParagraphRecord::assemble(paragraph, en, zh))
    }

    async fn call(
        &mut self,
        paragraph: usize,
        stage: Stage,
        messages: &[Message],
    ) -> Result<String, DigestError> {
        self.calls += 1;
        self.client
            .call(messages)
            .await
            .map_err(|source| DigestError::Completion {
                paragraph,
                stage,
                source,
            })
    }
}
