//! Per-paragraph and per-document result types.
//!
//! [`ParagraphRecord`] is the persisted unit; its serde field names are the
//! keys of the JSON artifact and must not change.

use serde::{Deserialize, Serialize};

/// Parsed reply of the summarize stage.
///
/// `keywords` is the comma-separated string exactly as the model produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOneResult {
    pub summary: String,
    pub keywords: String,
}

/// Parsed reply of the translate stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageTwoResult {
    pub zh_paragraph: String,
    pub zh_summary: String,
    pub zh_keywords: String,
}

/// The complete bilingual record of one paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub original_paragraph_en: String,
    pub summary_en: String,
    pub keywords_en: Vec<String>,
    pub paragraph_zh: String,
    pub summary_zh: String,
    pub keywords_zh: Vec<String>,
}

impl ParagraphRecord {
    /// Assemble a record from the paragraph and both stage results.
    pub fn assemble(paragraph: &str, en: StageOneResult, zh: StageTwoResult) -> Self {
        Self {
            original_paragraph_en: paragraph.to_string(),
            keywords_en: split_keywords(&en.keywords),
            summary_en: en.summary,
            keywords_zh: split_keywords(&zh.zh_keywords),
            paragraph_zh: zh.zh_paragraph,
            summary_zh: zh.zh_summary,
        }
    }

    /// True when any model-derived field is empty, which is how a malformed
    /// reply shows up in an otherwise complete record.
    pub fn is_degraded(&self) -> bool {
        self.summary_en.is_empty()
            || self.keywords_en.is_empty()
            || self.paragraph_zh.is_empty()
            || self.summary_zh.is_empty()
            || self.keywords_zh.is_empty()
    }
}

/// Everything one run produced, in paragraph order.
///
/// `translated_full_text` is built alongside `records` in the same pass:
/// `translated_full_text[i] == records[i].paragraph_zh` for every `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub records: Vec<ParagraphRecord>,
    pub translated_full_text: Vec<String>,
}

impl DocumentResult {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            records: Vec::with_capacity(n),
            translated_full_text: Vec::with_capacity(n),
        }
    }

    /// Append a record and its Chinese paragraph to the two sequences.
    pub fn push(&mut self, record: ParagraphRecord) {
        self.translated_full_text.push(record.paragraph_zh.clone());
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The translated-text artifact: Chinese paragraphs separated by a blank line.
    pub fn translated_text(&self) -> String {
        self.translated_full_text.join("\n\n")
    }

    /// Number of records carrying at least one empty model-derived field.
    pub fn degraded_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_degraded()).count()
    }
}

/// Split a comma-joined keyword string into trimmed, non-empty tokens.
pub fn split_keywords(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
