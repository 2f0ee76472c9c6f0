//! # bilingual-digest
//!
//! Read an English document paragraph by paragraph and produce, for every
//! paragraph, an English summary and keywords plus a Chinese translation of
//! all three, using a chat-completion LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / text
//!  │
//!  ├─ 1. Ingest     page text via pdfium → paragraphs; table descriptions
//!  │                appended to the last paragraph
//!  ├─ 2. Summarize  one LLM call per paragraph → {"Summary", "Keywords"}
//!  ├─ 3. Translate  one LLM call on paragraph + summary + keywords
//!  │                → {"Chinese Paragraph", "Chinese Summary", "Chinese Keywords"}
//!  ├─ 4. Assemble   ParagraphRecord per paragraph, in document order
//!  └─ 5. Write      <name>_result.json + <name>_translated_paper.txt
//! ```
//!
//! Paragraphs are processed strictly one after another. A failed LLM call
//! aborts the run without writing anything; a reply that is not the
//! requested JSON only leaves the affected fields empty.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bilingual_digest::{run, DigestConfig, DocumentInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = DigestConfig::builder().output_dir("result").build()?;
//!     let input = DocumentInput::Pdf { path: "paper.pdf".into() };
//!     let output = run(&input, &config).await?;
//!     println!("{} paragraphs → {}", output.stats.paragraphs,
//!         output.artifacts.result_json.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bidigest` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod record;
pub mod run;
pub mod writer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DigestConfig, DigestConfigBuilder, DocumentInput, InputMode};
pub use error::{CompletionError, DigestError, MalformedResponse, Stage};
pub use pipeline::client::{CompletionClient, Message, ProviderCompletionClient, Role};
pub use pipeline::paragraphs::ParagraphPipeline;
pub use progress::{DigestProgressCallback, NoopProgressCallback, ProgressCallback};
pub use record::{DocumentResult, ParagraphRecord, StageOneResult, StageTwoResult};
pub use run::{resolve_provider, run, run_sync, run_with_client, spawn_run, RunOutput, RunStats};
pub use writer::ArtifactPaths;
