//! The paragraph processing pipeline.
//!
//! ## Data Flow
//!
//! ```text
//! paragraph ──▶ summarize prompt ──▶ client ──▶ parse ──┐
//!                                                       │ summary + keywords
//!           ┌───────────────────────────────────────────┘
//!           └─▶ translate prompt ──▶ client ──▶ parse ──▶ ParagraphRecord
//! ```
//!
//! 1. [`client`]    : the completion contract and its `edgequake-llm` backend;
//!    the only stage with network I/O
//! 2. [`parse`]     : turn replies into stage results, degrading malformed
//!    JSON to empty fields
//! 3. [`paragraphs`]: drive both stages for every paragraph in order and
//!    accumulate the document result

pub mod client;
pub mod paragraphs;
pub mod parse;
