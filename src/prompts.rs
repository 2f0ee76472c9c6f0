//! Prompt templates for the two completion stages.
//!
//! The JSON key names spelled out in these templates are the contract the
//! parsers in [`crate::pipeline::parse`] rely on. Changing a key here without
//! changing the matching `KEY_*` constant turns every reply into a parse
//! failure.

use crate::pipeline::client::Message;

/// Key holding the English summary in the summarize reply.
pub const KEY_SUMMARY: &str = "Summary";
/// Key holding the comma-separated English keywords in the summarize reply.
pub const KEY_KEYWORDS: &str = "Keywords";
/// Key holding the translated paragraph in the translate reply.
pub const KEY_ZH_PARAGRAPH: &str = "Chinese Paragraph";
/// Key holding the translated summary in the translate reply.
pub const KEY_ZH_SUMMARY: &str = "Chinese Summary";
/// Key holding the translated keywords in the translate reply.
pub const KEY_ZH_KEYWORDS: &str = "Chinese Keywords";

/// Summarize template. `{paragraph}` is replaced verbatim.
pub const SUMMARY_TEMPLATE: &str = r#"Please read the following English paragraph and provide a summary and keywords in JSON format.

Paragraph:
{paragraph}

Output format:
{
    "Summary": "...",
    "Keywords": "keyword1, keyword2, keyword3, keyword4, keyword5"
}
"#;

/// Translate template. `{text}` is replaced with the English block.
pub const TRANSLATION_TEMPLATE: &str = r#"Translate the following English text into Chinese and keep the same structure:

{text}

Output format should be a JSON object with the following keys:
{
    "Chinese Paragraph": "...",
    "Chinese Summary": "...",
    "Chinese Keywords": "..."
}
"#;

/// Build the summarize request for one paragraph.
pub fn build_summary_prompt(paragraph: &str) -> Vec<Message> {
    vec![Message::user(SUMMARY_TEMPLATE.replacen(
        "{paragraph}",
        paragraph,
        1,
    ))]
}

/// Concatenate a paragraph with its English summary and keywords.
///
/// This block is the input text of the translate stage.
pub fn english_block(paragraph: &str, summary: &str, keywords: &str) -> String {
    format!(
        "English Paragraph:\n{paragraph}\n\nEnglish Summary:\n{summary}\n\nEnglish Keywords:\n{keywords}"
    )
}

/// Build the translate request for an English block.
pub fn build_translation_prompt(english_block: &str) -> Vec<Message> {
    vec![Message::user(TRANSLATION_TEMPLATE.replacen(
        "{text}",
        english_block,
        1,
    ))]
}
