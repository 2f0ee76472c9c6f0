//! Document ingestion: turn a [`DocumentInput`] into ordered paragraphs.
//!
//! ```text
//! PDF ──▶ page texts ──▶ join "\n\n" ──▶ split on blank lines ──▶ paragraphs
//!              │                                                     ▲
//!              └──▶ table detection ──▶ descriptions ───────────────┘
//!                                        (appended to the last paragraph)
//! ```
//!
//! Every input error is raised here, before the first completion call.

pub mod pdf;
pub mod tables;

use crate::config::{DigestConfig, DocumentInput};
use crate::error::DigestError;
use tables::DetectedTable;
use tracing::info;

/// Paragraphs ready for the pipeline, plus the tables they were augmented with.
#[derive(Debug, Clone, Default)]
pub struct IngestedDocument {
    pub paragraphs: Vec<String>,
    pub tables: Vec<DetectedTable>,
    pub table_descriptions: Vec<String>,
}

/// Resolve any input into paragraphs.
pub async fn ingest(
    input: &DocumentInput,
    config: &DigestConfig,
) -> Result<IngestedDocument, DigestError> {
    match input {
        DocumentInput::Text(text) => Ok(IngestedDocument {
            paragraphs: text_paragraphs(text)?,
            ..Default::default()
        }),
        DocumentInput::Paragraphs(paragraphs) => {
            let paragraphs: Vec<String> = paragraphs
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if paragraphs.is_empty() {
                return Err(DigestError::NoParagraphs {
                    source_name: input.display_name(),
                });
            }
            Ok(IngestedDocument {
                paragraphs,
                ..Default::default()
            })
        }
        DocumentInput::Pdf { path } => {
            pdf::validate_pdf_path(path)?;
            let pages = pdf::extract_page_texts(
                path,
                config.password.as_deref(),
                config.pdfium_lib_path.as_deref(),
            )
            .await?;

            let mut paragraphs = split_into_paragraphs(&join_pages(&pages));
            info!("PDF split into {} paragraphs", paragraphs.len());
            if paragraphs.is_empty() {
                return Err(DigestError::NoParagraphs {
                    source_name: input.display_name(),
                });
            }

            let (tables, table_descriptions) = if config.extract_tables {
                let tables = tables::detect_tables(&pages);
                if let Some(ref dir) = config.table_dir {
                    tables::export_csv(&tables, dir).await?;
                }
                let descriptions = tables::describe_tables(&tables);
                (tables, descriptions)
            } else {
                (Vec::new(), Vec::new())
            };
            augment_last_paragraph(&mut paragraphs, &table_descriptions);

            Ok(IngestedDocument {
                paragraphs,
                tables,
                table_descriptions,
            })
        }
    }
}

/// Text mode: the trimmed text is the single paragraph.
pub fn text_paragraphs(text: &str) -> Result<Vec<String>, DigestError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DigestError::EmptyInput);
    }
    Ok(vec![trimmed.to_string()])
}

/// Join page texts with a blank line so page breaks become paragraph breaks.
pub fn join_pages(pages: &[String]) -> String {
    pages.join("\n\n")
}

/// Split text on blank lines; blocks are trimmed and empty blocks dropped.
pub fn split_into_paragraphs(full_text: &str) -> Vec<String> {
    let normalised = full_text.replace("\r\n", "\n").replace('\r', "\n");
    normalised
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Append table descriptions, one per line, to the last paragraph only.
///
/// No-op when there are no descriptions or no paragraphs.
pub fn augment_last_paragraph(paragraphs: &mut [String], descriptions: &[String]) {
    if descriptions.is_empty() {
        return;
    }
    if let Some(last) = paragraphs.last_mut() {
        last.push('\n');
        last.push_str(&descriptions.join("\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_drops_blank_blocks() {
        let text = "First para\nstill first.\n\n\n\n  Second.  \n\n \n\nThird.";
        assert_eq!(
            split_into_paragraphs(text),
            vec!["First para\nstill first.", "Second.", "Third."]
        );
    }

    #[test]
    fn split_normalises_crlf() {
        assert_eq!(split_into_paragraphs("A\r\n\r\nB"), vec!["A", "B"]);
    }

    #[test]
    fn pages_become_paragraph_boundaries() {
        let pages = vec!["End of page one.".to_string(), "Start of two.".to_string()];
        assert_eq!(
            split_into_paragraphs(&join_pages(&pages)),
            vec!["End of page one.", "Start of two."]
        );
    }

    #[test]
    fn tables_attach_to_last_paragraph_only() {
        let mut paragraphs = vec!["P1".to_string(), "P2".to_string()];
        augment_last_paragraph(
            &mut paragraphs,
            &["Table 0: contains columns ['A','B']".to_string()],
        );
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0], "P1");
        assert_eq!(paragraphs[1], "P2\nTable 0: contains columns ['A','B']");
    }

    #[test]
    fn multiple_tables_are_newline_joined() {
        let mut paragraphs = vec!["P".to_string()];
        augment_last_paragraph(&mut paragraphs, &["T0".to_string(), "T1".to_string()]);
        assert_eq!(paragraphs[0], "P\nT0\nT1");
    }

    #[test]
    fn no_tables_leaves_paragraphs_untouched() {
        let mut paragraphs = vec!["P".to_string()];
        augment_last_paragraph(&mut paragraphs, &[]);
        assert_eq!(paragraphs, vec!["P"]);
    }

    #[test]
    fn text_mode_is_single_trimmed_paragraph() {
        assert_eq!(text_paragraphs("  Hello world.\n").unwrap(), vec!["Hello world."]);
        assert!(matches!(text_paragraphs(" \n\t"), Err(DigestError::EmptyInput)));
    }

    #[tokio::test]
    async fn paragraph_input_drops_blank_entries() {
        let input = DocumentInput::Paragraphs(vec![" A ".into(), "".into(), "B".into()]);
        let doc = ingest(&input, &DigestConfig::default()).await.unwrap();
        assert_eq!(doc.paragraphs, vec!["A", "B"]);
        assert!(doc.table_descriptions.is_empty());
    }

    #[tokio::test]
    async fn missing_pdf_fails_before_extraction() {
        let input = DocumentInput::Pdf {
            path: "/no/such/paper.pdf".into(),
        };
        let err = ingest(&input, &DigestConfig::default()).await.unwrap_err();
        assert!(matches!(err, DigestError::FileNotFound { .. }));
    }
}
