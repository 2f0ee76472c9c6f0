//! Artifact writing: the JSON record list and the translated full text.
//!
//! Both files are written only after the pipeline finished, each through a
//! temp file + rename so a crash never leaves a half-written artifact.

use crate::config::DocumentInput;
use crate::error::DigestError;
use crate::record::{DocumentResult, ParagraphRecord};
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where the two artifacts of a run live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub result_json: PathBuf,
    pub translated_text: PathBuf,
}

impl ArtifactPaths {
    /// Derive artifact paths for `input` inside `output_dir`.
    ///
    /// PDF input is named after the file stem; text input after the local
    /// time the run was started.
    pub fn for_input(input: &DocumentInput, output_dir: &Path) -> Self {
        let stem = match input {
            DocumentInput::Pdf { path } => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string()),
            DocumentInput::Text(_) | DocumentInput::Paragraphs(_) => {
                format!("text_input_{}", Local::now().format("%Y%m%d_%H%M%S"))
            }
        };
        Self::with_stem(output_dir, &stem)
    }

    pub fn with_stem(output_dir: &Path, stem: &str) -> Self {
        Self {
            result_json: output_dir.join(format!("{stem}_result.json")),
            translated_text: output_dir.join(format!("{stem}_translated_paper.txt")),
        }
    }
}

/// Serialise records as indented UTF-8 JSON.
pub fn records_to_json(records: &[ParagraphRecord]) -> Result<String, DigestError> {
    serde_json::to_string_pretty(records)
        .map_err(|e| DigestError::Internal(format!("Failed to serialise records: {e}")))
}

/// Write both artifacts of `result` to `paths`.
///
/// The pair is all-or-nothing: when the text artifact cannot be written the
/// freshly written JSON artifact is removed again.
pub async fn write_artifacts(
    result: &DocumentResult,
    paths: &ArtifactPaths,
) -> Result<(), DigestError> {
    save_to_json(&result.records, &paths.result_json).await?;
    if let Err(e) = save_translated_text(&result.translated_full_text, &paths.translated_text).await
    {
        if let Err(rm) = tokio::fs::remove_file(&paths.result_json).await {
            warn!(
                "Could not remove {} after failed write: {}",
                paths.result_json.display(),
                rm
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Save the record list as a JSON array.
pub async fn save_to_json(records: &[ParagraphRecord], path: &Path) -> Result<(), DigestError> {
    let json = records_to_json(records)?;
    write_atomic(path, json.as_bytes()).await?;
    info!("Results saved as JSON: {}", path.display());
    Ok(())
}

/// Save the Chinese paragraphs joined by blank lines.
pub async fn save_translated_text(paragraphs: &[String], path: &Path) -> Result<(), DigestError> {
    write_atomic(path, paragraphs.join("\n\n").as_bytes()).await?;
    info!("Translated full text saved: {}", path.display());
    Ok(())
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DigestError> {
    let write_err = |e| DigestError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    Ok(())
}
