//! Top-level run entry points.
//!
//! A run is: validate + ingest the input, resolve the LLM provider, push
//! every paragraph through the [`ParagraphPipeline`], then write the two
//! artifacts. Artifacts are written only when every paragraph succeeded; any
//! fatal error leaves the output directory untouched.

use crate::config::{DigestConfig, DocumentInput};
use crate::error::DigestError;
use crate::ingest;
use crate::pipeline::client::{CompletionClient, ProviderCompletionClient};
use crate::pipeline::paragraphs::ParagraphPipeline;
use crate::record::DocumentResult;
use crate::writer::{self, ArtifactPaths};
use edgequake_llm::{LLMProvider, ProviderFactory};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Default model when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Summary numbers of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub paragraphs: usize,
    pub tables: usize,
    pub completion_calls: usize,
    /// Records with at least one field emptied by a malformed reply.
    pub degraded_records: usize,
    pub total_duration_ms: u64,
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub result: DocumentResult,
    pub artifacts: ArtifactPaths,
    pub stats: RunStats,
}

/// Process `input` end to end with the provider described by `config`.
///
/// # Errors
/// Input errors are returned before any completion call. A failed completion
/// call aborts the run and no artifact is written.
pub async fn run(input: &DocumentInput, config: &DigestConfig) -> Result<RunOutput, DigestError> {
    info!("Starting run: {}", input.display_name());
    let document = ingest::ingest(input, config).await?;

    let provider = resolve_provider(config)?;
    let client: Arc<dyn CompletionClient> =
        Arc::new(ProviderCompletionClient::new(provider, config));

    process_ingested(input, config, client, document).await
}

/// Same as [`run`] but with a caller-supplied completion client.
pub async fn run_with_client(
    input: &DocumentInput,
    config: &DigestConfig,
    client: Arc<dyn CompletionClient>,
) -> Result<RunOutput, DigestError> {
    info!("Starting run: {}", input.display_name());
    let document = ingest::ingest(input, config).await?;
    process_ingested(input, config, client, document).await
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(input: &DocumentInput, config: &DigestConfig) -> Result<RunOutput, DigestError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DigestError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(input, config))
}

/// Submit a run as a background tokio task.
///
/// The caller keeps its own task responsive and awaits the handle (or polls
/// it) for the outcome. There is no cancellation.
pub fn spawn_run(
    input: DocumentInput,
    config: DigestConfig,
) -> tokio::task::JoinHandle<Result<RunOutput, DigestError>> {
    tokio::spawn(async move { run(&input, &config).await })
}

async fn process_ingested(
    input: &DocumentInput,
    config: &DigestConfig,
    client: Arc<dyn CompletionClient>,
    document: ingest::IngestedDocument,
) -> Result<RunOutput, DigestError> {
    let start = Instant::now();

    let mut pipeline =
        ParagraphPipeline::new(client).with_progress(config.progress_callback.clone());
    let result = pipeline.process_document(&document.paragraphs).await?;

    let artifacts = ArtifactPaths::for_input(input, &config.output_dir);
    writer::write_artifacts(&result, &artifacts).await?;

    let stats = RunStats {
        paragraphs: result.len(),
        tables: document.tables.len(),
        completion_calls: pipeline.calls(),
        degraded_records: result.degraded_count(),
        total_duration_ms: start.elapsed().as_millis() as u64,
    };

    if stats.degraded_records > 0 {
        warn!(
            "{}/{} records have empty fields from malformed model replies",
            stats.degraded_records, stats.paragraphs
        );
    }
    info!(
        "Run complete, results saved to {} and {}",
        artifacts.result_json.display(),
        artifacts.translated_text.display()
    );

    Ok(RunOutput {
        result,
        artifacts,
        stats,
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is.
/// 2. **Named provider** (`config.provider_name`): created through
///    [`ProviderFactory::create_llm_provider`], which reads that provider's
///    API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **Full auto-detection** ([`ProviderFactory::from_env`]).
///
/// This is the only place the library consults the environment, and it runs
/// once per run before the first paragraph.
pub fn resolve_provider(config: &DigestConfig) -> Result<Arc<dyn LLMProvider>, DigestError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, config.model.as_deref().unwrap_or(&model));
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DigestError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, DigestError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DigestError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
