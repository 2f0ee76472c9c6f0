//! Configuration types for a digest run.
//!
//! All run behaviour is controlled through [`DigestConfig`], built via its
//! [`DigestConfigBuilder`]. The config is constructed once by the caller and
//! passed by reference into the run; nothing inside the pipeline reads
//! process-wide state such as environment variables.

use crate::error::DigestError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration for one digest run.
///
/// # Example
/// ```rust
/// use bilingual_digest::DigestConfig;
///
/// let config = DigestConfig::builder()
///     .model("gpt-4.1-mini")
///     .output_dir("out")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 4096);
/// ```
#[derive(Clone)]
pub struct DigestConfig {
    /// LLM model identifier, e.g. "gpt-4.1-mini". If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for both completion calls. Default: 0.1.
    ///
    /// Both stages must answer with a strict JSON object; low temperature
    /// keeps the model on the requested format.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per call. Default: 4096.
    ///
    /// The translation reply carries the whole paragraph in Chinese plus the
    /// summary and keywords, so it needs roughly the paragraph's own length.
    pub max_tokens: usize,

    /// Directory receiving the JSON and translated-text artifacts. Default: `result`.
    pub output_dir: PathBuf,

    /// Detect tables in PDF input and append their descriptions to the last
    /// paragraph. Default: true.
    pub extract_tables: bool,

    /// When set, every detected table is also exported as `table_{n}.csv` here.
    pub table_dir: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Directory holding the pdfium shared library. If None, the current
    /// directory is tried first, then the system library search path.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Receives per-paragraph progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
            output_dir: PathBuf::from("result"),
            extract_tables: true,
            table_dir: None,
            password: None,
            pdfium_lib_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DigestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("output_dir", &self.output_dir)
            .field("extract_tables", &self.extract_tables)
            .field("table_dir", &self.table_dir)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn DigestProgressCallback>"),
            )
            .finish()
    }
}

impl DigestConfig {
    /// Create a new builder for `DigestConfig`.
    pub fn builder() -> DigestConfigBuilder {
        DigestConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`DigestConfig`].
#[derive(Debug)]
pub struct DigestConfigBuilder {
    config: DigestConfig,
}

impl DigestConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn extract_tables(mut self, v: bool) -> Self {
        self.config.extract_tables = v;
        self
    }

    pub fn table_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.table_dir = Some(dir.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DigestConfig, DigestError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(DigestError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(DigestError::InvalidConfig(
                "output_dir must not be empty".into(),
            ));
        }
        if matches!(c.model.as_deref(), Some(m) if m.trim().is_empty()) {
            return Err(DigestError::InvalidConfig(
                "model must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Input ────────────────────────────────────────────────────────────────

/// How the input string of a run is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// The input is a path to a PDF file. (default)
    #[default]
    Pdf,
    /// The input is the English text itself, processed as one paragraph.
    Text,
}

impl FromStr for InputMode {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(InputMode::Pdf),
            "text" => Ok(InputMode::Text),
            other => Err(DigestError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// The document handed to a run.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    /// A PDF file: text is extracted per page and split into paragraphs.
    Pdf { path: PathBuf },
    /// Raw text treated as a single paragraph.
    Text(String),
    /// A document that has already been segmented into paragraphs.
    Paragraphs(Vec<String>),
}

impl DocumentInput {
    /// Build an input from a mode and the user-supplied string.
    pub fn from_mode(mode: InputMode, value: impl Into<String>) -> Self {
        match mode {
            InputMode::Pdf => DocumentInput::Pdf {
                path: PathBuf::from(value.into()),
            },
            InputMode::Text => DocumentInput::Text(value.into()),
        }
    }

    /// Short human-readable name used in logs and error messages.
    pub fn display_name(&self) -> String {
        match self {
            DocumentInput::Pdf { path } => path.display().to_string(),
            DocumentInput::Text(_) => "<text input>".to_string(),
            DocumentInput::Paragraphs(_) => "<paragraph input>".to_string(),
        }
    }
}
