//! Embedding model wrapper for fastembed.
//!
//! Provides a high-level interface for generating embeddings:
//! - Lazy model download with configurable cache directory
//! - Query/passage input formatting for instruction-tuned models
//! - Batch embedding generation with L2 normalization

use fastembed::{InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// Default download timeout for model files (5 minutes)
const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// How a text is formatted before embedding.
///
/// The model is instruction-tuned: texts being searched for (queries) and
/// texts being searched over (passages) carry distinct fixed prefixes.
/// Vectors from the two modes are only comparable when both conventions
/// are applied consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    Query,
    Passage,
}

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Invalid model name: {0}")]
    InvalidModel(String),
}

/// Seam for embedding generation so tests can substitute a deterministic
/// embedder without downloading a model.
pub trait TextEmbedder: Send {
    /// Embed a batch of texts. One unit-normalized vector per input,
    /// order preserving.
    fn embed(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Wrapper around fastembed's TextEmbedding model.
/// Uses a Mutex because fastembed's embed() requires &mut self.
pub struct EmbeddingProvider {
    model: Mutex<TextEmbedding>,
    model_name: String,
    task_instruction: String,
}

impl EmbeddingProvider {
    /// Create a new embedding provider with the given model name.
    ///
    /// The model will be downloaded on first use if not cached.
    /// Models are cached in the `models/` subdirectory of `cache_dir`.
    ///
    /// # Arguments
    /// * `model_name` - Name of the model (e.g., "multilingual-e5-large")
    /// * `task_instruction` - Instruction prepended to every query-mode text
    /// * `cache_dir` - Directory to cache downloaded models
    /// * `download_timeout` - Optional timeout for model download
    pub fn new(
        model_name: &str,
        task_instruction: &str,
        cache_dir: PathBuf,
        download_timeout: Option<Duration>,
    ) -> Result<Self, EmbeddingError> {
        let model_enum = Self::parse_model_name(model_name)?;
        let _timeout = download_timeout.unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT);

        // Ensure cache directory exists
        let models_dir = cache_dir.join("models");
        std::fs::create_dir_all(&models_dir).map_err(|e| {
            EmbeddingError::InitFailed(format!("Failed to create models directory: {}", e))
        })?;

        let options = InitOptions::new(model_enum)
            .with_cache_dir(models_dir)
            .with_show_download_progress(true);

        let model = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self {
            model: Mutex::new(model),
            model_name: model_name.to_string(),
            task_instruction: task_instruction.to_string(),
        })
    }

    /// Get the model name
    pub fn name(&self) -> &str {
        &self.model_name
    }

    /// Apply the mode-specific prefix expected by the model.
    fn format(&self, text: &str, mode: EmbedMode) -> String {
        match mode {
            EmbedMode::Query => {
                format!("Instruct: {}\nQuery: {}", self.task_instruction, text)
            }
            EmbedMode::Passage => format!("passage: {}", text),
        }
    }

    /// Parse model name string to fastembed enum.
    fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel, EmbeddingError> {
        match name.to_lowercase().as_str() {
            "multilingual-e5-small" | "multilinguale5small" => {
                Ok(fastembed::EmbeddingModel::MultilingualE5Small)
            }
            "multilingual-e5-base" | "multilinguale5base" => {
                Ok(fastembed::EmbeddingModel::MultilingualE5Base)
            }
            "multilingual-e5-large" | "multilinguale5large" => {
                Ok(fastembed::EmbeddingModel::MultilingualE5Large)
            }
            "all-minilm-l6-v2" | "allminiml6v2" => {
                Ok(fastembed::EmbeddingModel::AllMiniLML6V2)
            }
            _ => Err(EmbeddingError::InvalidModel(format!(
                "Unknown model: {}. Supported models: multilingual-e5-small, multilingual-e5-base, multilingual-e5-large, all-MiniLM-L6-v2",
                name
            ))),
        }
    }
}

impl TextEmbedder for EmbeddingProvider {
    fn embed(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let formatted: Vec<String> = texts.iter().map(|t| self.format(t, mode)).collect();

        let mut model = self.model.lock().map_err(|e| {
            EmbeddingError::EmbeddingFailed(format!("Failed to acquire model lock: {}", e))
        })?;

        let embeddings = model
            .embed(formatted, None)
            .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

        // The similarity voter treats dot product as cosine similarity,
        // which requires unit norm.
        Ok(embeddings.into_iter().map(normalize).collect())
    }
}

/// L2-normalize a vector. Zero-norm vectors are returned unchanged.
pub(crate) fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}
