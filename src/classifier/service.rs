//! Classification facade.
//!
//! Coordinates chunking, query embedding, per-chunk voting and verdict
//! aggregation. The embedding model and the embedded example set are
//! created on first classification behind a one-time initialization guard
//! and reused for the process lifetime.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::classifier::chunk::chunk_text;
use crate::classifier::embeddings::{
    EmbedMode, EmbeddingError, EmbeddingProvider, TextEmbedder,
};
use crate::classifier::examples::{ExampleDef, ExampleStore, LABELED_EXAMPLES};
use crate::classifier::knn::{vote, Neighbor};
use crate::config::ClassifierConfig;
use crate::email;

/// Errors that can occur during classification.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Verdict for a single chunk, with its position and a short preview.
#[derive(Debug, Clone)]
pub struct ChunkVerdict {
    pub chunk_index: usize,
    pub preview: String,
    pub is_phishing: bool,
    pub confidence: f32,
    pub neighbors: Vec<Neighbor>,
}

/// Final verdict for one email.
#[derive(Debug, Clone)]
pub struct EmailVerdict {
    pub is_phishing: bool,
    /// Confidence of the decisive chunk
    pub confidence: f32,
    /// Neighbors of the decisive chunk
    pub neighbors: Vec<Neighbor>,
    pub num_chunks: usize,
    pub phishing_chunk_count: usize,
    /// Per-chunk diagnostic detail, in chunk order
    pub chunk_results: Vec<ChunkVerdict>,
}

/// Lazy-loaded classifier components.
struct ClassifierState {
    embedder: Box<dyn TextEmbedder>,
    store: ExampleStore,
}

/// Few-shot phishing classifier over the labeled example set.
///
/// Cheap to construct; the first call to `classify` loads the embedding
/// model and embeds the example passages. Thread-safe through interior
/// mutability: two simultaneous first-callers cannot double-load.
pub struct PhishClassifier {
    config: ClassifierConfig,
    base_path: PathBuf,
    defs: Vec<ExampleDef>,
    /// Lazily-initialized state. Uses Mutex<Option<_>> instead of OnceLock
    /// because get_or_try_init is unstable.
    state: Mutex<Option<ClassifierState>>,
}

impl PhishClassifier {
    /// Create a classifier over the built-in labeled example table.
    ///
    /// # Arguments
    /// * `config` - Classifier configuration
    /// * `base_path` - Base directory for data files (models/)
    pub fn new(config: ClassifierConfig, base_path: PathBuf) -> Self {
        Self {
            config,
            base_path,
            defs: LABELED_EXAMPLES.to_vec(),
            state: Mutex::new(None),
        }
    }

    /// Create a classifier with an injected embedder and example table.
    ///
    /// The embedder is used immediately to embed the example passages, so
    /// the classifier starts initialized. Intended for tests and embedded
    /// use; `new` is the production path.
    pub fn with_embedder(
        config: ClassifierConfig,
        defs: Vec<ExampleDef>,
        resolve: &dyn Fn(&str) -> Option<String>,
        embedder: Box<dyn TextEmbedder>,
    ) -> Result<Self, ClassifierError> {
        let store = ExampleStore::load(&defs, resolve, embedder.as_ref(), config.max_embed_chars)?;
        Ok(Self {
            config,
            base_path: PathBuf::new(),
            defs,
            state: Mutex::new(Some(ClassifierState { embedder, store })),
        })
    }

    /// The labeled example definitions this classifier votes against.
    pub fn defs(&self) -> &[ExampleDef] {
        &self.defs
    }

    /// Identifier to exclude when classifying `path`, if the path is one of
    /// the labeled examples.
    ///
    /// Excluding a labeled example from its own candidate set prevents a
    /// trivial perfect self-match from masking generalization accuracy.
    pub fn exclusion_for(&self, path: &str) -> Option<String> {
        self.defs
            .iter()
            .find(|def| def.identifier == path)
            .map(|def| def.identifier.to_string())
    }

    /// Number of labeled examples currently embedded (0 before first use).
    pub fn example_count(&self) -> usize {
        self.state
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.store.len()))
            .unwrap_or(0)
    }

    /// Classify email text, optionally excluding one labeled example from
    /// the candidate set (leave-one-out).
    ///
    /// The text is chunked, each chunk is embedded in query mode and voted
    /// against the same example view, and the per-chunk verdicts are
    /// combined with the any-chunk-positive rule.
    pub fn classify(
        &self,
        text: &str,
        exclude_identifier: Option<&str>,
    ) -> Result<EmailVerdict, ClassifierError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| ClassifierError::Internal(format!("Lock poisoned: {}", e)))?;

        if guard.is_none() {
            *guard = Some(self.do_init()?);
        }

        let state = guard
            .as_ref()
            .ok_or_else(|| ClassifierError::Internal("state missing after init".to_string()))?;

        let (examples, vectors) = state.store.view(exclude_identifier);

        let chunks = chunk_text(text, self.config.chunk_size, self.config.chunk_overlap);
        let mut chunk_results = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            let embedded = state
                .embedder
                .embed(std::slice::from_ref(&chunk.text), EmbedMode::Query)?;
            let query = embedded.into_iter().next().ok_or_else(|| {
                ClassifierError::Internal("embedder returned no vector".to_string())
            })?;

            let result = vote(&query, &examples, &vectors, self.config.neighbors);
            chunk_results.push(ChunkVerdict {
                chunk_index: chunk.index,
                preview: chunk.preview(),
                is_phishing: result.is_phishing,
                confidence: result.confidence,
                neighbors: result.neighbors,
            });
        }

        Ok(aggregate(chunk_results))
    }

    /// Perform actual initialization: load the model, then resolve and
    /// embed the labeled examples in one passage batch.
    fn do_init(&self) -> Result<ClassifierState, ClassifierError> {
        log::info!("Loading embedding model '{}'", self.config.model);

        let timeout = Duration::from_secs(self.config.download_timeout_secs);
        let embedder = EmbeddingProvider::new(
            &self.config.model,
            &self.config.task_instruction,
            self.base_path.clone(),
            Some(timeout),
        )?;

        let resolve = |identifier: &str| {
            email::read_email(Path::new(identifier))
                .ok()
                .map(|content| content.embedding_text())
        };
        let store =
            ExampleStore::load(&self.defs, &resolve, &embedder, self.config.max_embed_chars)?;

        if store.is_empty() {
            log::warn!("No labeled examples resolved; verdicts will default to legitimate");
        }

        Ok(ClassifierState {
            embedder: Box::new(embedder),
            store,
        })
    }
}

/// Combine per-chunk verdicts with the any-chunk-positive rule.
///
/// One phishing chunk makes the whole email phishing: a single injected
/// malicious paragraph must not be diluted by surrounding benign content.
/// The reported neighbors and confidence come from the decisive chunk -
/// the highest-confidence phishing chunk when any chunk is phishing,
/// otherwise the single highest-confidence chunk overall.
fn aggregate(chunk_results: Vec<ChunkVerdict>) -> EmailVerdict {
    let phishing_chunk_count = chunk_results.iter().filter(|r| r.is_phishing).count();
    let any_phishing = phishing_chunk_count > 0;

    let mut decisive: Option<&ChunkVerdict> = None;
    for result in chunk_results
        .iter()
        .filter(|r| !any_phishing || r.is_phishing)
    {
        match decisive {
            Some(best) if result.confidence <= best.confidence => {}
            _ => decisive = Some(result),
        }
    }

    let (confidence, neighbors) = match decisive {
        Some(chunk) => (chunk.confidence, chunk.neighbors.clone()),
        None => (0.0, Vec::new()),
    };

    EmailVerdict {
        is_phishing: any_phishing,
        confidence,
        neighbors,
        num_chunks: chunk_results.len(),
        phishing_chunk_count,
        chunk_results,
    }
}
