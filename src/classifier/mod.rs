//! Few-shot phishing classification over a semantic embedding space.
//!
//! Classifies email text by comparing it against a small curated set of
//! labeled examples using embedding similarity.
//!
//! # Architecture
//!
//! - `embeddings`: Wraps fastembed with query/passage input formatting
//! - `examples`: Labeled example table and the embedded example store
//! - `chunk`: Overlapping character-window chunking for long bodies
//! - `knn`: Similarity-weighted k-nearest-neighbor voting
//! - `service`: Classification facade with lazy one-time initialization

pub mod embeddings;
mod chunk;
mod examples;
mod knn;
mod service;

pub use chunk::{chunk_text, Chunk};
pub use embeddings::{EmbedMode, EmbeddingProvider, TextEmbedder};
pub use examples::{ExampleDef, ExampleStore, LabeledExample, LABELED_EXAMPLES};
pub use knn::{vote, Neighbor, VoteResult};
pub use service::{ChunkVerdict, ClassifierError, EmailVerdict, PhishClassifier};

/// Default embedding model name (E5 family, instruction-tuned for
/// query/passage retrieval)
pub const DEFAULT_MODEL: &str = "multilingual-e5-large";

/// Default chunk size in characters (approx 256 tokens)
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default chunk overlap in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Default number of nearest neighbors used for voting
pub const DEFAULT_NEIGHBORS: usize = 3;
