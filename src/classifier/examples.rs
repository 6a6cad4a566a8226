//! Labeled example table and the embedded example store.
//!
//! The store embeds every resolvable example once as a passage batch and is
//! cached by the classification service for the process lifetime. Changing
//! the table requires a restart.

use crate::classifier::embeddings::{EmbedMode, EmbeddingError, TextEmbedder};

/// A labeled example definition: identifier plus ground-truth label.
///
/// The identifier is the path its text is loaded from and doubles as the
/// leave-one-out exclusion key (compared by exact string equality).
#[derive(Debug, Clone)]
pub struct ExampleDef {
    pub identifier: &'static str,
    pub is_phishing: bool,
    pub category_label: &'static str,
}

/// Ground truth from manual analysis. Balanced: 4 phishing, 4 legitimate.
pub const LABELED_EXAMPLES: &[ExampleDef] = &[
    // Phishing - diverse scam types
    ExampleDef {
        identifier: "email/sample-1.eml",
        is_phishing: true,
        category_label: "Banking points scam",
    },
    ExampleDef {
        identifier: "email/sample-3.eml",
        is_phishing: true,
        category_label: "Advance fee fraud (419 scam)",
    },
    ExampleDef {
        identifier: "email/sample-10.eml",
        is_phishing: true,
        category_label: "Fake sign-in alert",
    },
    ExampleDef {
        identifier: "email/sample-15.eml",
        is_phishing: true,
        category_label: "Seed phrase theft",
    },
    // Legitimate - real service emails
    ExampleDef {
        identifier: "email/sample-4.eml",
        is_phishing: false,
        category_label: "Newsletter unsubscribe",
    },
    ExampleDef {
        identifier: "email/sample-njtransit.eml",
        is_phishing: false,
        category_label: "Transit service alert",
    },
    ExampleDef {
        identifier: "email/sample-deepgram.eml",
        is_phishing: false,
        category_label: "Product update",
    },
    ExampleDef {
        identifier: "email/sample-chess.eml",
        is_phishing: false,
        category_label: "Game notification",
    },
];

/// A labeled example whose text resolved and was embedded.
#[derive(Debug, Clone)]
pub struct LabeledExample {
    pub identifier: String,
    pub is_phishing: bool,
    pub category_label: String,
}

/// Embedded labeled examples, built once and read-only afterwards.
pub struct ExampleStore {
    examples: Vec<LabeledExample>,
    vectors: Vec<Vec<f32>>,
}

impl ExampleStore {
    /// Load every resolvable example and embed all texts in a single
    /// passage-mode batch call.
    ///
    /// Examples whose source is missing or empty are skipped with a warning.
    /// Texts are truncated to `max_embed_chars` characters before embedding
    /// to keep embedding cost bounded.
    pub fn load(
        defs: &[ExampleDef],
        resolve: &dyn Fn(&str) -> Option<String>,
        embedder: &dyn TextEmbedder,
        max_embed_chars: usize,
    ) -> Result<Self, EmbeddingError> {
        let mut examples = Vec::new();
        let mut texts = Vec::new();

        for def in defs {
            let Some(content) = resolve(def.identifier) else {
                log::warn!("Skipping example with unresolvable source: {}", def.identifier);
                continue;
            };
            if content.trim().is_empty() {
                log::warn!("Skipping example with empty source: {}", def.identifier);
                continue;
            }

            texts.push(truncate_chars(&content, max_embed_chars));
            examples.push(LabeledExample {
                identifier: def.identifier.to_string(),
                is_phishing: def.is_phishing,
                category_label: def.category_label.to_string(),
            });
        }

        let vectors = embedder.embed(&texts, EmbedMode::Passage)?;
        log::info!("Loaded {} labeled examples", examples.len());

        Ok(Self { examples, vectors })
    }

    /// Number of embedded examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Check if the store holds no examples.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Borrowed view of the examples and their vectors, optionally filtered
    /// for leave-one-out evaluation.
    ///
    /// The exclusion matches identifiers by exact string equality and never
    /// mutates the store. An exclusion that would empty the set falls back
    /// to the full set: classifying against zero examples is degenerate.
    pub fn view(
        &self,
        exclude_identifier: Option<&str>,
    ) -> (Vec<&LabeledExample>, Vec<&Vec<f32>>) {
        if let Some(exclude) = exclude_identifier {
            let mut examples = Vec::new();
            let mut vectors = Vec::new();
            for (example, vector) in self.examples.iter().zip(self.vectors.iter()) {
                if example.identifier != exclude {
                    examples.push(example);
                    vectors.push(vector);
                }
            }
            if !examples.is_empty() {
                return (examples, vectors);
            }
        }

        (self.examples.iter().collect(), self.vectors.iter().collect())
    }
}

/// Truncate to at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
