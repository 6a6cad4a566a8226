//! Similarity-weighted k-nearest-neighbor voting.

use serde::Serialize;

use crate::classifier::examples::LabeledExample;

/// One of the k most similar labeled examples for a query.
#[derive(Debug, Clone, Serialize)]
pub struct Neighbor {
    pub identifier: String,
    pub category_label: String,
    pub similarity: f32,
    pub is_phishing: bool,
}

/// Outcome of voting one query vector against the candidate examples.
#[derive(Debug, Clone)]
pub struct VoteResult {
    pub is_phishing: bool,
    pub confidence: f32,
    /// Selected neighbors, most similar first
    pub neighbors: Vec<Neighbor>,
}

impl VoteResult {
    fn empty() -> Self {
        Self {
            is_phishing: false,
            confidence: 0.0,
            neighbors: Vec::new(),
        }
    }
}

/// Classify one query vector against the candidate examples.
///
/// Cosine similarity is the plain dot product since all vectors are
/// unit-normalized. The k most similar examples vote with their similarity
/// as weight rather than a plain majority count; equal similarities keep
/// their original order (stable sort). A tied score reads as legitimate.
///
/// With fewer than k candidates, all candidates vote. An empty candidate
/// set yields a legitimate verdict with zero confidence.
pub fn vote(
    query: &[f32],
    examples: &[&LabeledExample],
    vectors: &[&Vec<f32>],
    k: usize,
) -> VoteResult {
    if examples.is_empty() {
        return VoteResult::empty();
    }

    let mut scored: Vec<(usize, f32)> = vectors
        .iter()
        .map(|v| dot(query, v))
        .enumerate()
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);

    let mut phishing_score = 0.0f32;
    let mut legit_score = 0.0f32;
    let mut neighbors = Vec::with_capacity(scored.len());

    for (idx, similarity) in scored {
        let example = examples[idx];
        neighbors.push(Neighbor {
            identifier: example.identifier.clone(),
            category_label: example.category_label.clone(),
            similarity,
            is_phishing: example.is_phishing,
        });

        if example.is_phishing {
            phishing_score += similarity;
        } else {
            legit_score += similarity;
        }
    }

    let total = phishing_score + legit_score;
    let confidence = if total > 0.0 {
        phishing_score.max(legit_score) / total
    } else {
        0.0
    };

    VoteResult {
        is_phishing: phishing_score > legit_score,
        confidence,
        neighbors,
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
