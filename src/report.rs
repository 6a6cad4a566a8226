//! Scan result records and output rendering.

use serde::Serialize;
use std::path::Path;

use crate::classifier::{EmailVerdict, Neighbor};

/// Default path for the JSON results file
pub const DEFAULT_RESULTS_FILE: &str = "phishscan-results.json";

/// One classified email, in the shape persisted to the results file.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRecord {
    pub file: String,
    pub url_mismatch: bool,
    pub is_phishing: bool,
    pub confidence: f32,
    pub neighbors: Vec<Neighbor>,
    pub num_chunks: usize,
    pub phishing_chunks: usize,
    pub was_excluded: bool,
}

impl ScanRecord {
    pub fn new(file: &str, url_mismatch: bool, verdict: &EmailVerdict, was_excluded: bool) -> Self {
        Self {
            file: file.to_string(),
            url_mismatch,
            is_phishing: verdict.is_phishing,
            confidence: verdict.confidence,
            neighbors: verdict.neighbors.clone(),
            num_chunks: verdict.num_chunks,
            phishing_chunks: verdict.phishing_chunk_count,
            was_excluded,
        }
    }

    /// Terse one-line rendering: status, file name, nearest category.
    pub fn summary_line(&self) -> String {
        let status = if self.is_phishing { "PHISH" } else { "LEGIT" };
        let nearest = self
            .neighbors
            .first()
            .map(|n| n.category_label.as_str())
            .unwrap_or("?");
        let name = Path::new(&self.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.file);
        format!("{} | {} | {}", status, name, nearest)
    }
}

/// Write all records to a JSON results file.
pub fn save_results(path: &Path, records: &[ScanRecord]) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)
}
