//! Overlapping character-window chunking for long email bodies.
//!
//! Keeps each embedding call within the model's effective context. Windows
//! are pure character-offset slices; no attempt is made to avoid splitting
//! inside words or sentences.

/// Preview length for chunk diagnostics
const PREVIEW_CHARS: usize = 100;

/// A window of the input text.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Position of this chunk in the input (0-based)
    pub index: usize,
    /// The window text, at most `size` characters
    pub text: String,
}

impl Chunk {
    /// First 100 characters of the chunk, with an ellipsis when truncated.
    pub fn preview(&self) -> String {
        if self.text.chars().count() <= PREVIEW_CHARS {
            return self.text.clone();
        }
        let head: String = self.text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

/// Split text into overlapping chunks of `size` characters.
///
/// Text no longer than `size` yields a single chunk containing the whole
/// input. Otherwise windows advance by `size - overlap` characters from
/// offset 0; the loop stops as soon as the next start position is within
/// `overlap` of the end, discarding a trailing slice that would mostly
/// repeat the previous window.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
    assert!(overlap < size, "chunk overlap must be smaller than chunk size");

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= size {
        return vec![Chunk {
            index: 0,
            text: text.to_string(),
        }];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        chunks.push(Chunk {
            index: chunks.len(),
            text: chars[start..end].iter().collect(),
        });
        start += size - overlap;
        if start + overlap >= chars.len() {
            break;
        }
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("hello world", 1000, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "hello world");
    }

    #[test]
    fn test_empty_text_single_chunk() {
        let chunks = chunk_text("", 1000, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "");
    }

    #[test]
    fn test_text_exactly_chunk_size() {
        let text = "x".repeat(1000);
        let chunks = chunk_text(&text, 1000, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text.len(), 1000);
    }

    #[test]
    fn test_window_advance_offsets() {
        // size=1000, overlap=200, len=2500 -> starts at 0, 800, 1600
        let text: String = (0..2500).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        let chunks = chunk_text(&text, 1000, 200);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, text[0..1000]);
        assert_eq!(chunks[1].text, text[800..1800]);
        assert_eq!(chunks[2].text, text[1600..2500]);
        assert_eq!(chunks[2].index, 2);
    }

    #[test]
    fn test_no_character_loss() {
        let text: String = (0..3777).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        let chunks = chunk_text(&text, 1000, 200);

        // Every input position must be covered by at least one window.
        let mut covered = vec![false; text.len()];
        let mut start = 0;
        for chunk in &chunks {
            for i in start..start + chunk.text.chars().count() {
                covered[i] = true;
            }
            start += 800;
        }
        assert!(covered.iter().all(|&c| c), "chunking dropped characters");
    }

    #[test]
    fn test_multibyte_text_chunked_by_chars() {
        let text = "日".repeat(25);
        let chunks = chunk_text(&text, 10, 2);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 10);
        }
        assert_eq!(chunks[1].text.chars().next(), Some('日'));
    }

    #[test]
    fn test_preview_short_chunk() {
        let chunk = Chunk {
            index: 0,
            text: "short".to_string(),
        };
        assert_eq!(chunk.preview(), "short");
    }

    #[test]
    fn test_preview_truncates_long_chunk() {
        let chunk = Chunk {
            index: 0,
            text: "y".repeat(250),
        };
        let preview = chunk.preview();
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
    }
}
