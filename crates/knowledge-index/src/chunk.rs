//! Text cleaning and overlapping chunking

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ChunkingConfig;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    // Word characters, whitespace, basic punctuation and currency symbols survive.
    static ref DISALLOWED_CHARS: Regex =
        Regex::new(r"[^\w\s\.,;:\-\(\)\[\]/%&\+=@#\$₹]").unwrap();
}

/// Raw text of one page of a reference source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number
    pub page_number: u32,
    pub raw_text: String,
}

impl PageText {
    pub fn new(page_number: u32, raw_text: impl Into<String>) -> Self {
        Self {
            page_number,
            raw_text: raw_text.into(),
        }
    }
}

/// A bounded, overlapping slice of cleaned page text
///
/// Offsets are character offsets into the cleaned text of `page_ref`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: u64,
    pub source_id: String,
    pub page_ref: u32,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Collapse whitespace and strip characters outside the allow-list
pub fn clean_text(raw: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw, " ");
    let stripped = DISALLOWED_CHARS.replace_all(&collapsed, "");
    stripped.trim().to_string()
}

/// Split one page of cleaned text into overlapping windows
///
/// Windows start every `chunk_size - overlap` characters and are clipped at
/// the end of the text. Splitting stops after the first window that reaches
/// the end, so a short tail is never emitted twice. Ids are assigned
/// sequentially from `first_id` to the chunks that are kept.
pub fn split_page(
    source_id: &str,
    page_ref: u32,
    text: &str,
    config: &ChunkingConfig,
    first_id: u64,
) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let step = config.step().max(1);

    let mut chunks = Vec::new();
    let mut next_id = first_id;
    let mut start = 0;

    while start < len {
        let end = (start + config.chunk_size).min(len);
        let window: String = chars[start..end].iter().collect();

        if window.trim().chars().count() > config.min_chunk_chars {
            chunks.push(Chunk {
                id: next_id,
                source_id: source_id.to_string(),
                page_ref,
                text: window,
                start_offset: start,
                end_offset: end,
            });
            next_id += 1;
        } else {
            tracing::debug!(
                source_id,
                page_ref,
                start,
                end,
                "discarding chunk below minimum length"
            );
        }

        if end == len {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn offsets(chunks: &[Chunk]) -> Vec<(usize, usize)> {
        chunks
            .iter()
            .map(|c| (c.start_offset, c.end_offset))
            .collect()
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Project\n\n cost\t\tsummary  "), "Project cost summary");
    }

    #[test]
    fn test_clean_text_keeps_allowed_punctuation_and_currency() {
        let cleaned = clean_text("Cost: ₹ 12,50,000 (approx.) @ 9% p.a. [Rs/$] & more + tax = total #1");
        assert_eq!(
            cleaned,
            "Cost: ₹ 12,50,000 (approx.) @ 9% p.a. [Rs/$] & more + tax = total #1"
        );
    }

    #[test]
    fn test_clean_text_strips_other_symbols() {
        assert_eq!(clean_text("a*b{c}~d|e"), "abcde");
        assert_eq!(clean_text("• bullet"), "bullet");
    }

    #[test]
    fn test_clean_text_empty_page() {
        assert_eq!(clean_text("   \n\t  "), "");
        assert_eq!(clean_text("***"), "");
    }

    #[test]
    fn test_split_2500_chars_with_1000_200() {
        let text = "abcdefghij".repeat(250);
        let config = ChunkingConfig::new(1000, 200).unwrap();

        let chunks = split_page("guide", 1, &text, &config, 0);

        assert_eq!(offsets(&chunks), vec![(0, 1000), (800, 1800), (1600, 2500)]);
        assert_eq!(chunks[2].text.chars().count(), 900);
        assert_eq!(
            chunks.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_split_short_page_single_chunk() {
        let text = "x".repeat(120);
        let chunks = split_page("guide", 3, &text, &ChunkingConfig::default(), 7);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, 7);
        assert_eq!(chunks[0].page_ref, 3);
        assert_eq!(offsets(&chunks), vec![(0, 120)]);
    }

    #[test]
    fn test_split_discards_chunks_below_minimum() {
        let text = "y".repeat(50);
        let chunks = split_page("guide", 1, &text, &ChunkingConfig::default(), 0);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_split_empty_text() {
        let chunks = split_page("guide", 1, "", &ChunkingConfig::default(), 0);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let text = "₹".repeat(150);
        let config = ChunkingConfig::new(100, 20).unwrap();
        let chunks = split_page("guide", 1, &text, &config, 0);

        assert_eq!(offsets(&chunks), vec![(0, 100), (80, 150)]);
        assert_eq!(chunks[0].text.chars().count(), 100);
    }
}
