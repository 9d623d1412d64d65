//! Document splitting strategies.
//!
//! This module provides the [`Splitter`] trait and three implementations:
//!
//! - [`ParagraphSplitter`] — splits on blank lines
//! - [`SentenceSplitter`] — splits on sentence boundaries
//! - [`CharacterSplitter`] — splits by character count with configurable overlap
//!
//! The hierarchical indexer takes two splitters: a coarse one for parent
//! segments and an optional fine one for child segments.

use serde_json::Value;

use crate::document::{Document, Segment};

/// A strategy for splitting documents into ordered segments.
///
/// Returned segments carry text and metadata but no identity yet;
/// identity is assigned later by the indexer.
pub trait Splitter: Send + Sync {
    /// Split a document into an ordered sequence of segments.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn split(&self, document: &Document) -> Vec<Segment>;
}

fn segment_from(document: &Document, text: &str, index: usize) -> Segment {
    let mut metadata = document.metadata.clone();
    metadata.insert("chunk_index".to_string(), Value::from(index));
    Segment::with_metadata(text, metadata)
}

/// Splits text into paragraphs on blank-line boundaries.
///
/// Each segment inherits the parent document's metadata plus a
/// `chunk_index` field. Empty paragraphs are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphSplitter;

impl Splitter for ParagraphSplitter {
    fn split(&self, document: &Document) -> Vec<Segment> {
        document
            .text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .enumerate()
            .map(|(i, p)| segment_from(document, p, i))
            .collect()
    }
}

/// Splits text into sentences on `.`, `!`, and `?` boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSplitter;

impl Splitter for SentenceSplitter {
    fn split(&self, document: &Document) -> Vec<Segment> {
        let mut sentences = Vec::new();
        let mut current = String::new();

        for ch in document.text.chars() {
            current.push(ch);
            if matches!(ch, '.' | '!' | '?') {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }

        sentences
            .into_iter()
            .enumerate()
            .map(|(i, s)| segment_from(document, &s, i))
            .collect()
    }
}

/// Splits text into fixed-size segments by character count with overlap.
///
/// Boundaries respect UTF-8 character boundaries.
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    max_chars: usize,
    overlap: usize,
}

impl CharacterSplitter {
    /// Create a new `CharacterSplitter`.
    ///
    /// # Arguments
    ///
    /// * `max_chars` — maximum number of characters per segment
    /// * `overlap` — number of overlapping characters between consecutive segments
    pub fn new(max_chars: usize, overlap: usize) -> Self {
        Self { max_chars, overlap }
    }
}

impl Splitter for CharacterSplitter {
    fn split(&self, document: &Document) -> Vec<Segment> {
        if document.text.is_empty() || self.max_chars == 0 {
            return Vec::new();
        }

        let chars: Vec<char> = document.text.chars().collect();
        let step = self.max_chars.saturating_sub(self.overlap).max(1);

        let mut segments = Vec::new();
        let mut start = 0;
        let mut index = 0;
        while start < chars.len() {
            let end = (start + self.max_chars).min(chars.len());
            let text: String = chars[start..end].iter().collect();
            segments.push(segment_from(document, &text, index));
            index += 1;
            if end == chars.len() {
                break;
            }
            start += step;
        }

        segments
    }
}
