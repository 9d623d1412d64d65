//! Data types for documents, segments, and retrieved content.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key-value metadata attached to documents, segments, and results.
///
/// Keys are strings; values are arbitrary JSON scalars or collections.
pub type Metadata = serde_json::Map<String, Value>;

/// A source document: raw text plus a metadata map.
///
/// Documents are produced externally and are immutable once created;
/// indexing never mutates the original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: Metadata,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), metadata: Metadata::new() }
    }

    /// Create a document with the given metadata.
    pub fn with_metadata(text: impl Into<String>, metadata: Metadata) -> Self {
        Self { text: text.into(), metadata }
    }
}

/// A contiguous span of a [`Document`], either parent- or child-level.
///
/// After identity assignment a segment's metadata always carries the
/// store's identity property; a child segment's metadata additionally
/// carries the owning parent's id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// The text content of the segment.
    pub text: String,
    /// Key-value metadata, inherited from the source document plus
    /// segment-specific fields.
    pub metadata: Metadata,
}

impl Segment {
    /// Create a segment with no metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), metadata: Metadata::new() }
    }

    /// Create a segment with the given metadata.
    pub fn with_metadata(text: impl Into<String>, metadata: Metadata) -> Self {
        Self { text: text.into(), metadata }
    }
}

/// One item of retrieved content returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedContent {
    /// The content text (parent text, aggregated text, or a synthesized answer).
    pub text: String,
    /// The representative similarity score. `None` for synthesized answers,
    /// which have no single underlying match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Result metadata, surfaced per the configured aggregation mode.
    pub metadata: Metadata,
}
