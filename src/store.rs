//! Graph/vector store trait and configuration.
//!
//! The store is an external collaborator: a property graph with a vector
//! index over one node label. This module defines the capability surface
//! the engine consumes (parameterized writes, batch child upserts,
//! similarity search, parent-edge traversal) plus the sanitized
//! configuration shared by every backend. [`crate::inmemory::InMemoryGraphStore`] is the
//! bundled implementation; Cypher-capable backends compose their statements
//! from [`crate::cypher`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cypher::sanitize_identifier;
use crate::document::{Metadata, Segment};
use crate::error::{Result, RetrieverError};

/// Store-level schema configuration.
///
/// Label and property names are spliced into statement text by backends,
/// so every identifier-like field is validated against the identifier
/// grammar when the config is built. Construct via [`StoreConfig::builder`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Node label for child-level (embedded) nodes.
    pub label: String,
    /// Property holding each node's unique identity value.
    pub id_property: String,
    /// Property holding each node's text.
    pub text_property: String,
    /// Property holding each child node's embedding vector.
    pub embedding_property: String,
    /// Name of the vector index over `label`/`embedding_property`.
    pub index_name: String,
    /// Node label for parent-level nodes.
    pub parent_label: String,
    /// Property holding a parent node's identifier.
    pub parent_id_property: String,
    /// Typed relationship from parent to child, when the store links the
    /// two levels (`HAS_CHILD`, `HAS_QUESTION`, `HAS_SUMMARY`). `None` for
    /// single-level stores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    /// Embedding dimensionality; writes with any other vector length are
    /// rejected.
    pub dimension: usize,
}

impl StoreConfig {
    /// Create a new builder with default names.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for a validated [`StoreConfig`].
///
/// Defaults: label `Document`, id property `id`, text property `text`,
/// embedding property `embedding`, index name `vector`, parent label
/// `Parent`, parent id property `parentId`, no relationship.
#[derive(Debug, Clone)]
pub struct StoreConfigBuilder {
    label: String,
    id_property: String,
    text_property: String,
    embedding_property: String,
    index_name: String,
    parent_label: String,
    parent_id_property: String,
    relationship: Option<String>,
    dimension: Option<usize>,
}

impl Default for StoreConfigBuilder {
    fn default() -> Self {
        Self {
            label: "Document".to_string(),
            id_property: "id".to_string(),
            text_property: "text".to_string(),
            embedding_property: "embedding".to_string(),
            index_name: "vector".to_string(),
            parent_label: "Parent".to_string(),
            parent_id_property: "parentId".to_string(),
            relationship: None,
            dimension: None,
        }
    }
}

impl StoreConfigBuilder {
    /// Set the child node label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the identity property name.
    pub fn id_property(mut self, id_property: impl Into<String>) -> Self {
        self.id_property = id_property.into();
        self
    }

    /// Set the text property name.
    pub fn text_property(mut self, text_property: impl Into<String>) -> Self {
        self.text_property = text_property.into();
        self
    }

    /// Set the embedding property name.
    pub fn embedding_property(mut self, embedding_property: impl Into<String>) -> Self {
        self.embedding_property = embedding_property.into();
        self
    }

    /// Set the vector index name.
    pub fn index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Set the parent node label.
    pub fn parent_label(mut self, parent_label: impl Into<String>) -> Self {
        self.parent_label = parent_label.into();
        self
    }

    /// Set the parent identifier property name.
    pub fn parent_id_property(mut self, parent_id_property: impl Into<String>) -> Self {
        self.parent_id_property = parent_id_property.into();
        self
    }

    /// Set the parent-to-child relationship type.
    pub fn relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    /// Set the embedding dimensionality (required).
    pub fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// Build the [`StoreConfig`], sanitizing every identifier-like field.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::Config`] if `dimension` is missing or out
    /// of range, or [`RetrieverError::InvalidIdentifier`] if any name fails
    /// the identifier grammar.
    pub fn build(self) -> Result<StoreConfig> {
        let dimension = self
            .dimension
            .ok_or_else(|| RetrieverError::Config("dimension is required".to_string()))?;
        if dimension == 0 || dimension > 4096 {
            return Err(RetrieverError::Config(format!(
                "dimension must be between 1 and 4096, got {dimension}"
            )));
        }

        sanitize_identifier(&self.label, "label")?;
        sanitize_identifier(&self.id_property, "id_property")?;
        sanitize_identifier(&self.text_property, "text_property")?;
        sanitize_identifier(&self.embedding_property, "embedding_property")?;
        sanitize_identifier(&self.index_name, "index_name")?;
        sanitize_identifier(&self.parent_label, "parent_label")?;
        sanitize_identifier(&self.parent_id_property, "parent_id_property")?;
        if let Some(relationship) = &self.relationship {
            sanitize_identifier(relationship, "relationship")?;
        }

        Ok(StoreConfig {
            label: self.label,
            id_property: self.id_property,
            text_property: self.text_property,
            embedding_property: self.embedding_property,
            index_name: self.index_name,
            parent_label: self.parent_label,
            parent_id_property: self.parent_id_property,
            relationship: self.relationship,
            dimension,
        })
    }
}

/// A similarity search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// The query embedding.
    pub embedding: Vec<f32>,
    /// Maximum number of matches to return.
    pub max_results: usize,
    /// Minimum similarity score; matches below are dropped by the store.
    pub min_score: f64,
}

/// One child-level match returned by a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildMatch {
    /// The stored segment (text plus persisted metadata).
    pub segment: Segment,
    /// The similarity score, on the store's scale (cosine in `[-1, 1]`).
    pub score: f64,
}

/// A parent node resolved through a child's parent edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentRecord {
    /// The parent's identifier.
    pub parent_id: String,
    /// The parent's stored text.
    pub text: String,
    /// The parent node's full property map.
    pub properties: Metadata,
}

/// A vector-search-capable property graph store.
///
/// Implementations are expected to enforce the uniqueness constraint on
/// `(label, id_property)` and the configured embedding dimension. The engine
/// adds no retry or error wrapping around these calls; backend failures
/// propagate as [`RetrieverError::Store`] (or the more specific collision /
/// dimension variants).
#[async_trait]
pub trait GraphVectorStore: Send + Sync {
    /// The store's schema configuration.
    fn config(&self) -> &StoreConfig;

    /// Execute one parameterized write statement against the graph.
    ///
    /// Used for parent-node writes; `params` carries the scalar parameter
    /// map (e.g. `$metadata`).
    async fn run_write(&self, statement: &str, params: Metadata) -> Result<()>;

    /// Batch-write child embeddings and segments.
    ///
    /// Each segment's identity value is read from its metadata under the
    /// configured id property. `extra_params` carries write-scoped
    /// parameters, notably the owning parent's id under the configured
    /// parent id property; when a relationship type is configured, each
    /// written node is linked to that parent.
    ///
    /// Writing zero rows is a no-op, not an error. Returns the written ids.
    async fn add_all(
        &self,
        embeddings: &[Vec<f32>],
        segments: &[Segment],
        extra_params: &Metadata,
    ) -> Result<Vec<String>>;

    /// Similarity search over child embeddings.
    ///
    /// Matches are filtered to `score >= min_score`, truncated to
    /// `max_results`, and sorted by score descending; the caller performs
    /// no re-filtering.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ChildMatch>>;

    /// Resolve the owning parent of a child node over its single parent
    /// edge. Returns `None` when the child has no parent edge.
    async fn parent_of(&self, child_id: &str) -> Result<Option<ParentRecord>>;

    /// Delete every node this store manages. A whole-graph reset, intended
    /// for tests and re-indexing from scratch.
    async fn delete_all(&self) -> Result<()>;
}
