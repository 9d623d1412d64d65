//! In-memory graph/vector store using cosine similarity.
//!
//! [`InMemoryGraphStore`] is a complete, zero-infrastructure implementation
//! of [`GraphVectorStore`] backed by `HashMap`s behind a
//! `tokio::sync::RwLock`. It enforces the same contract a real graph
//! backend would: identity uniqueness, embedding dimension checks, typed
//! parent edges, and score-descending pre-filtered search. Suitable for
//! development, testing, and small corpora.
//!
//! Parent writes arrive as parameterized statements. This store does not
//! interpret Cypher text; it honours the contract of the statements
//! produced by [`crate::cypher::parent_write_statement`]: the `$metadata`
//! parameter becomes the parent node's property map, keyed by the
//! configured parent id property.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::{Metadata, Segment};
use crate::error::{Result, RetrieverError};
use crate::store::{ChildMatch, GraphVectorStore, ParentRecord, SearchRequest, StoreConfig};

#[derive(Debug, Clone)]
struct StoredChild {
    segment: Segment,
    embedding: Vec<f32>,
    parent_id: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    parents: HashMap<String, ParentRecord>,
    children: HashMap<String, StoredChild>,
}

/// An in-memory [`GraphVectorStore`] using cosine similarity for search.
///
/// # Example
///
/// ```rust,ignore
/// use ragtree::{InMemoryGraphStore, StoreConfig};
///
/// let config = StoreConfig::builder()
///     .label("Child")
///     .relationship("HAS_CHILD")
///     .dimension(384)
///     .build()?;
/// let store = InMemoryGraphStore::new(config);
/// ```
#[derive(Debug)]
pub struct InMemoryGraphStore {
    config: StoreConfig,
    inner: RwLock<Inner>,
}

impl InMemoryGraphStore {
    /// Create an empty store with the given configuration.
    pub fn new(config: StoreConfig) -> Self {
        Self { config, inner: RwLock::new(Inner::default()) }
    }

    /// Number of parent nodes currently stored.
    pub async fn parent_count(&self) -> usize {
        self.inner.read().await.parents.len()
    }

    /// Number of child nodes currently stored.
    pub async fn child_count(&self) -> usize {
        self.inner.read().await.children.len()
    }

    fn store_err(message: impl Into<String>) -> RetrieverError {
        RetrieverError::Store { backend: "in-memory".to_string(), message: message.into() }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl GraphVectorStore for InMemoryGraphStore {
    fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn run_write(&self, statement: &str, params: Metadata) -> Result<()> {
        let metadata = params
            .get("metadata")
            .and_then(Value::as_object)
            .ok_or_else(|| Self::store_err("parent write requires a `metadata` map parameter"))?;

        let parent_id = metadata
            .get(&self.config.parent_id_property)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Self::store_err(format!(
                    "parent metadata is missing `{}`",
                    self.config.parent_id_property
                ))
            })?
            .to_string();

        let text = metadata
            .get(&self.config.text_property)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        debug!(statement, parent_id = %parent_id, "parent write");

        let mut inner = self.inner.write().await;
        inner.parents.insert(
            parent_id.clone(),
            ParentRecord { parent_id, text, properties: metadata.clone() },
        );
        Ok(())
    }

    async fn add_all(
        &self,
        embeddings: &[Vec<f32>],
        segments: &[Segment],
        extra_params: &Metadata,
    ) -> Result<Vec<String>> {
        if embeddings.is_empty() || segments.is_empty() {
            info!("skipping add of empty embedding batch");
            return Ok(Vec::new());
        }
        if embeddings.len() != segments.len() {
            return Err(Self::store_err(format!(
                "embeddings size {} is not equal to segments size {}",
                embeddings.len(),
                segments.len()
            )));
        }
        for embedding in embeddings {
            if embedding.len() != self.config.dimension {
                return Err(RetrieverError::DimensionMismatch {
                    expected: self.config.dimension,
                    actual: embedding.len(),
                });
            }
        }

        let parent_id = extra_params
            .get(&self.config.parent_id_property)
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut inner = self.inner.write().await;

        // A linked batch whose parent was never written matches nothing.
        let linked_parent = match (&self.config.relationship, &parent_id) {
            (Some(_), Some(pid)) => {
                if !inner.parents.contains_key(pid) {
                    debug!(parent_id = %pid, "no parent node matched; skipping batch");
                    return Ok(Vec::new());
                }
                Some(pid.clone())
            }
            _ => None,
        };

        let mut ids = Vec::with_capacity(segments.len());
        let mut batch: Vec<(String, StoredChild)> = Vec::with_capacity(segments.len());
        for (segment, embedding) in segments.iter().zip(embeddings) {
            let id = match segment.metadata.get(&self.config.id_property) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => Uuid::new_v4().to_string(),
            };
            if inner.children.contains_key(&id) || batch.iter().any(|(existing, _)| existing == &id)
            {
                return Err(RetrieverError::IdentityCollision {
                    property: self.config.id_property.clone(),
                    value: id,
                });
            }
            batch.push((
                id.clone(),
                StoredChild {
                    segment: segment.clone(),
                    embedding: embedding.clone(),
                    parent_id: linked_parent.clone(),
                },
            ));
            ids.push(id);
        }

        let count = batch.len();
        for (id, child) in batch {
            inner.children.insert(id, child);
        }
        info!(count, "added embedding batch");
        Ok(ids)
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<ChildMatch>> {
        if request.embedding.len() != self.config.dimension {
            return Err(RetrieverError::DimensionMismatch {
                expected: self.config.dimension,
                actual: request.embedding.len(),
            });
        }

        let inner = self.inner.read().await;
        let mut matches: Vec<ChildMatch> = inner
            .children
            .values()
            .map(|child| ChildMatch {
                segment: child.segment.clone(),
                score: cosine_similarity(&child.embedding, &request.embedding),
            })
            .filter(|m| m.score >= request.min_score)
            .collect();

        // Descending by score; ties fall back to the identity value.
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let key = |m: &ChildMatch| {
                        m.segment
                            .metadata
                            .get(&self.config.id_property)
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string()
                    };
                    key(a).cmp(&key(b))
                })
        });
        matches.truncate(request.max_results);

        debug!(result_count = matches.len(), "similarity search");
        Ok(matches)
    }

    async fn parent_of(&self, child_id: &str) -> Result<Option<ParentRecord>> {
        let inner = self.inner.read().await;
        let parent = inner
            .children
            .get(child_id)
            .and_then(|child| child.parent_id.as_deref())
            .and_then(|pid| inner.parents.get(pid))
            .cloned();
        Ok(parent)
    }

    async fn delete_all(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.parents.clear();
        inner.children.clear();
        Ok(())
    }
}
