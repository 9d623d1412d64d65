//! Hierarchical parent/child document indexing.
//!
//! [`HierarchicalIndexer`] turns one document into a persisted parent/child
//! tree: split into parent segments, optionally rewrite each parent's text
//! through a chat model, persist the parent node, then split, embed, and
//! persist the child level with a typed edge back to the parent.
//!
//! Parents are processed strictly in split order because parent identifiers
//! (`parent_0`, `parent_1`, ...) are sequence-dependent and each parent's
//! write must complete before its children reference it. Child embeddings
//! within one parent are produced in a single batch call.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::chat::{ChatMessage, ChatModel, PromptTemplate};
use crate::document::{Document, Metadata};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::identity::assign_identity;
use crate::splitter::Splitter;
use crate::store::GraphVectorStore;

/// A configured parent-write step: one parameterized statement executed per
/// parent segment, plus caller-supplied static parameters merged into each
/// parent's metadata map.
#[derive(Debug, Clone)]
pub struct ParentWrite {
    /// The statement to execute, e.g. `CREATE (:Parent $metadata)`.
    pub statement: String,
    /// Static parameters merged into every parent's metadata map.
    pub params: Metadata,
}

impl ParentWrite {
    /// Create a parent-write step with no static parameters.
    pub fn new(statement: impl Into<String>) -> Self {
        Self { statement: statement.into(), params: Metadata::new() }
    }
}

/// A parent-text transform: a chat model invoked per parent segment with a
/// system/user prompt pair. The user prompt binds the parent's raw text to
/// its `{{input}}` placeholder.
///
/// Both prompts are required together; the retriever builder rejects a
/// half-configured pair before anything is persisted.
pub struct TextTransform {
    model: Arc<dyn ChatModel>,
    system_prompt: String,
    user_prompt: String,
}

impl TextTransform {
    /// Create a transform from a model and a complete prompt pair.
    pub fn new(
        model: Arc<dyn ChatModel>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self { model, system_prompt: system_prompt.into(), user_prompt: user_prompt.into() }
    }

    async fn apply(&self, input: &str) -> Result<String> {
        let user = PromptTemplate::new(self.user_prompt.as_str()).apply(&[("input", input)]);
        self.model
            .chat(&[ChatMessage::system(self.system_prompt.as_str()), ChatMessage::user(user)])
            .await
    }
}

/// Indexes documents into a parent/child tree in a graph/vector store.
pub struct HierarchicalIndexer {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn GraphVectorStore>,
    parent_write: Option<ParentWrite>,
    transform: Option<TextTransform>,
}

impl HierarchicalIndexer {
    /// Create an indexer with no parent-write step and no transform:
    /// parents are not persisted as separate nodes and children embed the
    /// raw text.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn GraphVectorStore>) -> Self {
        Self { embedder, store, parent_write: None, transform: None }
    }

    /// Configure the parent-write step.
    pub fn with_parent_write(mut self, parent_write: ParentWrite) -> Self {
        self.parent_write = Some(parent_write);
        self
    }

    /// Configure the parent-text transform.
    pub fn with_transform(mut self, transform: TextTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Index one document.
    ///
    /// Splits the document with `parent_splitter`; for each parent segment
    /// in order, assigns identity, optionally persists a parent node
    /// (rewriting its text through the transform model when configured),
    /// then embeds and persists the child level. Without a `child_splitter`
    /// the parent segment itself is embedded as the single child-level
    /// entry.
    ///
    /// Returns the number of parent segments indexed.
    ///
    /// # Errors
    ///
    /// Store and model failures propagate as-is and abort the call;
    /// parents persisted by earlier iterations remain persisted.
    #[instrument(skip_all)]
    pub async fn index(
        &self,
        document: &Document,
        parent_splitter: &dyn Splitter,
        child_splitter: Option<&dyn Splitter>,
    ) -> Result<usize> {
        let config = self.store.config();
        let id_property = config.id_property.clone();
        let parent_id_property = config.parent_id_property.clone();

        let parent_segments = parent_splitter.split(document);

        for (i, parent_segment) in parent_segments.iter().enumerate() {
            let parent_id = format!("parent_{i}");
            let mut parent_segment = parent_segment.clone();
            assign_identity(&mut parent_segment, &id_property, None);

            // The text children are split from: the transform output when a
            // transform is configured, the raw parent text otherwise.
            let mut indexed_text = parent_segment.text.clone();

            if let Some(parent_write) = &self.parent_write {
                let mut metadata = document.metadata.clone();
                metadata
                    .insert(parent_id_property.clone(), Value::String(parent_id.clone()));

                match &self.transform {
                    Some(transform) => {
                        indexed_text = transform.apply(&parent_segment.text).await?;
                        metadata.insert(
                            "text".to_string(),
                            Value::String(indexed_text.clone()),
                        );
                    }
                    None => {
                        metadata
                            .entry("text")
                            .or_insert_with(|| Value::String(parent_segment.text.clone()));
                    }
                }
                metadata
                    .entry("title")
                    .or_insert_with(|| Value::String("Untitled".to_string()));

                for (key, value) in parent_write.params.clone() {
                    metadata.insert(key, value);
                }

                let mut params = Metadata::new();
                params.insert("metadata".to_string(), Value::Object(metadata));
                self.store.run_write(&parent_write.statement, params).await?;
            }

            let parent_document =
                Document::with_metadata(indexed_text.clone(), document.metadata.clone());

            let mut extra_params = Metadata::new();
            extra_params
                .insert(parent_id_property.clone(), Value::String(parent_id.clone()));

            match child_splitter {
                None => {
                    let embedding = self.embedder.embed(&parent_segment.text).await?;
                    self.store
                        .add_all(&[embedding], std::slice::from_ref(&parent_segment), &extra_params)
                        .await?;
                }
                Some(child_splitter) => {
                    let mut children = child_splitter.split(&parent_document);
                    for child in &mut children {
                        assign_identity(child, &id_property, Some(&parent_id));
                        child.metadata.insert(
                            parent_id_property.clone(),
                            Value::String(parent_id.clone()),
                        );
                    }
                    let texts: Vec<&str> = children.iter().map(|c| c.text.as_str()).collect();
                    let embeddings = self.embedder.embed_batch(&texts).await?;
                    self.store.add_all(&embeddings, &children, &extra_params).await?;
                }
            }
        }

        info!(parent_count = parent_segments.len(), "indexed document");
        Ok(parent_segments.len())
    }
}
