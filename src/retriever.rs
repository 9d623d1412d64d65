//! Retrieval façade: one configurable engine over the indexing and
//! retrieval pipeline.
//!
//! A [`GraphRetriever`] is fixed at construction along two orthogonal axes:
//! whether parent text is rewritten by a transform model at index time, and
//! whether aggregated context is collapsed into a single synthesized answer
//! at retrieval time. The named [`RetrieverVariant`]s are presets over the
//! same machinery, not separate implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragtree::{GraphRetriever, RetrieverVariant, ParagraphSplitter, SentenceSplitter};
//!
//! let retriever = GraphRetriever::builder()
//!     .variant(RetrieverVariant::ParentChild)
//!     .embedding_provider(Arc::new(embedder))
//!     .max_results(5)
//!     .min_score(0.4)
//!     .build()?;
//!
//! retriever.index(&document, &ParagraphSplitter, Some(&SentenceSplitter)).await?;
//! let contents = retriever.retrieve("what is a quorum?").await?;
//! ```

use std::sync::Arc;

use tracing::info;

use crate::aggregate::{self, AggregationMode};
use crate::chat::{ANSWER_TEMPLATE, ChatMessage, ChatModel, DEFAULT_ANSWER_PROMPT, PromptTemplate};
use crate::document::{Document, Metadata, RetrievedContent};
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, RetrieverError};
use crate::indexer::{HierarchicalIndexer, ParentWrite, TextTransform};
use crate::inmemory::InMemoryGraphStore;
use crate::search::similarity_search;
use crate::splitter::Splitter;
use crate::store::GraphVectorStore;
use crate::variant::RetrieverVariant;

struct AnswerSynthesis {
    model: Arc<dyn ChatModel>,
    prompt: String,
}

/// A parent/child graph retriever.
///
/// Construct via [`GraphRetriever::builder`]. The retriever owns an
/// indexing pipeline ([`index`](GraphRetriever::index)) and a retrieval
/// pipeline ([`retrieve`](GraphRetriever::retrieve)); both are single
/// blocking calls with no internal concurrency.
pub struct GraphRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn GraphVectorStore>,
    indexer: HierarchicalIndexer,
    mode: AggregationMode,
    max_results: usize,
    min_score: f64,
    answer: Option<AnswerSynthesis>,
}

impl std::fmt::Debug for GraphRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphRetriever")
            .field("mode", &self.mode)
            .field("max_results", &self.max_results)
            .field("min_score", &self.min_score)
            .field("answer", &self.answer.is_some())
            .finish_non_exhaustive()
    }
}

impl GraphRetriever {
    /// Create a new [`GraphRetrieverBuilder`].
    pub fn builder() -> GraphRetrieverBuilder {
        GraphRetrieverBuilder::default()
    }

    /// The store this retriever reads and writes.
    pub fn store(&self) -> &Arc<dyn GraphVectorStore> {
        &self.store
    }

    /// Index one document into the store (see
    /// [`HierarchicalIndexer::index`]). Returns the number of parent
    /// segments indexed.
    pub async fn index(
        &self,
        document: &Document,
        parent_splitter: &dyn Splitter,
        child_splitter: Option<&dyn Splitter>,
    ) -> Result<usize> {
        self.indexer.index(document, parent_splitter, child_splitter).await
    }

    /// Retrieve content for a free-text query.
    ///
    /// Embeds the query, searches the child level, and aggregates matches
    /// into deduplicated parent-level results ranked by best child score.
    /// When an answer model is configured, the results collapse into
    /// exactly one synthesized answer. An empty result set is a valid
    /// outcome in the non-synthesis modes.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedContent>> {
        let matches = similarity_search(
            self.embedder.as_ref(),
            self.store.as_ref(),
            query,
            self.max_results,
            self.min_score,
        )
        .await?;

        let contents =
            aggregate::aggregate(self.store.as_ref(), matches, self.mode, self.max_results).await?;

        let Some(answer) = &self.answer else {
            info!(result_count = contents.len(), "retrieval completed");
            return Ok(contents);
        };

        // Answer synthesis runs unconditionally, even over empty context.
        let context =
            contents.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n\n");
        let prompt = format!("{}{}", answer.prompt, ANSWER_TEMPLATE);
        let prompt =
            PromptTemplate::new(prompt).apply(&[("context", &context), ("question", query)]);
        let text = answer.model.chat(&[ChatMessage::user(prompt)]).await?;

        info!(context_items = contents.len(), "synthesized answer");
        Ok(vec![RetrievedContent { text, score: None, metadata: Metadata::new() }])
    }
}

/// Builder for a [`GraphRetriever`].
///
/// Required: an embedding provider, `max_results`, and `min_score`. The
/// store defaults to an [`InMemoryGraphStore`] preconfigured for the chosen
/// variant; the transform prompt pair defaults to the variant's built-in
/// prompts when a transform model is set.
#[derive(Default)]
pub struct GraphRetrieverBuilder {
    variant: Option<RetrieverVariant>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn GraphVectorStore>>,
    max_results: Option<usize>,
    min_score: Option<f64>,
    transform_model: Option<Arc<dyn ChatModel>>,
    system_prompt: Option<String>,
    user_prompt: Option<String>,
    answer_model: Option<Arc<dyn ChatModel>>,
    answer_prompt: Option<String>,
    parent_write_statement: Option<String>,
    static_params: Option<Metadata>,
}

impl GraphRetrieverBuilder {
    /// Set the retriever variant (default: [`RetrieverVariant::Plain`]).
    pub fn variant(mut self, variant: RetrieverVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Set the embedding provider (required).
    pub fn embedding_provider(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the graph/vector store. Defaults to an in-memory store
    /// configured with the variant's label, index, and relationship.
    pub fn store(mut self, store: Arc<dyn GraphVectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the maximum number of results (required, positive).
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Set the minimum similarity score (required).
    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Set the parent-text transform model.
    pub fn transform_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.transform_model = Some(model);
        self
    }

    /// Set the transform system prompt. Must be paired with
    /// [`user_prompt`](Self::user_prompt).
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the transform user prompt; its `{{input}}` placeholder receives
    /// the parent text. Must be paired with
    /// [`system_prompt`](Self::system_prompt).
    pub fn user_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.user_prompt = Some(prompt.into());
        self
    }

    /// Set the answer-synthesis model.
    pub fn answer_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.answer_model = Some(model);
        self
    }

    /// Set the answer-synthesis instruction prefix (default:
    /// [`DEFAULT_ANSWER_PROMPT`]).
    pub fn answer_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.answer_prompt = Some(prompt.into());
        self
    }

    /// Override the parent-write statement (default: the variant's
    /// `CREATE (:Parent $metadata)` statement; `None` for the plain
    /// variant).
    pub fn parent_write_statement(mut self, statement: impl Into<String>) -> Self {
        self.parent_write_statement = Some(statement.into());
        self
    }

    /// Set static parameters merged into every parent's metadata map.
    pub fn static_params(mut self, params: Metadata) -> Self {
        self.static_params = Some(params);
        self
    }

    /// Build the [`GraphRetriever`], validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::Config`] if a required field is missing,
    /// `max_results` is zero, or a transform model is configured with an
    /// incomplete prompt pair.
    pub fn build(self) -> Result<GraphRetriever> {
        let embedder = self
            .embedder
            .ok_or_else(|| RetrieverError::Config("embedding_provider is required".to_string()))?;
        let max_results = self
            .max_results
            .ok_or_else(|| RetrieverError::Config("max_results is required".to_string()))?;
        if max_results == 0 {
            return Err(RetrieverError::Config("max_results must be positive".to_string()));
        }
        let min_score = self
            .min_score
            .ok_or_else(|| RetrieverError::Config("min_score is required".to_string()))?;
        let variant = self.variant.unwrap_or(RetrieverVariant::Plain);

        // A transform model needs a complete prompt pair; a half-configured
        // pair fails here, before anything touches the store.
        let transform = match self.transform_model {
            Some(model) => {
                let (system_prompt, user_prompt) = match (self.system_prompt, self.user_prompt) {
                    (Some(system), Some(user)) => (system, user),
                    (None, None) => {
                        let (system, user) =
                            variant.default_transform_prompts().ok_or_else(|| {
                                RetrieverError::Config(
                                    "transform model requires system_prompt and user_prompt"
                                        .to_string(),
                                )
                            })?;
                        (system.to_string(), user.to_string())
                    }
                    _ => {
                        return Err(RetrieverError::Config(
                            "system_prompt and user_prompt must be provided together".to_string(),
                        ));
                    }
                };
                Some(TextTransform::new(model, system_prompt, user_prompt))
            }
            None => None,
        };

        let store: Arc<dyn GraphVectorStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryGraphStore::new(
                variant.default_store_config(embedder.dimensions())?,
            )),
        };

        let parent_write = match self.parent_write_statement {
            Some(statement) => Some(statement),
            None => variant.default_parent_write(store.config()),
        }
        .map(|statement| ParentWrite {
            statement,
            params: self.static_params.unwrap_or_default(),
        });

        let mut indexer = HierarchicalIndexer::new(Arc::clone(&embedder), Arc::clone(&store));
        if let Some(parent_write) = parent_write {
            indexer = indexer.with_parent_write(parent_write);
        }
        if let Some(transform) = transform {
            indexer = indexer.with_transform(transform);
        }

        let answer = self.answer_model.map(|model| AnswerSynthesis {
            model,
            prompt: self.answer_prompt.unwrap_or_else(|| DEFAULT_ANSWER_PROMPT.to_string()),
        });

        Ok(GraphRetriever {
            embedder,
            store,
            indexer,
            mode: variant.aggregation_mode(),
            max_results,
            min_score,
            answer,
        })
    }
}
