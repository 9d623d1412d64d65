//! Hierarchical parent/child document indexing and retrieval over
//! graph-backed vector stores.
//!
//! Documents are split into coarse parent segments and fine-grained child
//! segments; children are embedded and matched against queries, while the
//! deduplicated, score-ranked parents are what callers get back. The child
//! level can hold raw text, language-model-generated summaries, or
//! hypothetical questions, and an optional answer-synthesis model can
//! collapse the retrieved context into a single composed answer.
//!
//! The building blocks:
//!
//! - [`GraphRetriever`] — the configurable façade over indexing and
//!   retrieval, with [`RetrieverVariant`] presets
//! - [`HierarchicalIndexer`] — split, transform, embed, persist
//! - [`GraphVectorStore`] — the store capability, with
//!   [`InMemoryGraphStore`] as the bundled backend
//! - [`EmbeddingProvider`] / [`ChatModel`] — the model capabilities
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragtree::{
//!     Document, GraphRetriever, ParagraphSplitter, RetrieverVariant, SentenceSplitter,
//! };
//!
//! let retriever = GraphRetriever::builder()
//!     .variant(RetrieverVariant::ParentChild)
//!     .embedding_provider(Arc::new(embedder))
//!     .max_results(5)
//!     .min_score(0.4)
//!     .build()?;
//!
//! retriever.index(&Document::new(text), &ParagraphSplitter, Some(&SentenceSplitter)).await?;
//! for content in retriever.retrieve("what is a quorum?").await? {
//!     println!("{:.3} {}", content.score.unwrap_or_default(), content.text);
//! }
//! ```

pub mod aggregate;
pub mod chat;
pub mod cypher;
pub mod document;
pub mod embedding;
pub mod error;
pub mod identity;
pub mod indexer;
pub mod inmemory;
pub mod retriever;
pub mod search;
pub mod splitter;
pub mod store;
pub mod variant;

pub use aggregate::AggregationMode;
pub use chat::{ChatMessage, ChatModel, DEFAULT_ANSWER_PROMPT, PromptTemplate, Role};
pub use document::{Document, Metadata, RetrievedContent, Segment};
pub use embedding::EmbeddingProvider;
pub use error::{Result, RetrieverError};
pub use identity::assign_identity;
pub use indexer::{HierarchicalIndexer, ParentWrite, TextTransform};
pub use inmemory::InMemoryGraphStore;
pub use retriever::{GraphRetriever, GraphRetrieverBuilder};
pub use search::similarity_search;
pub use splitter::{CharacterSplitter, ParagraphSplitter, SentenceSplitter, Splitter};
pub use store::{
    ChildMatch, GraphVectorStore, ParentRecord, SearchRequest, StoreConfig, StoreConfigBuilder,
};
pub use variant::RetrieverVariant;
