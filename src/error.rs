//! Error types for the `ragtree` crate.

use thiserror::Error;

/// Errors that can occur while indexing or retrieving.
#[derive(Debug, Error)]
pub enum RetrieverError {
    /// A configuration validation error, surfaced at construction or first use.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the graph/vector store backend.
    #[error("Graph store error ({backend}): {message}")]
    Store {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during a chat model call.
    #[error("Chat model error: {0}")]
    Chat(String),

    /// A node with the same identity value already exists in the store.
    #[error("Identity collision on `{property}` = `{value}`")]
    IdentityCollision {
        /// The identity property the uniqueness constraint covers.
        property: String,
        /// The colliding identity value.
        value: String,
    },

    /// An embedding vector's length differs from the store's configured dimension.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the store was configured with.
        expected: usize,
        /// The dimension of the rejected vector.
        actual: usize,
    },

    /// A label or property name failed sanitization against the identifier grammar.
    #[error("Invalid identifier for {what}: `{value}`")]
    InvalidIdentifier {
        /// Which configuration field the value was supplied for.
        what: String,
        /// The rejected value.
        value: String,
    },
}

/// A convenience result type for retriever operations.
pub type Result<T> = std::result::Result<T, RetrieverError>;
